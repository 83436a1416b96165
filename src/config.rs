use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "FLEET_CONFIG";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Configs {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

impl Configs {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let config_content = fs::read_to_string(&path)?;
        let configs: Configs = toml::from_str(&config_content)?;
        Ok(configs)
    }

    /// Same as [`Configs::load_from_file`], except a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        match Self::load_from_file(&path) {
            Err(e) if is_not_found(e.as_ref()) => {
                eprintln!(
                    "Config file {} not found, using defaults",
                    path.as_ref().display()
                );
                Ok(Configs::default())
            }
            other => other,
        }
    }

    /// Reads the file named by `FLEET_CONFIG`. Defaults apply when the
    /// variable is unset or the file does not exist.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::load_or_default(path),
            Err(_) => Ok(Configs::default()),
        }
    }
}

fn is_not_found(err: &(dyn std::error::Error + 'static)) -> bool {
    err.downcast_ref::<io::Error>()
        .map_or(false, |e| e.kind() == io::ErrorKind::NotFound)
}

impl Default for Configs {
    fn default() -> Self {
        Configs {
            log_level: default_log_level(),
            server: ServerConfig::default(),
            dataset: DatasetConfig::default(),
            pagination: PaginationConfig::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origin. Unset allows any origin.
    pub cors_origin: Option<String>,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: default_host(),
            port: default_port(),
            cors_origin: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,
    /// Fixed seed for the synthesized fields. Unset means fresh values per start.
    pub seed: Option<u64>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig {
            path: default_dataset_path(),
            seed: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct PaginationConfig {
    #[serde(default = "default_per_page")]
    pub per_page: usize,
    #[serde(default = "default_max_per_page")]
    pub max_per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        PaginationConfig {
            per_page: default_per_page(),
            max_per_page: default_max_per_page(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    3030
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("cde_ipaas_dataset.csv")
}

fn default_per_page() -> usize {
    24
}

fn default_max_per_page() -> usize {
    100
}
