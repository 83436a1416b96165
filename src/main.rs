mod config;
mod dataset;
mod logger;
mod models;
mod modules;
mod shared;

use chrono::Utc;
use config::Configs;
use rand::{rngs::StdRng, SeedableRng};
use shared::store::{DeviceStore, SharedStore};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let configs = match Configs::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configurations: {}", e);
            std::process::exit(1);
        }
    };

    logger::start_log(&configs.log_level);
    log::info!("Configurations loaded");

    let mut rng = match configs.dataset.seed {
        Some(seed) => {
            log::info!("Synthesizing device fields with seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    // Load before serving so no request ever sees a half-built collection.
    let store: SharedStore = Arc::new(DeviceStore::load(
        &configs.dataset.path,
        &mut rng,
        Utc::now(),
    ));
    log::info!("Serving {} devices", store.len().await);

    let api = modules::api::start_api(configs.server, store, configs.pagination).await;
    if let Err(e) = api.await {
        log::error!("API task stopped: {}", e);
    }
}
