use crate::dataset::{self, LoadError};
use crate::models::{
    Device, DeviceStatus, DeviceType, NewDevice, Plan, Subscription, SubscriptionStatus,
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use utoipa::ToSchema;

pub type SharedStore = Arc<DeviceStore>;

/// Filter over the device collection. `None` fields impose no constraint.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    pub status: Option<Vec<DeviceStatus>>,
    pub types: Option<Vec<DeviceType>>,
    pub search: Option<String>,
}

impl Criteria {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.types.is_none()
            && self.search.as_deref().map_or(true, str::is_empty)
    }

    fn matches(&self, device: &Device, needle: Option<&str>) -> bool {
        if let Some(statuses) = &self.status {
            if !statuses.contains(&device.status) {
                return false;
            }
        }
        if let Some(types) = &self.types {
            if !types.contains(&device.type_) {
                return false;
            }
        }
        match needle {
            Some(needle) => search_matches(device, needle),
            None => true,
        }
    }
}

fn search_matches(device: &Device, needle: &str) -> bool {
    let contains = |value: &str| value.to_lowercase().contains(needle);

    contains(&device.name)
        || contains(&device.id)
        || device
            .metadata
            .location
            .as_ref()
            .and_then(|l| l.address.as_deref())
            .map_or(false, contains)
        || device
            .metadata
            .serial_number
            .as_deref()
            .map_or(false, contains)
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug)]
pub struct Page {
    pub items: Vec<Device>,
    pub pagination: Pagination,
}

/// Slice one 1-based page out of `items`. Page 0 is read as page 1.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> (Vec<T>, Pagination) {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total = items.len();
    let total_pages = (total + per_page - 1) / per_page;

    let start = (page - 1).saturating_mul(per_page);
    let slice = items.into_iter().skip(start).take(per_page).collect();

    (
        slice,
        Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    )
}

/// Aggregate counts for the dashboard header.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FleetSummary {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
    pub active_subscriptions: usize,
}

/// Owner of the in-memory device collection.
///
/// Built once before the server starts and shared with handlers through
/// [`SharedStore`]. Appends live in memory only.
#[derive(Debug, Default)]
pub struct DeviceStore {
    devices: RwLock<Vec<Device>>,
}

impl DeviceStore {
    pub fn new(devices: Vec<Device>) -> Self {
        DeviceStore {
            devices: RwLock::new(devices),
        }
    }

    /// Load the dataset at `path`. A read or parse failure leaves the store
    /// empty rather than failing startup.
    pub fn load<P, R>(path: P, rng: &mut R, now: DateTime<Utc>) -> Self
    where
        P: AsRef<Path>,
        R: Rng + ?Sized,
    {
        let path = path.as_ref();
        match dataset::load_devices(path, rng, now) {
            Ok(devices) => {
                log::info!("Loaded {} devices from {}", devices.len(), path.display());
                Self::new(devices)
            }
            Err(e) => {
                log_load_error(path, &e);
                Self::new(Vec::new())
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.devices.read().await.len()
    }

    pub async fn all(&self) -> Vec<Device> {
        self.devices.read().await.clone()
    }

    pub async fn filter(&self, criteria: &Criteria) -> Vec<Device> {
        let needle = criteria
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        self.devices
            .read()
            .await
            .iter()
            .filter(|d| criteria.matches(d, needle.as_deref()))
            .cloned()
            .collect()
    }

    pub async fn find(&self, id: &str) -> Option<Device> {
        self.devices
            .read()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    pub async fn paginate(&self, criteria: &Criteria, page: usize, per_page: usize) -> Page {
        let (items, pagination) = paginate(self.filter(criteria).await, page, per_page);
        Page { items, pagination }
    }

    pub async fn summary(&self) -> FleetSummary {
        let devices = self.devices.read().await;
        let count_status = |status: DeviceStatus| devices.iter().filter(|d| d.status == status).count();

        FleetSummary {
            total: devices.len(),
            online: count_status(DeviceStatus::Online),
            offline: count_status(DeviceStatus::Offline),
            active_subscriptions: devices
                .iter()
                .filter(|d| d.subscription.status == SubscriptionStatus::Active)
                .count(),
        }
    }

    /// Append a device built from `new`. The id is the collection length plus one.
    pub async fn append(&self, new: NewDevice) -> Device {
        let now = Utc::now();
        let mut devices = self.devices.write().await;
        let id = (devices.len() + 1).to_string();
        let device = build_device(id, new, now);

        log::info!(
            "Device {} created on plan {}",
            device.id,
            device.subscription.plan
        );
        devices.push(device.clone());
        device
    }
}

fn log_load_error(path: &Path, err: &LoadError) {
    log::error!(
        "Failed to load dataset {}, serving an empty collection: {}",
        path.display(),
        err
    );
}

fn clamp_level(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

fn build_device(id: String, new: NewDevice, now: DateTime<Utc>) -> Device {
    let today = now.date_naive();
    let requested = new.subscription.unwrap_or_default();
    let subscription = Subscription::new(
        format!("sub-{:0>6}", id),
        requested.plan.unwrap_or(Plan::Basic),
        requested.status.unwrap_or(SubscriptionStatus::Pending),
        requested.start_date.unwrap_or(today),
        requested
            .end_date
            .unwrap_or_else(|| (now + Duration::days(365)).date_naive()),
    );

    Device {
        name: new.name.unwrap_or_else(|| format!("Device #{}", id)),
        id,
        type_: new.type_.unwrap_or(DeviceType::Sensor),
        status: new.status.unwrap_or(DeviceStatus::Online),
        metadata: new.metadata.unwrap_or_default(),
        subscription,
        last_seen: now,
        battery_level: new.battery_level.map(clamp_level),
        signal_strength: new.signal_strength.map(clamp_level),
    }
}
