use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Sensor,
    Actuator,
    Gateway,
    Controller,
}

impl DeviceType {
    /// Classify a free-text sensor label. Anything unrecognised is a sensor.
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("gateway") || lower.contains("hub") {
            DeviceType::Gateway
        } else if lower.contains("actuator") {
            DeviceType::Actuator
        } else if lower.contains("controller") {
            DeviceType::Controller
        } else {
            DeviceType::Sensor
        }
    }
}

impl FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sensor" => Ok(DeviceType::Sensor),
            "actuator" => Ok(DeviceType::Actuator),
            "gateway" => Ok(DeviceType::Gateway),
            "controller" => Ok(DeviceType::Controller),
            other => Err(format!("unknown device type: {}", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
    Maintenance,
    Error,
}

impl FromStr for DeviceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(DeviceStatus::Online),
            "offline" => Ok(DeviceStatus::Offline),
            "maintenance" => Ok(DeviceStatus::Maintenance),
            "error" => Ok(DeviceStatus::Error),
            other => Err(format!("unknown device status: {}", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum Plan {
    Basic,
    Professional,
    Enterprise,
}

impl Plan {
    pub fn features(&self) -> &'static [&'static str] {
        match self {
            Plan::Basic => &["Real-time monitoring"],
            Plan::Professional => &["Real-time monitoring", "Data analytics"],
            Plan::Enterprise => &[
                "Real-time monitoring",
                "Data analytics",
                "Priority support",
                "Custom integrations",
            ],
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Plan::Basic => "Basic",
            Plan::Professional => "Professional",
            Plan::Enterprise => "Enterprise",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Pending,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_maintenance: Option<NaiveDate>,
}

/// A device's plan subscription.
///
/// `features` is derived from `plan` in [`Subscription::new`] and has no setter.
#[derive(Debug, Serialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    features: Vec<String>,
}

impl Subscription {
    pub fn new(
        id: String,
        plan: Plan,
        status: SubscriptionStatus,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Subscription {
            id,
            plan,
            status,
            start_date,
            end_date,
            features: plan.features().iter().map(|f| f.to_string()).collect(),
        }
    }

    #[allow(unused)]
    pub fn features(&self) -> &[String] {
        &self.features
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: DeviceType,
    pub status: DeviceStatus,
    pub metadata: DeviceMetadata,
    pub subscription: Subscription,
    pub last_seen: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<u8>,
}

/// Subscription fields accepted when creating a device.
#[derive(Debug, Serialize, Deserialize, Clone, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    pub plan: Option<Plan>,
    pub status: Option<SubscriptionStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Body of `POST /collection`. Every field is optional; the store fills in the rest.
#[derive(Debug, Serialize, Deserialize, Clone, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<DeviceType>,
    pub status: Option<DeviceStatus>,
    pub metadata: Option<DeviceMetadata>,
    pub subscription: Option<NewSubscription>,
    pub battery_level: Option<i64>,
    pub signal_strength: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_labels_by_keyword() {
        assert_eq!(DeviceType::from_label("Smart HUB"), DeviceType::Gateway);
        assert_eq!(DeviceType::from_label("Edge Gateway"), DeviceType::Gateway);
        assert_eq!(DeviceType::from_label("Valve Actuator"), DeviceType::Actuator);
        assert_eq!(DeviceType::from_label("HVAC Controller"), DeviceType::Controller);
        assert_eq!(DeviceType::from_label("Temperature Sensor"), DeviceType::Sensor);
        assert_eq!(DeviceType::from_label("Camera"), DeviceType::Sensor);
    }

    #[test]
    fn gateway_wins_over_actuator() {
        assert_eq!(
            DeviceType::from_label("Actuator Hub"),
            DeviceType::Gateway
        );
    }

    #[test]
    fn features_depend_only_on_plan() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for (plan, count) in [
            (Plan::Basic, 1),
            (Plan::Professional, 2),
            (Plan::Enterprise, 4),
        ] {
            let active = Subscription::new("a".into(), plan, SubscriptionStatus::Active, day, day);
            let expired =
                Subscription::new("b".into(), plan, SubscriptionStatus::Expired, day, day);
            assert_eq!(active.features().len(), count);
            assert_eq!(active.features(), expired.features());
        }
    }

    #[test]
    fn device_serializes_with_camel_case_and_type_key() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let device = Device {
            id: "7".into(),
            name: "Probe Device #7".into(),
            type_: DeviceType::Sensor,
            status: DeviceStatus::Online,
            metadata: DeviceMetadata {
                serial_number: Some("PR000007".into()),
                ..Default::default()
            },
            subscription: Subscription::new(
                "sub-000007".into(),
                Plan::Professional,
                SubscriptionStatus::Active,
                day,
                day,
            ),
            last_seen: Utc::now(),
            battery_level: Some(80),
            signal_strength: None,
        };

        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(json["type"], "sensor");
        assert_eq!(json["status"], "online");
        assert_eq!(json["batteryLevel"], 80);
        assert!(json.get("signalStrength").is_none());
        assert_eq!(json["metadata"]["serialNumber"], "PR000007");
        assert!(json["metadata"].get("location").is_none());
        assert_eq!(json["subscription"]["plan"], "Professional");
        assert_eq!(json["subscription"]["startDate"], "2024-05-01");
        assert_eq!(json["subscription"]["features"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!("maintenance".parse::<DeviceStatus>(), Ok(DeviceStatus::Maintenance));
        assert_eq!("controller".parse::<DeviceType>(), Ok(DeviceType::Controller));
        assert!("Online".parse::<DeviceStatus>().is_err());
    }
}
