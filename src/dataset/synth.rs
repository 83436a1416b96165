use crate::models::{DeviceStatus, Location, Plan, SubscriptionStatus};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;

struct ReferencePoint {
    lat: f64,
    lng: f64,
    addr: &'static str,
}

const REFERENCE_POINTS: [ReferencePoint; 5] = [
    ReferencePoint { lat: 40.7128, lng: -74.0060, addr: "123 Main St, New York, NY 10001" },
    ReferencePoint { lat: 40.7589, lng: -73.9851, addr: "456 Broadway, New York, NY 10013" },
    ReferencePoint { lat: 40.7505, lng: -73.9934, addr: "789 Park Ave, New York, NY 10021" },
    ReferencePoint { lat: 40.7614, lng: -73.9776, addr: "321 5th Ave, New York, NY 10016" },
    ReferencePoint { lat: 40.7282, lng: -73.9942, addr: "555 Research Blvd, New York, NY 10012" },
];

const LOCATION_JITTER: f64 = 0.005;

pub fn status<R: Rng + ?Sized>(
    energy_consumption: f64,
    transmission_efficiency: f64,
    rng: &mut R,
) -> DeviceStatus {
    if energy_consumption > 0.8 || transmission_efficiency < 0.5 {
        if rng.gen_bool(0.3) {
            DeviceStatus::Error
        } else {
            DeviceStatus::Maintenance
        }
    } else if energy_consumption > 0.6 || transmission_efficiency < 0.7 {
        if rng.gen_bool(0.2) {
            DeviceStatus::Offline
        } else {
            DeviceStatus::Online
        }
    } else if rng.gen_bool(0.1) {
        DeviceStatus::Offline
    } else {
        DeviceStatus::Online
    }
}

fn jittered_level<R: Rng + ?Sized>(base: f64, min: f64, rng: &mut R) -> u8 {
    let value = (base + rng.gen_range(-10.0..10.0)).round();
    // NaN from a garbage base falls through clamp, so pin it to the floor.
    if value.is_nan() {
        return min as u8;
    }
    value.clamp(min, 100.0) as u8
}

pub fn battery_level<R: Rng + ?Sized>(energy_consumption: f64, rng: &mut R) -> u8 {
    jittered_level(100.0 - energy_consumption * 50.0, 10.0, rng)
}

pub fn signal_strength<R: Rng + ?Sized>(transmission_efficiency: f64, rng: &mut R) -> u8 {
    jittered_level(transmission_efficiency * 100.0, 30.0, rng)
}

pub fn last_seen<R: Rng + ?Sized>(
    status: DeviceStatus,
    now: DateTime<Utc>,
    rng: &mut R,
) -> DateTime<Utc> {
    let hours_ago = match status {
        DeviceStatus::Online => rng.gen_range(0.0..2.0),
        DeviceStatus::Offline => rng.gen_range(2.0..12.0),
        DeviceStatus::Maintenance | DeviceStatus::Error => rng.gen_range(24.0..72.0),
    };
    now - Duration::milliseconds((hours_ago * 3_600_000.0) as i64)
}

pub fn location<R: Rng + ?Sized>(row_index: usize, rng: &mut R) -> Location {
    let point = &REFERENCE_POINTS[row_index % REFERENCE_POINTS.len()];
    Location {
        latitude: point.lat + rng.gen_range(-LOCATION_JITTER..LOCATION_JITTER),
        longitude: point.lng + rng.gen_range(-LOCATION_JITTER..LOCATION_JITTER),
        address: Some(point.addr.to_string()),
    }
}

pub fn plan(transmission_efficiency: f64) -> Plan {
    if transmission_efficiency > 0.8 {
        Plan::Enterprise
    } else if transmission_efficiency > 0.6 {
        Plan::Professional
    } else {
        Plan::Basic
    }
}

pub fn subscription_status<R: Rng + ?Sized>(rng: &mut R) -> SubscriptionStatus {
    if rng.gen_bool(0.9) {
        SubscriptionStatus::Active
    } else {
        SubscriptionStatus::Expired
    }
}

/// A calendar day up to `max_days` before `now`.
pub fn days_before<R: Rng + ?Sized>(now: DateTime<Utc>, max_days: f64, rng: &mut R) -> NaiveDate {
    let offset = rng.gen_range(0.0..max_days);
    (now - Duration::seconds((offset * 86_400.0) as i64)).date_naive()
}

/// A calendar day up to `max_days` after `now`.
pub fn days_after<R: Rng + ?Sized>(now: DateTime<Utc>, max_days: f64, rng: &mut R) -> NaiveDate {
    let offset = rng.gen_range(0.0..max_days);
    (now + Duration::seconds((offset * 86_400.0) as i64)).date_naive()
}

pub fn firmware_version<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "v{:.1}.{}.{}",
        rng.gen_range(1.0..4.0),
        rng.gen_range(0..10),
        rng.gen_range(0..10)
    )
}

pub fn model(sensor_type: &str, id: &str) -> String {
    let compact: String = sensor_type.chars().filter(|c| !c.is_whitespace()).collect();
    format!("{}-{}", compact, id)
}

pub fn padded_id(id: &str) -> String {
    format!("{:0>6}", id)
}

pub fn serial_number(sensor_type: &str, id: &str) -> String {
    let prefix: String = sensor_type.chars().take(2).collect();
    format!("{}{}", prefix.to_uppercase(), padded_id(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn levels_stay_in_bounds_for_any_seed() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            for energy in [0.0, 0.3, 0.9, 1.0, 2.5, -1.0] {
                let battery = battery_level(energy, &mut rng);
                assert!((10..=100).contains(&battery), "battery {}", battery);
            }
            for efficiency in [0.0, 0.2, 0.9, 1.0, 3.0] {
                let signal = signal_strength(efficiency, &mut rng);
                assert!((30..=100).contains(&signal), "signal {}", signal);
            }
        }
    }

    #[test]
    fn nan_inputs_pin_to_floor() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(battery_level(f64::NAN, &mut rng), 10);
        assert_eq!(signal_strength(f64::NAN, &mut rng), 30);
    }

    #[test]
    fn degraded_inputs_only_yield_error_or_maintenance() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..500 {
            let s = status(0.95, 0.9, &mut rng);
            assert!(matches!(s, DeviceStatus::Error | DeviceStatus::Maintenance));
            let s = status(0.1, 0.3, &mut rng);
            assert!(matches!(s, DeviceStatus::Error | DeviceStatus::Maintenance));
        }
    }

    #[test]
    fn healthy_inputs_only_yield_online_or_offline() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut offline = 0;
        for _ in 0..2000 {
            match status(0.2, 0.9, &mut rng) {
                DeviceStatus::Offline => offline += 1,
                DeviceStatus::Online => {}
                other => panic!("unexpected status {:?}", other),
            }
        }
        // p = 0.1, so roughly 200 of 2000
        assert!((100..320).contains(&offline), "offline {}", offline);
    }

    fn offline_count(energy: f64, efficiency: f64, rng: &mut StdRng) -> usize {
        let mut offline = 0;
        for _ in 0..2000 {
            match status(energy, efficiency, rng) {
                DeviceStatus::Offline => offline += 1,
                DeviceStatus::Online => {}
                other => panic!("unexpected status {:?} for ({}, {})", other, energy, efficiency),
            }
        }
        offline
    }

    #[test]
    fn strained_inputs_go_offline_a_fifth_of_the_time() {
        let mut rng = StdRng::seed_from_u64(13);
        // p = 0.2, so roughly 400 of 2000
        let by_energy = offline_count(0.7, 0.9, &mut rng);
        assert!((320..480).contains(&by_energy), "offline {}", by_energy);
        let by_efficiency = offline_count(0.3, 0.6, &mut rng);
        assert!((320..480).contains(&by_efficiency), "offline {}", by_efficiency);
    }

    #[test]
    fn thresholds_are_exclusive() {
        let mut rng = StdRng::seed_from_u64(17);

        // energy 0.8 and efficiency 0.5 sit just outside the degraded branch
        let at_degraded_edge = offline_count(0.8, 0.5, &mut rng);
        assert!((320..480).contains(&at_degraded_edge), "offline {}", at_degraded_edge);

        // energy 0.6 and efficiency 0.7 sit just outside the strained branch
        let at_strained_edge = offline_count(0.6, 0.7, &mut rng);
        assert!((120..320).contains(&at_strained_edge), "offline {}", at_strained_edge);

        for _ in 0..200 {
            assert!(matches!(
                status(0.8001, 0.9, &mut rng),
                DeviceStatus::Error | DeviceStatus::Maintenance
            ));
            assert!(matches!(
                status(0.2, 0.4999, &mut rng),
                DeviceStatus::Error | DeviceStatus::Maintenance
            ));
        }
    }

    #[test]
    fn degraded_inputs_error_about_a_third_of_the_time() {
        let mut rng = StdRng::seed_from_u64(19);
        let errors = (0..2000)
            .filter(|_| status(0.9, 0.9, &mut rng) == DeviceStatus::Error)
            .count();
        // p = 0.3, so roughly 600 of 2000
        assert!((500..700).contains(&errors), "errors {}", errors);
    }

    #[test]
    fn subscription_status_is_mostly_active_never_pending() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut active = 0;
        for _ in 0..2000 {
            match subscription_status(&mut rng) {
                SubscriptionStatus::Active => active += 1,
                SubscriptionStatus::Expired => {}
                other => panic!("unexpected subscription status {:?}", other),
            }
        }
        // p = 0.9, so roughly 1800 of 2000
        assert!((1720..1880).contains(&active), "active {}", active);
    }

    #[test]
    fn date_windows_stay_around_now() {
        let now = DateTime::parse_from_rfc3339("2024-06-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let today = now.date_naive();
        let mut rng = StdRng::seed_from_u64(29);

        for _ in 0..500 {
            let installed = days_before(now, 365.0, &mut rng);
            assert!(installed <= today && installed >= today - Duration::days(365));

            let maintained = days_before(now, 90.0, &mut rng);
            assert!(maintained <= today && maintained >= today - Duration::days(90));

            let ends = days_after(now, 365.0, &mut rng);
            assert!(ends >= today && ends <= today + Duration::days(365));
        }
    }

    #[test]
    fn last_seen_window_depends_on_status() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let online = now - last_seen(DeviceStatus::Online, now, &mut rng);
            assert!(online <= Duration::hours(2));
            let offline = now - last_seen(DeviceStatus::Offline, now, &mut rng);
            assert!(offline >= Duration::hours(2) && offline <= Duration::hours(12));
            let down = now - last_seen(DeviceStatus::Error, now, &mut rng);
            assert!(down >= Duration::hours(24) && down <= Duration::hours(72));
        }
    }

    #[test]
    fn location_cycles_reference_points_with_small_jitter() {
        let mut rng = StdRng::seed_from_u64(5);
        let first = location(0, &mut rng);
        let sixth = location(5, &mut rng);
        assert_eq!(first.address, sixth.address);
        assert!((first.latitude - 40.7128).abs() <= LOCATION_JITTER);
        assert!((first.longitude + 74.0060).abs() <= LOCATION_JITTER);
        assert_eq!(
            location(3, &mut rng).address.as_deref(),
            Some("321 5th Ave, New York, NY 10016")
        );
    }

    #[test]
    fn plan_thresholds() {
        assert_eq!(plan(0.81), Plan::Enterprise);
        assert_eq!(plan(0.8), Plan::Professional);
        assert_eq!(plan(0.61), Plan::Professional);
        assert_eq!(plan(0.6), Plan::Basic);
    }

    #[test]
    fn metadata_templates() {
        assert_eq!(model("Air Quality  Sensor", "42"), "AirQualitySensor-42");
        assert_eq!(serial_number("temperature sensor", "123"), "TE000123");
        assert_eq!(serial_number("x", "1234567"), "X1234567");
        assert_eq!(padded_id("5"), "000005");
    }

    #[test]
    fn firmware_version_shape() {
        let mut rng = StdRng::seed_from_u64(21);
        let version = firmware_version(&mut rng);
        let parts: Vec<&str> = version.trim_start_matches('v').split('.').collect();
        assert!(version.starts_with('v'));
        assert_eq!(parts.len(), 4);
        let major: u32 = parts[0].parse().unwrap();
        assert!((1..=4).contains(&major));
    }
}
