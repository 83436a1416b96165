//! CSV ingestion: turns dataset rows into [`Device`] records.
//!
//! The dataset only carries an id, a sensor label and a handful of numeric
//! measurements. Everything else on a device (status, battery, signal,
//! location, subscription, metadata) is synthesized from those values plus
//! the caller's random source.

mod synth;

use crate::models::{Device, DeviceMetadata, DeviceType, Subscription};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse dataset: {0}")]
    Csv(#[from] csv::Error),
}

/// One dataset row. Numeric columns stay text and are coerced leniently.
#[derive(Debug, Deserialize)]
struct CsvRow {
    query_id: String,
    sensor_type: String,
    #[serde(default)]
    #[allow(unused)]
    duration: String,
    energy_consumption: String,
    transmission_efficiency: String,
}

impl CsvRow {
    fn energy_consumption(&self) -> f64 {
        parse_float(&self.energy_consumption)
    }

    fn transmission_efficiency(&self) -> f64 {
        parse_float(&self.transmission_efficiency)
    }
}

/// Reads the longest numeric prefix, so `"0.5abc"` is 0.5. No prefix, or a
/// non-finite value, reads as 0.
fn parse_float(raw: &str) -> f64 {
    let raw = raw.trim_start();
    let bytes = raw.as_bytes();
    let digits_from = |at: usize| {
        bytes
            .get(at..)
            .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = digits_from(end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = digits_from(exp_end);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    match raw[..end].parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Read and transform every row of the CSV file at `path`.
pub fn load_devices<P, R>(path: P, rng: &mut R, now: DateTime<Utc>) -> Result<Vec<Device>, LoadError>
where
    P: AsRef<Path>,
    R: Rng + ?Sized,
{
    let content = std::fs::read_to_string(path)?;
    parse_devices(content.as_bytes(), rng, now)
}

/// Transform CSV text (header row first) into devices.
pub fn parse_devices<Rd, R>(reader: Rd, rng: &mut R, now: DateTime<Utc>) -> Result<Vec<Device>, LoadError>
where
    Rd: io::Read,
    R: Rng + ?Sized,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut devices = Vec::new();
    for (index, record) in csv_reader.deserialize::<CsvRow>().enumerate() {
        let row = record?;
        devices.push(row_to_device(&row, index, rng, now));
    }

    Ok(devices)
}

fn row_to_device<R: Rng + ?Sized>(
    row: &CsvRow,
    index: usize,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Device {
    let id = row.query_id.as_str();
    let sensor_type = row.sensor_type.as_str();
    let energy = row.energy_consumption();
    let efficiency = row.transmission_efficiency();

    let status = synth::status(energy, efficiency, rng);
    let battery_level = synth::battery_level(energy, rng);
    let signal_strength = synth::signal_strength(efficiency, rng);
    let last_seen = synth::last_seen(status, now, rng);

    let metadata = DeviceMetadata {
        manufacturer: Some(format!("{} Solutions Inc.", sensor_type)),
        model: Some(synth::model(sensor_type, id)),
        firmware_version: Some(synth::firmware_version(rng)),
        serial_number: Some(synth::serial_number(sensor_type, id)),
        location: Some(synth::location(index, rng)),
        installed_date: Some(synth::days_before(now, 365.0, rng)),
        last_maintenance: Some(synth::days_before(now, 90.0, rng)),
    };

    let subscription = Subscription::new(
        format!("sub-{}", synth::padded_id(id)),
        synth::plan(efficiency),
        synth::subscription_status(rng),
        synth::days_before(now, 365.0, rng),
        synth::days_after(now, 365.0, rng),
    );

    Device {
        id: id.to_string(),
        name: format!("{} Device #{}", sensor_type, id),
        type_: DeviceType::from_label(sensor_type),
        status,
        metadata,
        subscription,
        last_seen,
        battery_level: Some(battery_level),
        signal_strength: Some(signal_strength),
    }
}
