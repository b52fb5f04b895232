//! Record to sample mapping.
//!
//! Every function here is pure and infallible: records already carry
//! normalized items and canonical units, and field names come from the
//! closed enums in `bdx-types`.

use bdx_types::{
    AlarmRecord, MetricFamily, MetricSample, ParameterRecord, RackFieldRecord, SensorReading,
    StatusFieldRecord,
};

/// Value published for every alarm row, whatever its status text.
pub const ALARM_VALUE: f64 = 1.0;

/// `type` label of alarm samples.
pub const ALARM_TYPE: &str = "alarm";
/// `type` label of parameter samples.
pub const PARAMETER_TYPE: &str = "parameter";
/// `status` label of parameter samples.
pub const PARAMETER_STATUS: &str = "normal";

/// One temperature and one humidity sample per sensor, keyed by label.
pub fn sensor_samples(readings: &[SensorReading]) -> Vec<MetricSample> {
    readings
        .iter()
        .flat_map(|r| {
            [
                MetricSample::new(MetricFamily::Temperature, r.temperature)
                    .label("name", r.label.as_str()),
                MetricSample::new(MetricFamily::Humidity, r.humidity)
                    .label("name", r.label.as_str()),
            ]
        })
        .collect()
}

/// Alarm rows as `bdx_cdu{type="alarm"}` samples with value 1.
///
/// The status text becomes the `status` label, not the value.
pub fn alarm_samples(alarms: &[AlarmRecord]) -> Vec<MetricSample> {
    alarms
        .iter()
        .map(|a| {
            MetricSample::new(MetricFamily::Cdu, ALARM_VALUE)
                .label("name", a.source_name.as_str())
                .label("type", ALARM_TYPE)
                .label("item", a.item.as_str())
                .label("status", a.status.as_str())
                .label("metrix_type", "")
        })
        .collect()
}

/// Parameter rows as `bdx_cdu{type="parameter",status="normal"}` samples.
pub fn parameter_samples(parameters: &[ParameterRecord]) -> Vec<MetricSample> {
    parameters
        .iter()
        .map(|p| {
            MetricSample::new(MetricFamily::Cdu, p.value)
                .label("name", p.source_name.as_str())
                .label("type", PARAMETER_TYPE)
                .label("item", p.item.as_str())
                .label("status", PARAMETER_STATUS)
                .label("metrix_type", p.unit.as_str())
        })
        .collect()
}

/// One `bdx_liquid` sample per (unit, field).
pub fn status_samples(statuses: &[StatusFieldRecord]) -> Vec<MetricSample> {
    statuses
        .iter()
        .map(|s| {
            MetricSample::new(MetricFamily::Liquid, s.value)
                .label("name", s.source_name.as_str())
                .label("type", s.field.as_str())
                .label("metrix_type", s.unit.as_str())
        })
        .collect()
}

/// One `bdx_liquid_rack` sample per (rack, field); `name` is the rack number.
pub fn rack_samples(racks: &[RackFieldRecord]) -> Vec<MetricSample> {
    racks
        .iter()
        .map(|r| {
            MetricSample::new(MetricFamily::LiquidRack, r.value)
                .label("name", r.rack_number.as_str())
                .label("type", r.field.as_str())
                .label("metrix_type", r.unit.as_str())
        })
        .collect()
}

/// The cycle start time as a `bdx_last_collect_timestamp_seconds` sample.
pub fn timestamp_sample(timestamp_ms: u64) -> MetricSample {
    MetricSample::new(
        MetricFamily::LastCollectTimestamp,
        timestamp_ms as f64 / 1000.0,
    )
}

/// Whether a source succeeded, as a `bdx_source_up` sample.
pub fn source_up_sample(source: &str, up: bool) -> MetricSample {
    MetricSample::new(MetricFamily::SourceUp, if up { 1.0 } else { 0.0 }).label("source", source)
}
