//! Parsing of RouterOS attribute values.

use crate::client::Row;
use crate::metrics::{Labels, MetricDesc, Observation};

/// Parse a number, ignoring a trailing unit (`24.1V`, `-3.5dBm`, `45C`).
pub fn parse_number(value: &str) -> Option<f64> {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0)))
        .map_or(value.len(), |(i, _)| i);
    value[..end].parse().ok()
}

/// Parse a RouterOS boolean.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `1.0` for true, `0.0` for false.
pub fn bool_value(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// Parse a RouterOS duration into seconds.
///
/// Accepts unit form (`1w2d3h4m5s`, `150ms`, `2s300ms`), clock form
/// (`00:01:02`) and both combined (`3d02:03:04`).
pub fn parse_duration(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let (units, clock) = match value.find(':') {
        Some(_) => {
            let split = value
                .rfind(|c: char| c.is_ascii_alphabetic())
                .map_or(0, |i| i + 1);
            (&value[..split], Some(&value[split..]))
        }
        None => (value, None),
    };

    let mut seconds = parse_unit_duration(units)?;
    if let Some(clock) = clock {
        seconds += parse_clock(clock)?;
    }
    Some(seconds)
}

fn parse_unit_duration(value: &str) -> Option<f64> {
    let mut total = 0.0;
    let mut rest = value;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if digits == 0 {
            return None;
        }
        let number: f64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let factor = match &rest[..unit_len] {
            "w" => 604_800.0,
            "d" => 86_400.0,
            "h" => 3_600.0,
            "m" => 60.0,
            "s" | "" => 1.0,
            "ms" => 1e-3,
            "us" => 1e-6,
            "ns" => 1e-9,
            _ => return None,
        };
        rest = &rest[unit_len..];
        total += number * factor;
    }
    Some(total)
}

fn parse_clock(value: &str) -> Option<f64> {
    let mut parts = value.split(':');
    let (h, m, s) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let hours: f64 = h.parse().ok()?;
    let minutes: f64 = m.parse().ok()?;
    let seconds: f64 = s.parse().ok()?;
    Some(hours * 3_600.0 + minutes * 60.0 + seconds)
}

/// Parse a `tx,rx` pair.
pub fn parse_pair(value: &str) -> Option<(f64, f64)> {
    let (tx, rx) = value.split_once(',')?;
    Some((parse_number(tx)?, parse_number(rx)?))
}

/// Parse a link rate such as `1Gbps` or `100Mbps` into Mbps.
pub fn parse_rate_mbps(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = parse_number(value)?;
    let unit = value.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.');
    match unit.to_ascii_lowercase().as_str() {
        "gbps" | "g" => Some(number * 1_000.0),
        "mbps" | "m" | "" => Some(number),
        "kbps" | "k" => Some(number / 1_000.0),
        "bps" => Some(number / 1_000_000.0),
        _ => None,
    }
}

/// Turn a RouterOS name (`cpu-temperature`, `PSU1 State`) into a metric name
/// fragment (`cpu_temperature`, `psu1_state`).
pub fn metric_name(value: &str) -> String {
    let mut name = String::with_capacity(value.len());
    for c in value.trim().chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_lowercase());
        } else if !name.ends_with('_') {
            name.push('_');
        }
    }
    name.trim_matches('_').to_string()
}

/// Emit one observation per numeric field of `row` that is present.
///
/// Fields that are absent or not numeric are skipped.
pub fn observe_numbers(
    row: &Row,
    fields: &[(&str, MetricDesc)],
    labels: &Labels,
    out: &mut Vec<Observation>,
) {
    for (field, desc) in fields {
        let Some(raw) = row.get(field) else {
            continue;
        };
        match parse_number(raw) {
            Some(value) => out.push(desc.observe(value, labels.clone())),
            None => tracing::trace!(field, value = raw, "Skipping non-numeric field"),
        }
    }
}

/// Emit the two halves of a `tx,rx` field as separate observations.
pub fn observe_pair(
    row: &Row,
    field: &str,
    (tx, rx): (MetricDesc, MetricDesc),
    labels: &Labels,
    out: &mut Vec<Observation>,
) {
    if let Some((tx_value, rx_value)) = row.get(field).and_then(parse_pair) {
        out.push(tx.observe(tx_value, labels.clone()));
        out.push(rx.observe(rx_value, labels.clone()));
    }
}
