//! Human-readable `Duration` (de)serialization, e.g. `"1300ms"`, `"30s"`, `"5m"`.
//!
//! Use with `#[serde(with = "serde_duration")]`.
use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if duration.subsec_millis() != 0 {
        return serializer.serialize_str(&format!("{}ms", duration.as_millis()));
    }
    let (value, unit) = if duration.as_secs() % 3600 == 0 && duration.as_secs() != 0 {
        (duration.as_secs() / 3600, "h")
    } else if duration.as_secs() % 60 == 0 && duration.as_secs() != 0 {
        (duration.as_secs() / 60, "m")
    } else {
        (duration.as_secs(), "s")
    };
    serializer.serialize_str(&format!("{}{}", value, unit))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(serde::de::Error::custom)
}

/// Parse a duration string with one of the units `ms`, `s`, `m` or `h`.
pub fn parse(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Duration string cannot be empty".into());
    }
    if let Some(millis) = s.strip_suffix("ms") {
        let millis = millis.parse::<u64>().map_err(|e| e.to_string())?;
        return Ok(Duration::from_millis(millis));
    }
    let (value, multiplier) = if let Some(value) = s.strip_suffix('s') {
        (value, 1)
    } else if let Some(value) = s.strip_suffix('m') {
        (value, 60)
    } else if let Some(value) = s.strip_suffix('h') {
        (value, 3600)
    } else {
        return Err("Invalid time unit. Use ms, s, m, or h".into());
    };
    let value = value.parse::<u64>().map_err(|e| e.to_string())?;
    let seconds = value
        .checked_mul(multiplier)
        .ok_or("Duration overflow")?;
    Ok(Duration::from_secs(seconds))
}
