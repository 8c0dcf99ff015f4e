use chrono::{DateTime, SecondsFormat};
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Timestamp field that accepts RFC 3339 strings or integer milliseconds.
///
/// The raw string is kept as-is (validity is checked by consumers); integers are converted to an
/// RFC 3339 string and `null` becomes the empty string.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => {
            let ms = n.as_i64().ok_or_else(|| Error::custom("invalid timestamp"))?;
            DateTime::from_timestamp_millis(ms)
                .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
                .ok_or_else(|| Error::custom("timestamp out of range"))
        }
        Value::Null => Ok(String::new()),
        _ => Err(Error::custom("timestamp must be a number or string")),
    }
}

/// Treat an explicit `null` the same as a missing field.
pub fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
