//! Lenient deserialization helpers for upstream payloads.
//!
//! The roster feed and the finance API both emit `null` where a list or a
//! string is expected, and the finance API occasionally sends amounts as
//! strings. These helpers fold all of that into defaults instead of failing
//! the whole page.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize `null` (or a missing field, with `#[serde(default)]`) as `T::default()`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a currency amount, substituting `0.0` for anything absent or invalid.
///
/// Accepts JSON numbers and numeric strings. Non-finite values count as invalid.
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(amount_from_value).unwrap_or(0.0))
}

fn amount_from_value(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    amount.is_finite().then_some(amount)
}
