//! Shared serde helper functions used across multiple modules.

use serde::{Deserialize, Deserializer};

/// Serde default function that returns `true`.
///
/// Used for capability flags that are enabled unless configured otherwise.
pub fn default_true() -> bool {
    true
}

/// Deserialize a value, treating an explicit JSON `null` as the type's default.
///
/// The remote API emits `null` for empty collections on some card fields.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
