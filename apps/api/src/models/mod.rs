pub mod employee;
pub mod project;
pub mod user;

use serde::{Deserialize, Deserializer};

/// Deserializes a PATCH field that can be cleared. Use with
/// `#[serde(default, deserialize_with = "deserialize_nullable")]`:
/// an absent key stays `None`, `null` becomes `Some(None)`.
pub fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
