use serde::{Deserialize, Deserializer};

/// Deserializes an `Option<Option<T>>` patch field so that an explicit JSON
/// `null` becomes `Some(None)` (clear the column) while an absent field stays
/// `None` via `#[serde(default)]` (leave unchanged).
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

pub mod education;
pub mod links;
pub mod projects;
pub mod skills;
pub mod work;
