//! Database rows, request payloads and response DTOs.
//!
//! Rows derive `FromRow`; everything that crosses the wire derives `ToSchema` for the
//! OpenAPI document and `TS` for the generated frontend bindings.

pub mod account;
pub mod content;

pub use account::*;
pub use content::*;

/// Deserializer for `Option<Option<T>>` patch fields, paired with `#[serde(default)]`:
/// an absent field stays `None` and an explicit `null` becomes `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}
