//! Row models and DTOs, one module per table.

pub mod category;
pub mod tag;
pub mod template;
pub mod user;

use serde::{Deserialize, Deserializer};
use stencil_core::types::DbId;

/// One entry of a reorder request: the new `order_index` for `id`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OrderEntry {
    pub id: DbId,
    pub order_index: i64,
}

/// Deserialize a clearable field: absent is `None` (with `#[serde(default)]`),
/// `null` is `Some(None)` and a value is `Some(Some(v))`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
