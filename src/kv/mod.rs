//! Key-value configuration store: JSON encode/decode boundary over a transactional backend.

mod service;
mod store;
mod value;
#[cfg(test)]
pub(crate) mod memory;

pub use service::{parse_bulk_items, BulkItem, ConfigService};
pub use store::{KvStore, PgKvStore};
pub use value::{encode_value, StoredValue};
