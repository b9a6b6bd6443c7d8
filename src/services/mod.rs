//! Business logic services.
//!
//! Services contain the API key lifecycle separated from HTTP handlers:
//! - `key_generator`: produces new `dandi-` keys
//! - `key_store`: CRUD and status changes against the key table
//! - `key_validator`: the trust decision for a candidate key
//! - `lifecycle`: value-shaped operation surface for the dashboard

pub mod key_generator;
pub mod key_store;
pub mod key_validator;
pub mod lifecycle;
