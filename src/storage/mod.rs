//! Where generated values live: storage strategies and store-buffer addressing.

mod address;
mod layout;
mod strategy;

pub use address::{required_store_dim, store_address};
pub use layout::StorageLayout;
pub use strategy::{StorageStrategy, StrategySelector};
