pub mod client;
pub mod config;
pub mod smoke;

pub use client::{StoreClient, StoreError, StoreOp};
pub use config::StoreConfig;
pub use smoke::{StoreSmoke, StoreSmokeReport};
