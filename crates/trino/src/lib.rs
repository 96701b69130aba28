pub mod client;
pub mod config;
pub mod cursor;
pub mod protocol;
pub mod result;
pub mod smoke;

pub use client::{Connection, TrinoError};
pub use config::TrinoConfig;
pub use cursor::{Cursor, Row};
pub use result::{QueryMetadata, QueryResult, TrinoColumn};
pub use smoke::{QuerySmoke, QuerySmokeReport};
