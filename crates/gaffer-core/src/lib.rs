// League data layer: configuration, raw records, the entity model, indexed
// snapshots and the cached, rate-limit-aware data context.

pub mod cache;
pub mod config;
pub mod context;
pub mod entity;
pub mod error;
pub mod records;
pub mod retry;
pub mod snapshot;
pub mod source;
pub mod standings;

pub use context::FplContext;
pub use error::{FplError, SourceError};
pub use snapshot::LeagueSnapshot;
