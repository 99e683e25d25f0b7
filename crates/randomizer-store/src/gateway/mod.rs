//! Settings persistence gateway.

mod persistence;

pub use persistence::{PersistenceGateway, SETTINGS_KEY};
