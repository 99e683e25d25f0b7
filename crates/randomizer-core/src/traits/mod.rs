//! Port traits implemented by infrastructure crates

mod ports;

pub use ports::{ContentSource, KeyValueStore, RepoResult, TeamDirectory};
