//! HTTP adapters for the ports the domain layer defines
//!
//! - `RestTeamDirectory`: teams, memberships and identity search over the
//!   work-tracking platform REST API
//! - `HttpContentSource`: the static question and holiday documents

pub mod content;
pub mod devops;

pub use content::HttpContentSource;
pub use devops::RestTeamDirectory;

use std::time::Duration;

/// Timeout applied to every outbound request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
