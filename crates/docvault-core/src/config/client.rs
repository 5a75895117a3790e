//! Client-side listing and transport configuration.

use serde::{Deserialize, Serialize};

use crate::types::sorting::SortSpec;

/// Settings describing how this client lists and calls the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Sort applied to listings when the caller does not choose one.
    #[serde(default)]
    pub default_sort: SortSpec,
    /// Per-request timeout in seconds handed to the transport layer.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_sort: SortSpec::default(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}
