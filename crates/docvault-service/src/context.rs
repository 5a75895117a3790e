//! Request context carrying the acting principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docvault_core::types::UserId;
use docvault_entity::principal::{Principal, Role};

/// Context for the current operation.
///
/// Supplied by the session layer and passed into service methods so that
/// every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting principal.
    pub principal: Principal,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            request_time: Utc::now(),
        }
    }

    /// The acting user's ID.
    pub fn user_id(&self) -> UserId {
        self.principal.id
    }

    /// The acting user's role.
    pub fn role(&self) -> Role {
        self.principal.role
    }

    /// Returns whether the current user is Admin or above.
    pub fn is_admin(&self) -> bool {
        self.principal.role.is_admin_or_above()
    }
}
