//! # docvault-auth
//!
//! Authorization for the DocVault core. Authentication itself is an
//! external concern; this crate receives an already-resolved principal.
//!
//! ## Modules
//!
//! - `access`: lock bypass, delete/move/share gates, capability flags
//! - `rbac`: minimum-role enforcement with role-named errors
//! - `password`: Argon2id hashing of lock passwords

pub mod access;
pub mod password;
pub mod rbac;

pub use access::{AccessResolver, BypassSource, CapabilityFlags};
pub use password::PasswordHasher;
pub use rbac::RbacEnforcer;
