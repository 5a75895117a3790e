//! Role-based access control enforcement.

pub mod enforcer;

pub use enforcer::RbacEnforcer;
