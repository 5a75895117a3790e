//! Browsing state for the presentation layer.

pub mod session;

pub use session::{BrowserSession, NavEntry};
