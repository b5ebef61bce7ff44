//! Messaging between the background service and the content controller
//!
//! The two sides never share memory; everything crosses as a typed message
//! with a per-request reply channel.

pub mod messages;

pub use messages::{BackgroundRequest, ContentCommand};
