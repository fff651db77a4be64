//! Shared primitives for the Tripful backend.
//!
//! Type aliases used by every crate, plus the well-known notification type
//! constants that must stay in sync between the schedulers, the batch
//! dispatcher, and the stored `notifications.type` column.

pub mod notification_types;
pub mod types;
