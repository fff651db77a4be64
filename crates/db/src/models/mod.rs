//! Domain model structs and DTOs.
//!
//! Entity structs are `FromRow` + `Serialize` and match the database row;
//! queries that do not need every column get slim projection structs
//! instead. Tables the pipeline only projects from carry no entity struct.

pub mod event;
pub mod member;
pub mod notification;
pub mod sent_reminder;
pub mod trip;
