//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Purge: physically removes expired entries from the memory store

mod cleanup;

pub use cleanup::spawn_cleanup_task;
