//! Pure inventory domain logic for Stockpile.
//!
//! This crate holds no I/O. Everything here is evaluated against data
//! passed in by the caller: bulk operation descriptors and their
//! validation, per-record mutation computation, stock classification,
//! transaction totals and dashboard KPIs.

pub mod bulk_operation;
pub mod dashboard;
pub mod error;
pub mod inventory;
pub mod money;
pub mod transaction;
pub mod types;
