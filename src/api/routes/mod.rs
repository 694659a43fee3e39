//! API Routes
//!
//! Route handlers organized by functionality.

pub mod charts;
pub mod diagnostics;
pub mod health;
pub mod refresh;
pub mod table;
