//! API Routes
//!
//! Route handlers organized by functionality.

pub mod allocation;
pub mod health;
pub mod proxy;
pub mod quote;
