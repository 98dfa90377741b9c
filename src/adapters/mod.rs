//! Adapters layer. Implementations of ports for concrete backends.

pub mod export;
pub mod http;
pub mod persistence;
pub mod ui;
