//! Core module - shared application utilities

pub mod error_handling;
pub mod logging;
