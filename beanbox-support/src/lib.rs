//! # Beanbox Support
//!
//! Shared helpers for the beanbox crates.
//!
//! This crate provides:
//! - Text rendering for container diagnostics
//! - Logging bootstrap on top of `tracing-subscriber`

pub mod logging;
pub mod rendering;
