//! # LangGuard Common Library
//!
//! Shared code for the LangGuard crates:
//! - Error type
//! - Root folder resolution and TOML loading
//! - Pipeline event types and the broadcast bus
//! - SSE streaming helper

pub mod config;
pub mod error;
pub mod events;
pub mod sse;

pub use error::{Error, Result};
