//! Shared types for Strata: the chat data model, the reference catalog,
//! application configuration, errors, and structured trace events.

pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod trace;

pub use error::{Error, ErrorKind, Result};
