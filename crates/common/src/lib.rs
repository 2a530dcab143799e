//! Shared plumbing for the user registry binaries: logging setup, runtime
//! environment checks, small response types and the admin listener.

pub mod types;
pub mod utils;
pub mod env;
pub mod admin_http;
