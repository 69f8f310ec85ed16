//! Notopia client library
//!
//! This library provides the core of a note-taking client: creating,
//! organizing, tagging and searching markdown pastes against a remote
//! document store, an offline buffer with reconnect sync, and slug-based
//! public view links.

mod cli;
mod client;
mod config;
mod connectivity;
mod errors;
mod helper;
mod note;
mod offline;
mod remote;
mod slug;
mod storage;
mod sync;
mod types;

// Re-export key components
pub use cli::*;
pub use client::*;
pub use config::*;
pub use connectivity::*;
pub use errors::*;
pub use helper::*;
pub use note::*;
pub use offline::*;
pub use remote::*;
pub use slug::*;
pub use storage::*;
pub use sync::*;
pub use types::*;
