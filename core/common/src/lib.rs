//! Shared error taxonomy for the sealed-stream workspace.
//!
//! Every crate in this workspace that can fail — the codec, the streaming
//! state machines, the CLI — shares the single [`Error`] type defined here,
//! rather than each layer inventing its own.

pub mod error;

pub use error::{Error, Result};
