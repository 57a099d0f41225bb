//! An abstraction layer for chat completion providers.
//!
//! This crate establishes an unified protocol for the chat session to
//! talk to a hosted text-generation service, so that the session can be
//! driven by a real provider in production and by a scripted one in
//! tests without modifying the core codebase.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
