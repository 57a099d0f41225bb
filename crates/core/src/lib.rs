//! Core logic of the chat: the message log, turn-taking against a model
//! provider, and analysis report generation.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod conversation;
mod error;
mod model_client;
mod report;
mod session;

pub use error::ChatError;
pub use neuro_chat_report::{ExportError, Report, ReportDocument};
pub use report::analysis_prompt;
pub use session::{ChatSession, ChatSessionBuilder};
