use std::fmt::Write as _;

use neuro_chat_report::{Report, ReportDocument};

use crate::ChatError;
use crate::conversation::Conversation;
use crate::session::{ChatSession, take_turn};

const ANALYSIS_PREAMBLE: &str = "Based on the following conversation, \
    generate a brief report focusing on the user's behavior and learning. \
    Identify key themes, concerns, and learning strategies mentioned. \
    Provide a summary of the user's educational needs and any suggestions \
    for improvement.\n\n";

/// Builds the prompt that asks the model to analyze `conversation`.
///
/// Every message is rendered as `<Role>: <content>` on its own line.
pub fn analysis_prompt(conversation: &Conversation) -> String {
    let mut prompt = String::from(ANALYSIS_PREAMBLE);
    prompt.push_str("Conversation:\n");
    for message in conversation {
        let _ = writeln!(prompt, "{}: {}", message.role(), message.content());
    }
    prompt
}

impl ChatSession {
    /// Asks the model to analyze the conversation so far.
    ///
    /// The analysis runs on a snapshot of the conversation, neither the
    /// prompt nor the reply is added to the visible log.
    pub async fn analyze(&self) -> Result<Report, ChatError> {
        let mut snapshot = self.conversation.clone();
        let prompt = analysis_prompt(&snapshot);
        let summary = take_turn(
            &self.model_client,
            &mut snapshot,
            &self.params,
            prompt,
            None,
        )
        .await?;

        if summary.trim().is_empty() {
            warn!("analysis produced no content");
            return Err(ChatError::EmptyGeneration);
        }
        Ok(Report::analysis(summary))
    }

    /// Analyzes the conversation and renders the result as a PDF.
    pub async fn generate_report(&self) -> Result<ReportDocument, ChatError> {
        let report = self.analyze().await?;
        info!("generating report from {} messages", self.conversation.len());
        Ok(report.render()?)
    }
}
