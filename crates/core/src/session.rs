use std::sync::Arc;

use neuro_chat_model::{
    ModelFinishReason, ModelMessage, ModelProvider, ModelRequest,
    SamplingParams,
};

use crate::ChatError;
use crate::conversation::{Conversation, Message};
use crate::model_client::{DeltaObserver, ModelClient};

/// [`ChatSession`] builder.
pub struct ChatSessionBuilder {
    model_client: ModelClient,
    greeting: Option<String>,
    params: SamplingParams,
    on_delta: Option<DeltaObserver>,
}

impl ChatSessionBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            greeting: None,
            params: SamplingParams::default(),
            on_delta: None,
        }
    }

    /// Seeds the conversation with an assistant greeting.
    #[inline]
    pub fn with_greeting<S: Into<String>>(mut self, greeting: S) -> Self {
        self.greeting = Some(greeting.into());
        self
    }

    /// Overrides the sampling parameters sent with every request.
    #[inline]
    pub fn with_sampling_params(mut self, params: SamplingParams) -> Self {
        self.params = params;
        self
    }

    /// Attaches a callback to be invoked for every streamed delta of a chat
    /// reply. Report generation does not stream through it.
    #[inline]
    pub fn on_delta(
        mut self,
        on_delta: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.on_delta = Some(Arc::new(on_delta));
        self
    }

    /// Builds the session.
    #[inline]
    pub fn build(self) -> ChatSession {
        let conversation = match self.greeting {
            Some(greeting) => Conversation::with_greeting(greeting),
            None => Conversation::new(),
        };
        ChatSession {
            model_client: self.model_client,
            conversation,
            params: self.params,
            on_delta: self.on_delta,
        }
    }
}

/// A chat session, which owns the conversation and takes turns with the
/// model.
///
/// Every submitted user message is answered by exactly one assistant
/// message. Turns take `&mut self`, so they can never interleave.
pub struct ChatSession {
    pub(crate) model_client: ModelClient,
    pub(crate) conversation: Conversation,
    pub(crate) params: SamplingParams,
    on_delta: Option<DeltaObserver>,
}

impl ChatSession {
    /// Returns the conversation so far.
    #[inline]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Sends `text` to the model and returns its reply.
    ///
    /// Blank text is rejected before anything is sent. The reply may be
    /// empty, which usually means something went wrong upstream.
    ///
    /// If the provider fails, an empty assistant message is still recorded
    /// to keep the conversation paired, and the error is returned.
    pub async fn submit(&mut self, text: &str) -> Result<String, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyInput);
        }
        take_turn(
            &self.model_client,
            &mut self.conversation,
            &self.params,
            text.to_owned(),
            self.on_delta.clone(),
        )
        .await
    }
}

/// Runs one user/assistant exchange on `conversation`.
///
/// The conversation is only touched once the model has answered, so a
/// cancelled turn leaves no unpaired user message behind.
pub(crate) async fn take_turn(
    model_client: &ModelClient,
    conversation: &mut Conversation,
    params: &SamplingParams,
    text: String,
    on_delta: Option<DeltaObserver>,
) -> Result<String, ChatError> {
    let mut messages = conversation.to_model_messages();
    messages.push(ModelMessage::User(text.clone()));
    let request = ModelRequest {
        messages,
        params: params.clone(),
    };
    debug!("starting turn with {} messages", request.messages.len());

    let result = model_client.send_request(request, on_delta).await;
    conversation.push(Message::user(text));

    let resp = match result {
        Ok(resp) => resp,
        Err(err) => {
            conversation.push(Message::assistant(""));
            return Err(ChatError::Provider(err));
        }
    };

    if resp.text.trim().is_empty() {
        warn!("model returned an empty response");
    }
    if resp.finish_reason == Some(ModelFinishReason::Length) {
        debug!("response was cut off by the token limit");
    }
    conversation.push(Message::assistant(resp.text.clone()));
    Ok(resp.text)
}
