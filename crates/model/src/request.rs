/// A request to be sent to the model provider.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelRequest {
    /// The input messages, in chronological order.
    pub messages: Vec<ModelMessage>,
    /// Generation parameters for this request.
    pub params: SamplingParams,
}

/// A complete message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModelMessage {
    /// The system instructions.
    System(String),
    /// A user input text.
    User(String),
    /// An assistant text.
    Assistant(String),
}

/// Parameters that control how the model samples its output.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplingParams {
    /// Sampling temperature, higher values make the output more creative.
    pub temperature: f32,
    /// Upper bound of generated tokens.
    pub max_tokens: u32,
    /// Nucleus sampling threshold.
    pub top_p: f32,
    /// Sequences where the model stops generating. `None` leaves the
    /// decision to the provider.
    pub stop: Option<Vec<String>>,
}

impl Default for SamplingParams {
    #[inline]
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 150,
            top_p: 0.9,
            stop: None,
        }
    }
}
