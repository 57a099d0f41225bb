use neuro_chat_model::{ModelMessage, ModelRequest};
use serde::{Deserialize, Serialize};

use crate::OpenAIConfig;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct Delta {
    pub content: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System { content: String },
    User { content: String },
    Assistant { content: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    stream: bool,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(
    req: &ModelRequest,
    config: &OpenAIConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: req.messages.iter().map(create_message).collect(),
        temperature: req.params.temperature,
        max_tokens: req.params.max_tokens,
        top_p: req.params.top_p,
        stop: req.params.stop.clone(),
        stream: true,
    }
}

#[inline]
fn create_message(msg: &ModelMessage) -> Message {
    match msg {
        ModelMessage::System(content) => Message::System {
            content: content.clone(),
        },
        ModelMessage::User(content) => Message::User {
            content: content.clone(),
        },
        ModelMessage::Assistant(content) => Message::Assistant {
            content: content.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use neuro_chat_model::SamplingParams;
    use serde_json::json;

    use super::*;
    use crate::OpenAIConfigBuilder;

    #[test]
    fn test_create_request() {
        let request = ModelRequest {
            messages: vec![
                ModelMessage::Assistant("How are you feeling?".to_owned()),
                ModelMessage::User("Hello".to_owned()),
            ],
            params: SamplingParams::default(),
        };
        let config = OpenAIConfigBuilder::with_api_key("xxx")
            .with_model("custom")
            .build();
        let expected = ChatCompletionRequest {
            model: "custom".to_owned(),
            messages: vec![
                Message::Assistant {
                    content: "How are you feeling?".to_owned(),
                },
                Message::User {
                    content: "Hello".to_owned(),
                },
            ],
            temperature: 0.7,
            max_tokens: 150,
            top_p: 0.9,
            stop: None,
            stream: true,
        };
        assert_eq!(create_request(&request, &config), expected);
    }

    #[test]
    fn test_request_wire_format() {
        let request = ModelRequest {
            messages: vec![
                ModelMessage::System("Be brief.".to_owned()),
                ModelMessage::User("Hi".to_owned()),
            ],
            params: SamplingParams {
                stop: Some(vec!["\n\n".to_owned()]),
                ..SamplingParams::default()
            },
        };
        let config = OpenAIConfigBuilder::with_api_key("xxx").build();
        let value =
            serde_json::to_value(create_request(&request, &config)).unwrap();
        assert_eq!(value["model"], "llama-3.3-70b-versatile");
        assert_eq!(
            value["messages"],
            json!([
                { "role": "system", "content": "Be brief." },
                { "role": "user", "content": "Hi" },
            ])
        );
        assert_eq!(value["max_tokens"], 150);
        assert_eq!(value["stream"], true);
        assert_eq!(value["stop"], json!(["\n\n"]));

        let request = ModelRequest {
            messages: vec![],
            params: SamplingParams::default(),
        };
        let value =
            serde_json::to_value(create_request(&request, &config)).unwrap();
        assert!(value.get("stop").is_none());
    }

    #[test]
    fn test_parse_chunk() {
        let chunk: ChatCompletionChunk = serde_json::from_str(
            r#"{"id":"c1","object":"chat.completion.chunk","choices":[{"index":0,"delta":{"role":"assistant"},"finish_reason":null}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.choices[0].delta.content, None);

        let chunk: ChatCompletionChunk = serde_json::from_str(
            r#"{"id":"c1","choices":[],"x_groq":{"usage":{"total_tokens":3}}}"#,
        )
        .unwrap();
        assert!(chunk.choices.is_empty());
    }
}
