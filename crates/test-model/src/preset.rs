use neuro_chat_model::ErrorKind;
use serde::{Deserialize, Serialize};

/// The events in a preset response.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetEvent {
    #[serde(rename = "message_delta")]
    MessageDelta(String),
    /// The stream breaks with an error of this kind.
    #[serde(rename = "failure")]
    Failure(ErrorKind),
}

/// The preset response for one request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetResponse {
    /// Events in this response.
    pub events: Vec<PresetEvent>,
    /// If set, the request is rejected before any event is streamed.
    pub rejection: Option<ErrorKind>,
}

impl PresetResponse {
    /// Creates a `PresetResponse` with the specified events.
    #[inline]
    pub fn with_events(events: impl Into<Vec<PresetEvent>>) -> Self {
        Self {
            events: events.into(),
            rejection: None,
        }
    }

    /// Creates a `PresetResponse` that streams `text` split on spaces.
    pub fn with_text(text: &str) -> Self {
        let mut events = vec![];
        let mut words = text.split(' ').peekable();
        while let Some(word) = words.next() {
            let mut delta = word.to_owned();
            if words.peek().is_some() {
                delta.push(' ');
            }
            if !delta.is_empty() {
                events.push(PresetEvent::MessageDelta(delta));
            }
        }
        Self::with_events(events)
    }

    /// Creates a `PresetResponse` whose request fails with `kind`.
    #[inline]
    pub fn rejected_with(kind: ErrorKind) -> Self {
        Self {
            events: vec![],
            rejection: Some(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let response = PresetResponse::with_events([
            PresetEvent::MessageDelta("I have left ".to_string()),
            PresetEvent::Failure(ErrorKind::Network),
        ]);

        let serialized = serde_json::to_string(&response).unwrap();
        let deserialized: PresetResponse =
            serde_json::from_str(&serialized).unwrap();

        assert_eq!(response, deserialized);
    }

    #[test]
    fn test_with_text() {
        let response = PresetResponse::with_text("How are you?");
        assert_eq!(
            response.events,
            vec![
                PresetEvent::MessageDelta("How ".to_owned()),
                PresetEvent::MessageDelta("are ".to_owned()),
                PresetEvent::MessageDelta("you?".to_owned()),
            ]
        );
        assert!(PresetResponse::with_text("").events.is_empty());
    }
}
