//! Conversation-related types.

use std::fmt::{self, Display};
use std::slice;

use neuro_chat_model::ModelMessage;

/// Who wrote a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The person chatting.
    User,
    /// The model.
    Assistant,
}

impl Role {
    /// Returns the capitalized role name.
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A message in the conversation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    /// Creates a message written by the user.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a message written by the model.
    #[inline]
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Returns the role of the author.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the text of the message.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    pub(crate) fn to_model_message(&self) -> ModelMessage {
        match self.role {
            Role::User => ModelMessage::User(self.content.clone()),
            Role::Assistant => ModelMessage::Assistant(self.content.clone()),
        }
    }
}

/// An ordered, append-only log of messages.
///
/// Only the owning session appends to the log. Everyone else gets a
/// read-only view.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Creates an empty conversation.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a conversation that opens with an assistant greeting.
    #[inline]
    pub fn with_greeting<S: Into<String>>(greeting: S) -> Self {
        Self {
            messages: vec![Message::assistant(greeting)],
        }
    }

    /// Returns all messages in chronological order.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Iterates over the messages in chronological order.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Returns the number of messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if there are no messages.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the latest message.
    #[inline]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    #[inline]
    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub(crate) fn to_model_messages(&self) -> Vec<ModelMessage> {
        self.messages.iter().map(Message::to_model_message).collect()
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a Message;
    type IntoIter = slice::Iter<'a, Message>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting() {
        let conversation = Conversation::with_greeting("Hello!");
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.messages()[0], Message::assistant("Hello!"));
        assert!(Conversation::new().is_empty());
    }

    #[test]
    fn test_model_messages() {
        let mut conversation = Conversation::with_greeting("Hi there");
        conversation.push(Message::user("I need help"));
        assert_eq!(
            conversation.to_model_messages(),
            vec![
                ModelMessage::Assistant("Hi there".to_owned()),
                ModelMessage::User("I need help".to_owned()),
            ]
        );
        let roles: Vec<_> = conversation.iter().map(Message::role).collect();
        assert_eq!(roles, vec![Role::Assistant, Role::User]);
    }

    #[test]
    fn test_role_label() {
        assert_eq!(Role::User.to_string(), "User");
        assert_eq!(Role::Assistant.label(), "Assistant");
    }
}
