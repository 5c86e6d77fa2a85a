//! The append-only conversation log

use crate::message::Message;
use serde::Serialize;

/// Ordered, append-only sequence of messages.
///
/// There is no way to remove or edit an entry once pushed. Participants get
/// `&[Message]` views through [`Conversation::messages`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Most recent message matching `predicate`
    pub fn find_latest(&self, predicate: impl Fn(&Message) -> bool) -> Option<&Message> {
        self.messages.iter().rev().find(|m| predicate(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageKind;

    #[test]
    fn test_append_order() {
        let mut conv = Conversation::new();
        assert!(conv.is_empty());

        conv.push(Message::user("critic", "draw"));
        conv.push(Message::artifact("producer", "https://img/1.png"));

        assert_eq!(conv.len(), 2);
        assert_eq!(conv.messages()[0].sender(), "critic");
        assert_eq!(conv.last().map(|m| m.sender()), Some("producer"));
    }

    #[test]
    fn test_find_latest() {
        let mut conv = Conversation::new();
        conv.push(Message::artifact("producer", "https://img/1.png"));
        conv.push(Message::assistant("critic", "more contrast"));
        conv.push(Message::artifact("producer", "https://img/2.png"));
        conv.push(Message::assistant("critic", "ok"));

        let latest = conv
            .find_latest(|m| m.kind() == MessageKind::ArtifactProduced)
            .unwrap();
        assert_eq!(latest.content(), "https://img/2.png");
        assert!(conv.find_latest(|m| m.kind() == MessageKind::Terminated).is_none());
    }
}
