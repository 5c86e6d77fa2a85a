//! Messages exchanged between participants

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// What a message means to the engine.
///
/// Set by whoever produces the message. Untagged text from outside sources
/// stays `Plain` and is classified through [`crate::Markers`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Plain,
    /// Carries a reference to a freshly produced artifact on its last line
    ArtifactProduced,
    /// The sender considers the conversation finished
    Terminated,
}

/// Structured payload riding along with the text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Attachment {
    Image { url: String },
}

/// A single utterance in a conversation.
///
/// Fields are read-only; the builder methods consume and return a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
    sender: String,
    #[serde(default)]
    kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attachment: Option<Attachment>,
}

impl Message {
    pub fn new(role: Role, sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            sender: sender.into(),
            kind: MessageKind::Plain,
            attachment: None,
        }
    }

    pub fn user(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(Role::User, sender, content)
    }

    pub fn assistant(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, sender, content)
    }

    /// An assistant message announcing an artifact. The reference goes on the
    /// last line of `content`.
    pub fn artifact(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self::assistant(sender, content).with_kind(MessageKind::ArtifactProduced)
    }

    /// An assistant message ending the conversation
    pub fn terminate(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self::assistant(sender, content).with_kind(MessageKind::Terminated)
    }

    pub fn with_kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// The final line of the content, without a trailing `\r`. `None` when
    /// that line is blank.
    ///
    /// Earlier lines are never consulted, so `"url\n"` has no last line.
    pub fn last_line(&self) -> Option<&str> {
        self.content
            .rsplit('\n')
            .next()
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.trim().is_empty())
    }

    /// Same message, attributed to `sender`
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        writeln!(f, "[{} ({})]", self.sender, role)?;
        if !self.content.is_empty() {
            writeln!(f, "{}", self.content)?;
        }
        if let Some(Attachment::Image { url }) = &self.attachment {
            writeln!(f, "  image: {}", url)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_kind_and_role() {
        let seed = Message::user("gpt4v", "please draw a cat");
        assert_eq!(seed.role(), Role::User);
        assert_eq!(seed.kind(), MessageKind::Plain);

        let art = Message::artifact("dalle", "generated\nhttps://img/1.png");
        assert_eq!(art.role(), Role::Assistant);
        assert_eq!(art.kind(), MessageKind::ArtifactProduced);

        let done = Message::terminate("gpt4v", "looks good");
        assert_eq!(done.kind(), MessageKind::Terminated);
    }

    #[test]
    fn test_last_line() {
        let msg = Message::assistant("dalle", "header\n\nhttps://img/1.png");
        assert_eq!(msg.last_line(), Some("https://img/1.png"));

        let crlf = Message::assistant("dalle", "header\r\nhttps://img/2.png\r");
        assert_eq!(crlf.last_line(), Some("https://img/2.png"));

        let single = Message::assistant("dalle", "https://img/3.png");
        assert_eq!(single.last_line(), Some("https://img/3.png"));

        let blank = Message::assistant("dalle", "   \n ");
        assert_eq!(blank.last_line(), None);
    }

    #[test]
    fn test_last_line_does_not_fall_back_to_earlier_lines() {
        let header_only = Message::artifact("dalle", "// [IMAGE_GENERATION]\n\n");
        assert_eq!(header_only.last_line(), None);

        let trailing_newline = Message::artifact("dalle", "// [IMAGE_GENERATION]\nhttps://img/x.png\n");
        assert_eq!(trailing_newline.last_line(), None);
    }

    #[test]
    fn test_with_sender() {
        let msg = Message::artifact("impostor", "https://img/1.png").with_sender("dalle");
        assert_eq!(msg.sender(), "dalle");
        assert_eq!(msg.kind(), MessageKind::ArtifactProduced);
    }

    #[test]
    fn test_wire_format() {
        let msg = Message::artifact("dalle", "https://img/1.png")
            .with_attachment(Attachment::Image { url: "https://img/1.png".into() });
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["role"], "assistant");
        assert_eq!(json["kind"], "artifact_produced");
        assert_eq!(json["attachment"]["type"], "image");
    }

    #[test]
    fn test_kind_defaults_to_plain_on_the_wire() {
        let msg: Message = serde_json::from_str(
            r#"{"role": "assistant", "content": "hi", "sender": "remote"}"#,
        )
        .unwrap();
        assert_eq!(msg.kind(), MessageKind::Plain);
        assert!(msg.attachment().is_none());
    }

    #[test]
    fn test_display() {
        let msg = Message::assistant("dalle", "here you go")
            .with_attachment(Attachment::Image { url: "https://img/1.png".into() });
        let text = msg.to_string();
        assert!(text.starts_with("[dalle (assistant)]"));
        assert!(text.contains("image: https://img/1.png"));
    }
}
