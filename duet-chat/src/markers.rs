//! Termination and artifact markers
//!
//! Kind tags on [`Message`] are authoritative. The marker substrings are the
//! fallback for text that arrives untagged, e.g. from a remote oracle.

use crate::message::{Message, MessageKind};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TERMINATION_MARKER: &str = "TERMINATE";
pub const DEFAULT_ARTIFACT_MARKER: &str = "IMAGE_GENERATION";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markers {
    pub termination: String,
    pub artifact: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            termination: DEFAULT_TERMINATION_MARKER.to_string(),
            artifact: DEFAULT_ARTIFACT_MARKER.to_string(),
        }
    }
}

impl Markers {
    pub fn new(termination: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            termination: termination.into(),
            artifact: artifact.into(),
        }
    }

    pub fn is_terminal(&self, message: &Message) -> bool {
        message.kind() == MessageKind::Terminated || message.content().contains(&self.termination)
    }

    pub fn is_artifact(&self, message: &Message) -> bool {
        message.kind() == MessageKind::ArtifactProduced
            || message.content().contains(&self.artifact)
    }

    /// Kind a piece of untagged text would get. Termination wins when both
    /// markers appear.
    pub fn classify(&self, content: &str) -> MessageKind {
        if content.contains(&self.termination) {
            MessageKind::Terminated
        } else if content.contains(&self.artifact) {
            MessageKind::ArtifactProduced
        } else {
            MessageKind::Plain
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_authoritative() {
        let markers = Markers::default();
        assert!(markers.is_terminal(&Message::terminate("critic", "fine")));
        assert!(markers.is_artifact(&Message::artifact("producer", "https://img/1.png")));
        assert!(!markers.is_artifact(&Message::assistant("producer", "https://img/1.png")));
    }

    #[test]
    fn test_marker_fallback_on_plain_text() {
        let markers = Markers::default();
        let text = Message::assistant("critic", "[TERMINATE]");
        assert!(markers.is_terminal(&text));

        let art = Message::assistant("producer", "// [IMAGE_GENERATION]\nhttps://img/1.png");
        assert!(markers.is_artifact(&art));
        assert!(!markers.is_terminal(&art));
    }

    #[test]
    fn test_classify() {
        let markers = Markers::new("DONE", "ART");
        assert_eq!(markers.classify("ART\nurl"), MessageKind::ArtifactProduced);
        assert_eq!(markers.classify("ART DONE"), MessageKind::Terminated);
        assert_eq!(markers.classify("try again"), MessageKind::Plain);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let markers: Markers = serde_json::from_str(r#"{"termination": "APPROVED"}"#).unwrap();
        assert_eq!(markers.termination, "APPROVED");
        assert_eq!(markers.artifact, DEFAULT_ARTIFACT_MARKER);
    }
}
