//! Scenario files: who talks, what they say, how the conversation opens
//!
//! ```json
//! {
//!   "seed": { "sender": "gpt4v", "content": "draw a cat" },
//!   "initiator": { "type": "scripted", "name": "gpt4v", "script": ["..."] },
//!   "responder": { "type": "remote", "name": "dalle", "base_url": "http://..." },
//!   "max_rounds": 10
//! }
//! ```
//!
//! Script lines are a bare string (plain message), `{"say": ..., "kind": ...}`,
//! `{"fail": reason}` or `null` to decline the turn.

use duet_chat::{
    ArtifactAttachments, Markers, Message, MessageKind, Participant, Preprocess, Preprocessed,
    RemoteConfig, RemoteParticipant, ReplyOverride, RequestArtifact, ScriptedParticipant,
    ScriptedReply,
};
use duet_error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// What every scenario participant is built into
pub type ScenarioParticipant = ReplyOverride<Preprocessed<Speaker, SnapshotView>>;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    pub seed: SeedSpec,
    pub initiator: ParticipantSpec,
    pub responder: ParticipantSpec,
    #[serde(default)]
    pub max_rounds: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedSpec {
    /// Defaults to the initiator's name
    #[serde(default)]
    pub sender: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantSpec {
    pub name: String,
    #[serde(flatten)]
    pub source: SourceSpec,
    /// Answer with this prompt until an artifact is on the table
    #[serde(default)]
    pub request_artifact: Option<String>,
    /// Show artifact messages to this participant as image attachments
    #[serde(default)]
    pub attach_artifacts: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceSpec {
    Scripted {
        script: Vec<Option<ScriptLine>>,
        #[serde(default)]
        cycle: bool,
    },
    Remote(RemoteConfig),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScriptLine {
    Text(String),
    Say {
        say: String,
        #[serde(default)]
        kind: MessageKind,
    },
    Fail {
        fail: String,
    },
}

/// Convert a script line (`None` declines the turn) into a scripted reply
pub fn script_reply(line: Option<ScriptLine>) -> ScriptedReply {
    match line {
        None => ScriptedReply::Decline,
        Some(ScriptLine::Text(content)) => ScriptedReply::say(content),
        Some(ScriptLine::Say { say, kind }) => ScriptedReply::Say { content: say, kind },
        Some(ScriptLine::Fail { fail }) => ScriptedReply::Fail(fail),
    }
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            Error::parse_failed(format!("invalid scenario: {}", e))
                .with_operation("scenario::parse")
                .set_source(e)
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::from(e).with_context("path", path.display().to_string()))?;
        Self::from_json_str(&content).map_err(|e| {
            e.with_operation("scenario::from_file")
                .with_context("path", path.display().to_string())
        })
    }

    /// Name for display, falling back to the participants
    pub fn title(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{} / {}", self.initiator.name, self.responder.name))
    }

    pub fn seed_message(&self) -> Message {
        let sender = self.seed.sender.as_deref().unwrap_or(&self.initiator.name);
        Message::user(sender, self.seed.content.as_str())
    }
}

impl ParticipantSpec {
    pub fn build(&self, markers: &Markers) -> Result<ScenarioParticipant> {
        let speaker = match &self.source {
            SourceSpec::Scripted { script, cycle } => {
                let script = script.iter().cloned().map(script_reply).collect();
                let scripted = if *cycle {
                    ScriptedParticipant::cycling(&self.name, script)
                } else {
                    ScriptedParticipant::new(&self.name, script)
                };
                Speaker::Scripted(scripted)
            }
            SourceSpec::Remote(config) => {
                let remote = RemoteParticipant::new(&self.name, config.clone())?;
                Speaker::Remote(remote.with_markers(markers.clone()))
            }
        };

        let view = if self.attach_artifacts {
            SnapshotView::ArtifactAttachments(ArtifactAttachments::new(markers.clone()))
        } else {
            SnapshotView::AsIs
        };

        let mut participant = ReplyOverride::new(Preprocessed::new(speaker, view));
        if let Some(prompt) = &self.request_artifact {
            participant = participant.with_hook(RequestArtifact::new(
                &self.name,
                prompt.as_str(),
                markers.clone(),
            ));
        }
        Ok(participant)
    }
}

/// The reply sources a scenario can name
pub enum Speaker {
    Scripted(ScriptedParticipant),
    Remote(RemoteParticipant),
}

impl Participant for Speaker {
    fn name(&self) -> &str {
        match self {
            Speaker::Scripted(p) => p.name(),
            Speaker::Remote(p) => p.name(),
        }
    }

    async fn reply(&self, conversation: &[Message]) -> Result<Option<Message>> {
        match self {
            Speaker::Scripted(p) => p.reply(conversation).await,
            Speaker::Remote(p) => p.reply(conversation).await,
        }
    }
}

/// Per-participant snapshot rewrite selected by the scenario
pub enum SnapshotView {
    AsIs,
    ArtifactAttachments(ArtifactAttachments),
}

impl Preprocess for SnapshotView {
    fn apply(&self, messages: Vec<Message>) -> Vec<Message> {
        match self {
            SnapshotView::AsIs => messages,
            SnapshotView::ArtifactAttachments(hook) => hook.apply(messages),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duet_engine::{ConversationEngine, EngineConfig, RunState};
    use duet_error::ErrorKind;
    use std::io::Write;

    const CAT_AND_MOUSE: &str = include_str!("../../demos/cat_and_mouse.json");
    const REMOTE_PRODUCER: &str = include_str!("../../demos/remote_producer.json");

    #[test]
    fn test_parse_demo_scenarios() {
        let scenario = Scenario::from_json_str(CAT_AND_MOUSE).unwrap();
        assert_eq!(scenario.title(), "cat_and_mouse");
        assert_eq!(scenario.max_rounds, Some(20));
        assert_eq!(scenario.seed_message().sender(), "gpt4v");
        assert!(scenario.initiator.attach_artifacts);

        let scenario = Scenario::from_json_str(REMOTE_PRODUCER).unwrap();
        match &scenario.responder.source {
            SourceSpec::Remote(config) => {
                assert_eq!(config.base_url, "http://127.0.0.1:8080");
                assert_eq!(config.timeout_secs, Some(60));
            }
            other => panic!("expected remote responder, got {:?}", other),
        }
    }

    #[test]
    fn test_script_lines() {
        let json = r#"{
            "seed": {"content": "go"},
            "initiator": {"type": "scripted", "name": "a", "script": [
                "plain",
                {"say": "[TERMINATE]", "kind": "terminated"},
                {"say": "untagged"},
                {"fail": "down"},
                null
            ]},
            "responder": {"type": "scripted", "name": "b", "script": []}
        }"#;
        let scenario = Scenario::from_json_str(json).unwrap();
        assert_eq!(scenario.seed_message().sender(), "a");
        assert_eq!(scenario.title(), "a / b");

        let SourceSpec::Scripted { script, cycle } = &scenario.initiator.source else {
            panic!("expected scripted initiator");
        };
        assert!(!cycle);

        let replies: Vec<ScriptedReply> = script.iter().cloned().map(script_reply).collect();
        assert_eq!(
            replies,
            vec![
                ScriptedReply::say("plain"),
                ScriptedReply::terminate("[TERMINATE]"),
                ScriptedReply::say("untagged"),
                ScriptedReply::fail("down"),
                ScriptedReply::Decline,
            ]
        );
    }

    #[test]
    fn test_rejects_unknown_participant_type() {
        let json = r#"{
            "seed": {"content": "go"},
            "initiator": {"type": "carrier_pigeon", "name": "a"},
            "responder": {"type": "scripted", "name": "b", "script": []}
        }"#;
        let err = Scenario::from_json_str(json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailed);
        assert!(err.source_ref().is_some());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CAT_AND_MOUSE.as_bytes()).unwrap();
        assert!(Scenario::from_file(file.path()).is_ok());

        let dir = tempfile::tempdir().unwrap();
        let err = Scenario::from_file(dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }

    #[tokio::test]
    async fn test_cat_and_mouse_runs_to_termination() {
        let scenario = Scenario::from_json_str(CAT_AND_MOUSE).unwrap();
        let markers = Markers::default();
        let critic = scenario.initiator.build(&markers).unwrap();
        let producer = scenario.responder.build(&markers).unwrap();
        let engine = ConversationEngine::new(EngineConfig::default()).unwrap();

        let outcome = engine
            .run(&critic, &producer, scenario.seed_message(), 20)
            .await
            .unwrap();

        assert_eq!(outcome.state, RunState::Terminated);
        assert_eq!(outcome.rounds, 4);
        assert_eq!(outcome.artifact(), Some("https://images.example.com/cat-2.png"));
    }

    #[tokio::test]
    async fn test_request_artifact_nudges_first() {
        let json = r#"{
            "seed": {"content": "draw a cat"},
            "initiator": {"type": "scripted", "name": "critic", "cycle": true,
                          "request_artifact": "please draw", "script": ["nice"]},
            "responder": {"type": "scripted", "name": "producer", "script": [
                "thinking about it",
                {"say": "https://img/1.png", "kind": "artifact_produced"}
            ]}
        }"#;
        let scenario = Scenario::from_json_str(json).unwrap();
        let markers = Markers::default();
        let critic = scenario.initiator.build(&markers).unwrap();
        let producer = scenario.responder.build(&markers).unwrap();

        let outcome = ConversationEngine::default()
            .run(&critic, &producer, scenario.seed_message(), 4)
            .await
            .unwrap();

        let contents: Vec<&str> = outcome
            .conversation
            .messages()
            .iter()
            .map(|m| m.content())
            .collect();
        assert_eq!(
            contents,
            ["draw a cat", "thinking about it", "please draw", "https://img/1.png", "nice"]
        );
        assert_eq!(outcome.state, RunState::Exhausted);
    }
}
