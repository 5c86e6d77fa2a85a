//! Scripted participants - replay a fixed list of replies

use super::Participant;
use crate::error::{Error, Result};
use crate::message::{Message, MessageKind};
use std::sync::atomic::{AtomicUsize, Ordering};

/// One entry of a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    /// Say `content` with the given kind tag
    Say { content: String, kind: MessageKind },
    /// Decline the turn
    Decline,
    /// Fail the turn with this reason
    Fail(String),
}

impl ScriptedReply {
    pub fn say(content: impl Into<String>) -> Self {
        Self::Say {
            content: content.into(),
            kind: MessageKind::Plain,
        }
    }

    pub fn artifact(content: impl Into<String>) -> Self {
        Self::Say {
            content: content.into(),
            kind: MessageKind::ArtifactProduced,
        }
    }

    pub fn terminate(content: impl Into<String>) -> Self {
        Self::Say {
            content: content.into(),
            kind: MessageKind::Terminated,
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self::Fail(reason.into())
    }
}

/// Replays its script one entry per turn.
///
/// Once the script runs out the participant declines every turn, unless it
/// was built with [`ScriptedParticipant::cycling`], in which case it starts
/// over from the first entry.
#[derive(Debug)]
pub struct ScriptedParticipant {
    name: String,
    script: Vec<ScriptedReply>,
    cycle: bool,
    cursor: AtomicUsize,
}

impl ScriptedParticipant {
    pub fn new(name: impl Into<String>, script: Vec<ScriptedReply>) -> Self {
        Self {
            name: name.into(),
            script,
            cycle: false,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn cycling(name: impl Into<String>, script: Vec<ScriptedReply>) -> Self {
        Self {
            cycle: true,
            ..Self::new(name, script)
        }
    }

    /// Number of turns taken so far
    pub fn turns_taken(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    /// Start over from the first entry
    pub fn rewind(&self) {
        self.cursor.store(0, Ordering::SeqCst);
    }

    fn next_entry(&self) -> Option<&ScriptedReply> {
        let turn = self.cursor.fetch_add(1, Ordering::SeqCst);
        if self.script.is_empty() {
            return None;
        }
        if self.cycle {
            self.script.get(turn % self.script.len())
        } else {
            self.script.get(turn)
        }
    }
}

impl Participant for ScriptedParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    async fn reply(&self, _conversation: &[Message]) -> Result<Option<Message>> {
        match self.next_entry() {
            Some(ScriptedReply::Say { content, kind }) => {
                Ok(Some(Message::assistant(&self.name, content.as_str()).with_kind(*kind)))
            }
            Some(ScriptedReply::Fail(reason)) => {
                Err(Error::participant_failed(&self.name, reason.as_str())
                    .with_operation("scripted::reply"))
            }
            Some(ScriptedReply::Decline) | None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_replays_in_order_then_declines() {
        let producer = ScriptedParticipant::new(
            "dalle",
            vec![ScriptedReply::artifact("https://img/1.png"), ScriptedReply::say("hmm")],
        );

        let first = producer.reply(&[]).await.unwrap().unwrap();
        assert_eq!(first.sender(), "dalle");
        assert_eq!(first.kind(), MessageKind::ArtifactProduced);

        let second = producer.reply(&[]).await.unwrap().unwrap();
        assert_eq!(second.content(), "hmm");

        assert!(producer.reply(&[]).await.unwrap().is_none());
        assert_eq!(producer.turns_taken(), 3);
    }

    #[tokio::test]
    async fn test_cycling_and_rewind() {
        let critic = ScriptedParticipant::cycling(
            "gpt4v",
            vec![ScriptedReply::say("a"), ScriptedReply::say("b")],
        );

        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(critic.reply(&[]).await.unwrap().unwrap().content().to_string());
        }
        assert_eq!(seen, ["a", "b", "a", "b", "a"]);

        critic.rewind();
        let again = critic.reply(&[]).await.unwrap().unwrap();
        assert_eq!(again.content(), "a");
    }

    #[tokio::test]
    async fn test_decline_and_fail_entries() {
        let flaky = ScriptedParticipant::new(
            "flaky",
            vec![ScriptedReply::Decline, ScriptedReply::fail("upstream 503")],
        );

        assert!(flaky.reply(&[]).await.unwrap().is_none());

        let err = flaky.reply(&[]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParticipantFailed);
        assert_eq!(err.context_value("participant"), Some("flaky"));
    }

    #[tokio::test]
    async fn test_empty_cycling_script_declines() {
        let silent = ScriptedParticipant::cycling("silent", Vec::new());
        assert!(silent.reply(&[]).await.unwrap().is_none());
    }
}
