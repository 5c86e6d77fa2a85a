//! The turn-taking loop

use crate::config::EngineConfig;
use crate::outcome::{ConversationOutcome, RunError, RunState, StopReason};
use duet_chat::{Conversation, Markers, Message, Participant, Preprocess};
use duet_error::{Error, ErrorKind, Result};

type Observer = Box<dyn Fn(usize, &Message) + Send + Sync>;

/// Runs bounded two-party conversations.
///
/// The engine owns the conversation for the duration of a run. Each turn the
/// awaited participant gets a read-only snapshot (passed through the
/// preprocessing hook, if any), and its reply, if any, is appended.
pub struct ConversationEngine {
    config: EngineConfig,
    preprocess: Option<Box<dyn Preprocess>>,
    observer: Option<Observer>,
}

impl ConversationEngine {
    /// Create an engine, rejecting invalid configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            preprocess: None,
            observer: None,
        })
    }

    /// Rewrite every snapshot before a participant sees it. The rewritten
    /// messages never make it back into the conversation.
    pub fn with_preprocess(mut self, hook: impl Preprocess + 'static) -> Self {
        self.preprocess = Some(Box::new(hook));
        self
    }

    /// Called with `(round, message)` for the seed (round 0) and every reply
    pub fn with_observer(mut self, observer: impl Fn(usize, &Message) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn markers(&self) -> &Markers {
        &self.config.markers
    }

    /// Run with the configured round cap
    pub async fn converse<I, R>(
        &self,
        initiator: &I,
        responder: &R,
        seed: Message,
    ) -> std::result::Result<ConversationOutcome, RunError>
    where
        I: Participant,
        R: Participant,
    {
        self.run(initiator, responder, seed, self.config.max_rounds).await
    }

    /// Run a conversation.
    ///
    /// `seed` is the initiator's opening message; the responder takes the
    /// first turn and the two alternate from there for at most `max_rounds`
    /// turns.
    #[tracing::instrument(
        name = "conversation",
        skip_all,
        fields(initiator = initiator.name(), responder = responder.name(), max_rounds = max_rounds)
    )]
    pub async fn run<I, R>(
        &self,
        initiator: &I,
        responder: &R,
        seed: Message,
        max_rounds: usize,
    ) -> std::result::Result<ConversationOutcome, RunError>
    where
        I: Participant,
        R: Participant,
    {
        let mut conversation = Conversation::new();

        if max_rounds == 0 {
            let err = Error::invalid_argument("max_rounds must be at least 1")
                .with_operation("engine::run");
            return Err(RunError::new(err, conversation));
        }

        self.observe(0, &seed);
        conversation.push(seed);

        let mut state = RunState::AwaitingProducer;
        let mut rounds = 0;

        let stop_reason = loop {
            if rounds == max_rounds {
                state = RunState::Exhausted;
                break StopReason::RoundLimit;
            }

            let turn = rounds + 1;
            let (speaker, reply) = if state == RunState::AwaitingProducer {
                (responder.name(), self.take_turn(responder, &conversation).await)
            } else {
                (initiator.name(), self.take_turn(initiator, &conversation).await)
            };

            let reply = match reply {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!(round = turn, participant = speaker, error = %e, "participant failed");
                    return Err(RunError::new(participant_failure(e, speaker, turn), conversation));
                }
            };

            let Some(message) = reply else {
                tracing::debug!(round = turn, participant = speaker, "participant declined to reply");
                state = RunState::Exhausted;
                break StopReason::NoReply {
                    participant: speaker.to_string(),
                };
            };

            let message = if message.sender() == speaker {
                message
            } else {
                tracing::debug!(round = turn, participant = speaker, claimed = message.sender(), "restamping reply sender");
                message.with_sender(speaker)
            };

            rounds = turn;
            let terminal = self.config.markers.is_terminal(&message);
            tracing::debug!(
                round = rounds,
                sender = message.sender(),
                kind = ?message.kind(),
                terminal,
                "appended reply"
            );
            self.observe(rounds, &message);
            conversation.push(message);

            state = state.after_reply(terminal);
            if state == RunState::Terminated {
                break StopReason::TerminationSignaled;
            }
        };

        let artifact = if state == RunState::Terminated {
            match self.extract_artifact(&conversation) {
                Ok(artifact) => Some(artifact),
                Err(e) => {
                    tracing::warn!(round = rounds, error = %e, "termination without artifact");
                    return Err(RunError::new(e.with_context("round", rounds.to_string()), conversation));
                }
            }
        } else {
            None
        };

        tracing::info!(
            %state,
            rounds,
            messages = conversation.len(),
            artifact = artifact.as_deref().unwrap_or(""),
            "conversation finished"
        );

        Ok(ConversationOutcome {
            state,
            stop_reason,
            rounds,
            artifact,
            conversation,
        })
    }

    async fn take_turn<P: Participant>(
        &self,
        participant: &P,
        conversation: &Conversation,
    ) -> Result<Option<Message>> {
        match &self.preprocess {
            Some(hook) => {
                let view = hook.apply(conversation.messages().to_vec());
                participant.reply(&view).await
            }
            None => participant.reply(conversation.messages()).await,
        }
    }

    /// Last line of the most recent artifact message, searched over the
    /// whole history, terminal message included.
    fn extract_artifact(&self, conversation: &Conversation) -> Result<String> {
        let markers = &self.config.markers;
        let message = conversation
            .find_latest(|m| markers.is_artifact(m))
            .ok_or_else(|| {
                Error::artifact_not_found(markers.artifact.as_str())
                    .with_operation("engine::extract_artifact")
            })?;

        message.last_line().map(str::to_string).ok_or_else(|| {
            Error::new(ErrorKind::ArtifactNotFound, "artifact message has a blank last line")
                .with_operation("engine::extract_artifact")
                .with_context("sender", message.sender())
        })
    }

    fn observe(&self, round: usize, message: &Message) {
        if let Some(observer) = &self.observer {
            observer(round, message);
        }
    }
}

impl Default for ConversationEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            preprocess: None,
            observer: None,
        }
    }
}

/// Normalize whatever a participant returned into a `ParticipantFailed`
/// error, keeping its message and retry status and wrapping it as source.
fn participant_failure(err: Error, participant: &str, round: usize) -> Error {
    if err.kind() == ErrorKind::ParticipantFailed {
        return err
            .with_operation("engine::run")
            .with_context("round", round.to_string());
    }
    Error::participant_failed(participant, err.message().to_string())
        .with_status(err.status())
        .with_operation("engine::run")
        .with_context("round", round.to_string())
        .with_context("cause", err.kind().as_str())
        .set_source(err)
}
