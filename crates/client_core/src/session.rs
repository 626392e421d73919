//! Conversation session controller: owns the message log and drives exchanges
//! with the chat service one at a time.

use std::{sync::Arc, time::Duration};

use futures::{Stream, StreamExt};
use shared::{
    domain::{Message, SessionId},
    error::TransportError,
    protocol::ChatReply,
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

use crate::transport::RemoteChatClient;

pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);
const EVENT_CHANNEL_CAPACITY: usize = 256;

pub trait IdGenerator: Send + Sync {
    fn next_session_id(&self) -> SessionId;
}

pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_session_id(&self) -> SessionId {
        SessionId::new_v4()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Upper bound on a single exchange. `None` waits for the service indefinitely.
    pub exchange_timeout: Option<Duration>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            exchange_timeout: Some(DEFAULT_EXCHANGE_TIMEOUT),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    AwaitingReply,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    MessageAppended { index: usize, message: Message },
    BusyChanged(bool),
    SessionEnded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub messages: Vec<Message>,
    pub busy: bool,
    pub ended: bool,
}

impl SessionSnapshot {
    pub fn phase(&self) -> SessionPhase {
        phase_of(self.busy, self.ended)
    }
}

fn phase_of(busy: bool, ended: bool) -> SessionPhase {
    if ended {
        SessionPhase::Ended
    } else if busy {
        SessionPhase::AwaitingReply
    } else {
        SessionPhase::Idle
    }
}

#[derive(Default)]
struct SessionState {
    log: Vec<Message>,
    busy: bool,
    ended: bool,
}

pub struct SessionController {
    session_id: SessionId,
    chat: Arc<dyn RemoteChatClient>,
    config: ControllerConfig,
    inner: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    pub fn new_with_dependencies(
        chat: Arc<dyn RemoteChatClient>,
        ids: &dyn IdGenerator,
        config: ControllerConfig,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let session_id = ids.next_session_id();
        info!(session_id = %session_id, "chat session created");
        Arc::new(Self {
            session_id,
            chat,
            config,
            inner: Mutex::new(SessionState::default()),
            events,
        })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Event stream for observers that prefer `Stream` combinators. Lagged
    /// receivers skip ahead; they can resync from [`Self::snapshot`].
    pub fn event_stream(&self) -> impl Stream<Item = SessionEvent> + Send + 'static {
        BroadcastStream::new(self.events.subscribe()).filter_map(|event| async move {
            match event {
                Ok(event) => Some(event),
                Err(lagged) => {
                    warn!(%lagged, "session observer fell behind");
                    None
                }
            }
        })
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let guard = self.inner.lock().await;
        SessionSnapshot {
            session_id: self.session_id.clone(),
            messages: guard.log.clone(),
            busy: guard.busy,
            ended: guard.ended,
        }
    }

    pub async fn phase(&self) -> SessionPhase {
        let guard = self.inner.lock().await;
        phase_of(guard.busy, guard.ended)
    }

    pub async fn is_busy(&self) -> bool {
        self.inner.lock().await.busy
    }

    pub async fn is_ended(&self) -> bool {
        self.inner.lock().await.ended
    }

    /// Runs one exchange for `text`. Blank text, an ended session, or an
    /// exchange already in flight make this a silent no-op. Failures are folded
    /// into the log as an error notice and never returned.
    ///
    /// The exchange settles on its own task, so dropping this future does not
    /// cancel it; the session still leaves `AwaitingReply` when the reply or
    /// failure arrives.
    pub async fn submit(self: &Arc<Self>, text: &str) {
        if !self.begin_exchange(text).await {
            return;
        }

        let controller = Arc::clone(self);
        let text = text.to_string();
        let settle = tokio::spawn(async move {
            let outcome = controller.run_exchange(&text).await;
            controller.settle(outcome).await;
        });
        if let Err(error) = settle.await {
            warn!(session_id = %self.session_id, %error, "exchange task did not complete");
        }
    }

    /// Fire-and-forget variant of [`Self::submit`].
    pub fn spawn_submit(self: &Arc<Self>, text: impl Into<String>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        let text = text.into();
        tokio::spawn(async move {
            controller.submit(&text).await;
        })
    }

    /// Appends the user entry and marks the session busy. Returns `false` when
    /// the submit is ignored.
    async fn begin_exchange(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            debug!(session_id = %self.session_id, "ignoring blank submit");
            return false;
        }

        let mut state = self.inner.lock().await;
        if state.ended {
            debug!(session_id = %self.session_id, "ignoring submit after session end");
            return false;
        }
        if state.busy {
            debug!(session_id = %self.session_id, "ignoring submit while awaiting reply");
            return false;
        }
        self.append(&mut state, Message::user(text));
        self.set_busy(&mut state, true);
        true
    }

    async fn settle(&self, outcome: Result<ChatReply, TransportError>) {
        let mut state = self.inner.lock().await;
        match outcome {
            Ok(reply) => {
                info!(
                    session_id = %self.session_id,
                    escalated = reply.escalated,
                    session_end = reply.session_end,
                    "exchange completed"
                );
                self.append(&mut state, Message::assistant(reply.reply, reply.escalated));
                if reply.escalated {
                    self.append(&mut state, Message::escalation_notice());
                }
                if reply.session_end && !state.ended {
                    state.ended = true;
                    let _ = self.events.send(SessionEvent::SessionEnded);
                }
            }
            Err(error) => {
                warn!(session_id = %self.session_id, %error, "exchange failed");
                self.append(&mut state, Message::error_notice());
            }
        }
        self.set_busy(&mut state, false);
    }

    async fn run_exchange(&self, text: &str) -> Result<ChatReply, TransportError> {
        let exchange = self.chat.exchange(&self.session_id, text);
        match self.config.exchange_timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| TransportError::Timeout(limit))?,
            None => exchange.await,
        }
    }

    fn append(&self, state: &mut SessionState, message: Message) {
        let index = state.log.len();
        state.log.push(message.clone());
        let _ = self
            .events
            .send(SessionEvent::MessageAppended { index, message });
    }

    fn set_busy(&self, state: &mut SessionState, busy: bool) {
        state.busy = busy;
        let _ = self.events.send(SessionEvent::BusyChanged(busy));
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
