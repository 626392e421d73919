//! Client side of the support chat: the session controller that owns the
//! conversation and the transport it uses to reach the chat service.

pub mod session;
pub mod transport;

pub use session::{
    ControllerConfig, IdGenerator, SessionController, SessionEvent, SessionPhase,
    SessionSnapshot, UuidIdGenerator, DEFAULT_EXCHANGE_TIMEOUT,
};
pub use transport::{chat_endpoint, HttpChatClient, RemoteChatClient};
