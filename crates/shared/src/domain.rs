use std::fmt;

use serde::{Deserialize, Serialize};

/// Text of the system entry appended after an escalated reply.
pub const ESCALATION_NOTICE: &str = "Your case has been escalated to a human agent";
/// Text of the system entry appended when an exchange fails.
pub const CONNECTION_ERROR_NOTICE: &str = "Connection error. Please try again.";

macro_rules! string_id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id_newtype!(SessionId);

impl SessionId {
    pub fn new_v4() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Leading characters shown in headers; the full id goes on the wire.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoticeKind {
    EscalationNotice,
    ErrorNotice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub escalated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NoticeKind>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            escalated: false,
            kind: None,
        }
    }

    pub fn assistant(content: impl Into<String>, escalated: bool) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            escalated,
            kind: None,
        }
    }

    pub fn escalation_notice() -> Self {
        Self::notice(NoticeKind::EscalationNotice, ESCALATION_NOTICE)
    }

    pub fn error_notice() -> Self {
        Self::notice(NoticeKind::ErrorNotice, CONNECTION_ERROR_NOTICE)
    }

    fn notice(kind: NoticeKind, content: &str) -> Self {
        Self {
            role: Role::System,
            content: content.to_string(),
            escalated: false,
            kind: Some(kind),
        }
    }

    pub fn is_error_notice(&self) -> bool {
        self.kind == Some(NoticeKind::ErrorNotice)
    }

    pub fn is_escalation_notice(&self) -> bool {
        self.kind == Some(NoticeKind::EscalationNotice)
    }
}
