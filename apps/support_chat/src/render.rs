//! Plain-text rendering of the conversation for the terminal.

use shared::domain::{Message, NoticeKind, Role, SessionId};

pub const TITLE: &str = "Agentic Support";
pub const TYPING_INDICATOR: &str = "Agent is typing...";
pub const INPUT_PROMPT: &str = "Type your message...";
pub const ENDED_PROMPT: &str = "This session has ended. Refresh to start a new chat.";
pub const ESCALATED_NOTE: &str = "Note: Your case has been escalated";

/// Canned openers offered on the welcome screen, selected with `/1`..`/4`.
pub const QUICK_STARTS: [(&str, &str); 4] = [
    ("Technical Help", "I need technical help"),
    ("Feature Request", "I have a feature request"),
    ("Sales Inquiry", "I'm interested in your product"),
    ("Other Question", "Other question"),
];

const USER_LABEL: &str = "[you]";
const LABEL_WIDTH: usize = 9;
/// Column user text is right-aligned against, mirroring the agent side.
const USER_COLUMN: usize = 64;

pub fn header(session_id: &SessionId) -> String {
    format!("== {TITLE} ==  Session: {}", session_id.short())
}

pub fn welcome() -> String {
    let mut out = format!("Welcome to {TITLE}\nHow can I help you today?\n");
    for (idx, (label, _)) in QUICK_STARTS.iter().enumerate() {
        out.push_str(&format!("  /{} {label}\n", idx + 1));
    }
    out.push_str("Type a message, pick a quick start, or /quit to leave.");
    out
}

pub fn prompt(ended: bool) -> &'static str {
    if ended {
        ENDED_PROMPT
    } else {
        INPUT_PROMPT
    }
}

fn label(message: &Message) -> &'static str {
    match (message.role, message.kind) {
        (Role::User, _) => USER_LABEL,
        (Role::Assistant, _) => "[agent]",
        (Role::System, Some(NoticeKind::ErrorNotice)) => "[error]",
        (Role::System, _) => "[notice]",
    }
}

/// One bubble per message. User text is right-aligned with the label trailing;
/// everything else is left-aligned with continuation lines indented under the
/// first.
pub fn render_message(message: &Message) -> String {
    if message.role == Role::User {
        return render_user(&message.content);
    }

    let label = label(message);
    let indent = " ".repeat(LABEL_WIDTH);
    let mut out = String::new();

    let mut lines = message.content.split('\n');
    let first = lines.next().unwrap_or_default();
    out.push_str(&format!("{label:<LABEL_WIDTH$}{first}"));
    for line in lines {
        out.push('\n');
        out.push_str(&indent);
        out.push_str(line);
    }

    if message.role == Role::Assistant && message.escalated {
        out.push('\n');
        out.push_str(&indent);
        out.push_str(ESCALATED_NOTE);
    }
    out
}

fn render_user(content: &str) -> String {
    content
        .split('\n')
        .enumerate()
        .map(|(idx, line)| {
            if idx == 0 {
                format!("{line:>USER_COLUMN$} {USER_LABEL}")
            } else {
                format!("{line:>USER_COLUMN$}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
