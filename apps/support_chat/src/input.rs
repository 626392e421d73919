use crate::render::QUICK_STARTS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    Send(String),
    /// Quick starts are only offered on the welcome screen.
    QuickStartUnavailable,
    UnknownCommand(String),
    SessionEnded,
    Nothing,
}

pub fn parse_input(line: &str, log_is_empty: bool, ended: bool) -> InputAction {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return InputAction::Nothing;
    }

    if let Some(command) = trimmed.strip_prefix('/') {
        if command == "quit" || command == "exit" {
            return InputAction::Quit;
        }
        if let Some(opener) = quick_start(command) {
            if ended {
                return InputAction::SessionEnded;
            }
            if !log_is_empty {
                return InputAction::QuickStartUnavailable;
            }
            return InputAction::Send(opener.to_string());
        }
        return InputAction::UnknownCommand(trimmed.to_string());
    }

    if ended {
        return InputAction::SessionEnded;
    }
    InputAction::Send(line.trim_end_matches(['\r', '\n']).to_string())
}

fn quick_start(command: &str) -> Option<&'static str> {
    let choice = command.parse::<usize>().ok()?;
    QUICK_STARTS
        .get(choice.checked_sub(1)?)
        .map(|(_, opener)| *opener)
}
