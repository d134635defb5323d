//! Explicit command dispatch: normal-mode keys map to typed user intents
//! instead of being handled inline, so tests can drive the controller by
//! dispatching commands directly without synthesizing terminal events.

use crossterm::event::KeyCode;

/// The sections of the console. Books is the landing section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Books,
    Members,
    Loans,
    Config,
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Section::Books => "Books",
            Section::Members => "Members",
            Section::Loans => "Loans",
            Section::Config => "Configuration",
        }
    }
}

/// User intents available from normal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Switch(Section),
    Refresh,
    MoveSelection(isize),
    SelectFirst,
    SelectLast,
    NextPage,
    PrevPage,
    OpenCreate,
    OpenEdit,
    RequestDelete,
    ReturnLoan,
    StartSearch,
    EditEndpoint,
}

/// Map a normal-mode key press onto a command for the active section.
/// Returns `None` for keys with no meaning there.
pub fn command_for(section: Section, code: KeyCode) -> Option<Command> {
    let common = match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char('1') => Some(Command::Switch(Section::Books)),
        KeyCode::Char('2') => Some(Command::Switch(Section::Members)),
        KeyCode::Char('3') => Some(Command::Switch(Section::Loans)),
        KeyCode::Char('c') | KeyCode::Char('C') => Some(Command::Switch(Section::Config)),
        KeyCode::Up => Some(Command::MoveSelection(-1)),
        KeyCode::Down => Some(Command::MoveSelection(1)),
        KeyCode::PageUp => Some(Command::MoveSelection(-5)),
        KeyCode::PageDown => Some(Command::MoveSelection(5)),
        KeyCode::Home => Some(Command::SelectFirst),
        KeyCode::End => Some(Command::SelectLast),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Refresh),
        _ => None,
    };
    if let Some(command) = common {
        return Some(command);
    }

    match section {
        Section::Books => match code {
            KeyCode::Char('+') => Some(Command::OpenCreate),
            KeyCode::Char('-') => Some(Command::RequestDelete),
            KeyCode::Char('e') | KeyCode::Char('E') => Some(Command::OpenEdit),
            KeyCode::Char('f') => Some(Command::StartSearch),
            KeyCode::Left => Some(Command::PrevPage),
            KeyCode::Right => Some(Command::NextPage),
            _ => None,
        },
        Section::Members => match code {
            KeyCode::Char('+') => Some(Command::OpenCreate),
            KeyCode::Char('-') => Some(Command::RequestDelete),
            KeyCode::Char('e') | KeyCode::Char('E') => Some(Command::OpenEdit),
            _ => None,
        },
        Section::Loans => match code {
            KeyCode::Char('+') => Some(Command::OpenCreate),
            KeyCode::Char('-') => Some(Command::RequestDelete),
            KeyCode::Enter => Some(Command::ReturnLoan),
            _ => None,
        },
        Section::Config => match code {
            KeyCode::Enter | KeyCode::Char('e') | KeyCode::Char('E') => {
                Some(Command::EditEndpoint)
            }
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_keys_work_everywhere() {
        for section in [Section::Books, Section::Members, Section::Loans, Section::Config] {
            assert_eq!(
                command_for(section, KeyCode::Char('2')),
                Some(Command::Switch(Section::Members))
            );
            assert_eq!(command_for(section, KeyCode::Char('q')), Some(Command::Quit));
        }
    }

    #[test]
    fn pagination_keys_are_books_only() {
        assert_eq!(
            command_for(Section::Books, KeyCode::Right),
            Some(Command::NextPage)
        );
        assert_eq!(command_for(Section::Members, KeyCode::Right), None);
        assert_eq!(command_for(Section::Loans, KeyCode::Left), None);
    }

    #[test]
    fn return_is_the_loan_primary_action() {
        assert_eq!(
            command_for(Section::Loans, KeyCode::Enter),
            Some(Command::ReturnLoan)
        );
        assert_eq!(command_for(Section::Books, KeyCode::Enter), None);
    }

    #[test]
    fn unmapped_keys_produce_no_command() {
        assert_eq!(command_for(Section::Books, KeyCode::Char('z')), None);
        assert_eq!(command_for(Section::Config, KeyCode::Char('+')), None);
    }
}
