use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which part of the view has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    /// The editor is open on a cell
    Editing,
    /// Typing goes into the search row
    Searching,
    /// A replay is running; only stop and quit are accepted
    Replaying,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    Move { rows: i32, cols: i32 },
    Sort,
    StartEdit,
    EditInput(char),
    EditBackspace,
    CommitEdit,
    CancelEdit,
    ToggleSearch,
    FocusSearch,
    FocusTable,
    SearchInput(char),
    SearchBackspace,
    ExportJson,
    ExportCsv,
    Replay,
    StopReplay,
}

/// Alt+Shift+R. Terminals differ on whether SHIFT is reported with an
/// uppercase char, so either form counts.
fn is_replay_chord(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::ALT)
        && match key.code {
            KeyCode::Char('R') => true,
            KeyCode::Char('r') => key.modifiers.contains(KeyModifiers::SHIFT),
            _ => false,
        }
}

fn movement(code: KeyCode) -> Option<Command> {
    let (rows, cols) = match code {
        KeyCode::Up => (-1, 0),
        KeyCode::Down => (1, 0),
        KeyCode::Left => (0, -1),
        KeyCode::Right => (0, 1),
        KeyCode::PageUp => (-20, 0),
        KeyCode::PageDown => (20, 0),
        _ => return None,
    };
    Some(Command::Move { rows, cols })
}

pub fn map_key(mode: Mode, key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }
    // Recognized in every mode; the widget decides whether it may start
    if is_replay_chord(&key) {
        return Some(Command::Replay);
    }

    match mode {
        Mode::Replaying => match key.code {
            KeyCode::Char('q') => Some(Command::Quit),
            KeyCode::Esc => Some(Command::StopReplay),
            _ => None,
        },
        Mode::Editing => match key.code {
            KeyCode::Enter => Some(Command::CommitEdit),
            KeyCode::Esc => Some(Command::CancelEdit),
            KeyCode::Backspace => Some(Command::EditBackspace),
            KeyCode::Char(c) => Some(Command::EditInput(c)),
            _ => None,
        },
        Mode::Searching => match key.code {
            KeyCode::Esc => Some(Command::ToggleSearch),
            KeyCode::Tab | KeyCode::Enter => Some(Command::FocusTable),
            KeyCode::Backspace => Some(Command::SearchBackspace),
            KeyCode::Char(c) => Some(Command::SearchInput(c)),
            code => movement(code),
        },
        Mode::Browse => match key.code {
            KeyCode::Char('q') => Some(Command::Quit),
            KeyCode::Char('?') => Some(Command::Help),
            KeyCode::Char('k') => Some(Command::Move { rows: -1, cols: 0 }),
            KeyCode::Char('j') => Some(Command::Move { rows: 1, cols: 0 }),
            KeyCode::Char('h') => Some(Command::Move { rows: 0, cols: -1 }),
            KeyCode::Char('l') => Some(Command::Move { rows: 0, cols: 1 }),
            KeyCode::Char('s') => Some(Command::Sort),
            KeyCode::Char('e') | KeyCode::Enter => Some(Command::StartEdit),
            KeyCode::Char('/') => Some(Command::ToggleSearch),
            KeyCode::Tab => Some(Command::FocusSearch),
            KeyCode::Char('J') => Some(Command::ExportJson),
            KeyCode::Char('C') => Some(Command::ExportCsv),
            KeyCode::Esc => Some(Command::StopReplay),
            code => movement(code),
        },
    }
}
