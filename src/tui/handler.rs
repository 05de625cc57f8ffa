use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::Page;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    Summarize,
    SummarizeWithHuggingFace,
    CopySummary,
    OpenPreview,
    ToggleTheme,
    SwitchPage,
    ShowHelp,
    HideHelp,
    // URL input actions
    InputStart,
    InputStop,
    InputChar(char),
    InputBackspace,
    // About page link list
    MoveUp,
    MoveDown,
    OpenLink,
}

pub fn handle_key_event(
    key: KeyEvent,
    input_active: bool,
    show_help: bool,
    page: Page,
) -> Option<AppAction> {
    // If help is showing, any key closes it
    if show_help {
        return Some(AppAction::HideHelp);
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(AppAction::Quit);
    }

    // URL input mode
    if input_active {
        return match key.code {
            KeyCode::Enter => Some(AppAction::Summarize),
            KeyCode::Esc => Some(AppAction::InputStop),
            KeyCode::Tab => Some(AppAction::SwitchPage),
            KeyCode::Backspace => Some(AppAction::InputBackspace),
            KeyCode::Char(c) => Some(AppAction::InputChar(c)),
            _ => None,
        };
    }

    // Keys shared by both pages
    match key.code {
        KeyCode::Char('q') => return Some(AppAction::Quit),
        KeyCode::Tab => return Some(AppAction::SwitchPage),
        KeyCode::Char('t') => return Some(AppAction::ToggleTheme),
        KeyCode::Char('?') => return Some(AppAction::ShowHelp),
        _ => {}
    }

    match page {
        Page::Home => match key.code {
            KeyCode::Char('i') | KeyCode::Char('/') => Some(AppAction::InputStart),
            KeyCode::Enter => Some(AppAction::Summarize),
            KeyCode::Char('h') => Some(AppAction::SummarizeWithHuggingFace),
            KeyCode::Char('c') | KeyCode::Char('y') => Some(AppAction::CopySummary),
            KeyCode::Char('o') => Some(AppAction::OpenPreview),
            _ => None,
        },
        Page::About => match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(AppAction::MoveDown),
            KeyCode::Char('k') | KeyCode::Up => Some(AppAction::MoveUp),
            KeyCode::Enter | KeyCode::Char('o') => Some(AppAction::OpenLink),
            KeyCode::Char('i') => Some(AppAction::InputStart),
            _ => None,
        },
    }
}
