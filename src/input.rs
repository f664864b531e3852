//! Key bindings: arrows, WASD and vim-style hjkl.

use crate::simulation::Input;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Input),
    Restart,
    Pause,
    Quit,
    None,
}

/// Map key event to game action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Char('r') => Action::Restart,
        KeyCode::Left | KeyCode::Char('a' | 'h') => Action::Move(Input::Left),
        KeyCode::Right | KeyCode::Char('d' | 'l') => Action::Move(Input::Right),
        KeyCode::Up | KeyCode::Char('w' | 'k') => Action::Move(Input::Up),
        KeyCode::Down | KeyCode::Char('s' | 'j') => Action::Move(Input::Down),
        _ => Action::None,
    }
}
