use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::{Command, Direction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    GameCommand(Command),
    Quit,
    None,
}

/// Keys as seen by an open text prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKey {
    Char(char),
    Backspace,
    Submit,
    Cancel,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        let command = match key.code {
            // Movement - Arrow keys
            KeyCode::Up => Command::MoveIntent(Direction::North),
            KeyCode::Down => Command::MoveIntent(Direction::South),
            KeyCode::Left => Command::MoveIntent(Direction::West),
            KeyCode::Right => Command::MoveIntent(Direction::East),

            // Movement - WASD
            KeyCode::Char('w') | KeyCode::Char('W') => Command::MoveIntent(Direction::North),
            KeyCode::Char('s') | KeyCode::Char('S') => Command::MoveIntent(Direction::South),
            KeyCode::Char('a') | KeyCode::Char('A') => Command::MoveIntent(Direction::West),
            KeyCode::Char('d') | KeyCode::Char('D') => Command::MoveIntent(Direction::East),

            // Controls
            KeyCode::Char('p') | KeyCode::Char('P') => Command::TogglePause,
            KeyCode::Enter => Command::StartOrReset,
            KeyCode::Char('g') | KeyCode::Char('G') => Command::SaveRequest,
            KeyCode::Char('c') | KeyCode::Char('C') => Command::LoadRequest,

            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return KeyAction::Quit,
            _ => return KeyAction::None,
        };

        KeyAction::GameCommand(command)
    }

    /// Keys while a username or confirmation prompt is open
    pub fn handle_prompt_key(&self, key: KeyEvent) -> PromptKey {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return PromptKey::Cancel;
        }

        match key.code {
            KeyCode::Enter => PromptKey::Submit,
            KeyCode::Esc => PromptKey::Cancel,
            KeyCode::Backspace => PromptKey::Backspace,
            KeyCode::Char(c) if !c.is_control() => PromptKey::Char(c),
            _ => PromptKey::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
