use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::error::{GameError, StorageError};
use crate::game::{
    Command, CommandOutcome, GameConfig, GameEngine, GameState, Phase, RenderSnapshot,
    StorageRequest,
};
use crate::input::{InputHandler, KeyAction, PromptKey};
use crate::metrics::GameMetrics;
use crate::render::{Overlay, Renderer};
use crate::storage::{SaveOutcome, SaveStore};

/// An open dialog; the game stays held until it closes
#[derive(Debug, Clone, PartialEq, Eq)]
enum Modal {
    Username {
        request: StorageRequest,
        input: String,
        held: Phase,
    },
    ConfirmOverwrite {
        username: String,
        held: Phase,
    },
}

pub struct HumanMode {
    engine: GameEngine,
    state: GameState,
    store: SaveStore,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    modal: Option<Modal>,
    status: Option<String>,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(config: GameConfig, save_dir: PathBuf) -> Self {
        let store = SaveStore::new(save_dir, config.capacity());
        let engine = GameEngine::new(config);
        let state = engine.new_game();

        Self {
            engine,
            state,
            store,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            modal: None,
            status: None,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let config = self.engine.config();
        let tick_interval = Duration::from_secs_f32(1.0 / config.ticks_per_second);
        let mut tick_timer = interval(tick_interval);

        let render_interval = Duration::from_millis(1000 / u64::from(config.frames_per_second));
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event)?;
                    }
                }

                // Game logic tick
                _ = tick_timer.tick() => {
                    self.update_game()?;
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update(self.state.phase);
                    let snapshot = RenderSnapshot::capture(&self.state);
                    let overlay = self.overlay();
                    terminal.draw(|frame| {
                        self.renderer.render(
                            frame,
                            &snapshot,
                            &self.metrics,
                            overlay.as_ref(),
                            self.status.as_deref(),
                        );
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            if self.modal.is_some() {
                let key = self.input_handler.handle_prompt_key(key);
                self.handle_prompt(key);
                return Ok(());
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::GameCommand(command) => self.handle_command(command)?,
                KeyAction::Quit => self.should_quit = true,
                KeyAction::None => {}
            }
        }

        Ok(())
    }

    fn handle_command(&mut self, command: Command) -> Result<()> {
        let was_started = matches!(self.state.phase, Phase::NotStarted | Phase::Over);
        let outcome = self
            .engine
            .apply(&mut self.state, command)
            .context("Failed to apply command")?;

        match outcome {
            CommandOutcome::Applied => {
                if command == Command::StartOrReset && was_started {
                    self.metrics.on_game_start();
                    self.status = None;
                }
            }
            CommandOutcome::Ignored => {}
            CommandOutcome::StorageRequested(request) => {
                let held = self.engine.hold(&mut self.state);
                self.status = None;
                self.modal = Some(Modal::Username {
                    request,
                    input: String::new(),
                    held,
                });
            }
        }

        Ok(())
    }

    fn handle_prompt(&mut self, key: PromptKey) {
        let Some(modal) = self.modal.take() else {
            return;
        };

        match modal {
            Modal::Username {
                request,
                mut input,
                held,
            } => match key {
                PromptKey::Char(c) => {
                    input.push(c);
                    self.modal = Some(Modal::Username {
                        request,
                        input,
                        held,
                    });
                }
                PromptKey::Backspace => {
                    input.pop();
                    self.modal = Some(Modal::Username {
                        request,
                        input,
                        held,
                    });
                }
                PromptKey::Submit if input.trim().is_empty() => self.cancel(held),
                PromptKey::Submit => match request {
                    StorageRequest::Save => self.begin_save(input, held),
                    StorageRequest::Load => self.load(&input, held),
                },
                PromptKey::Cancel => self.cancel(held),
                PromptKey::None => {
                    self.modal = Some(Modal::Username {
                        request,
                        input,
                        held,
                    });
                }
            },
            Modal::ConfirmOverwrite { username, held } => match key {
                PromptKey::Char('y') | PromptKey::Char('Y') => self.save(&username, held),
                PromptKey::Char('n') | PromptKey::Char('N') | PromptKey::Cancel => {
                    self.cancel(held)
                }
                _ => self.modal = Some(Modal::ConfirmOverwrite { username, held }),
            },
        }
    }

    fn cancel(&mut self, held: Phase) {
        self.engine.release(&mut self.state, held);
    }

    fn begin_save(&mut self, username: String, held: Phase) {
        match self.store.exists(&username) {
            Ok(true) => self.modal = Some(Modal::ConfirmOverwrite { username, held }),
            Ok(false) => self.save(&username, held),
            Err(err) => self.storage_failed("Save", err, held),
        }
    }

    fn save(&mut self, username: &str, held: Phase) {
        let record = self.engine.capture(&self.state, held);
        match self.store.save(username, &record) {
            Ok(outcome) => {
                let verb = match outcome {
                    SaveOutcome::Created { .. } => "Saved",
                    SaveOutcome::Overwritten { .. } => "Overwrote",
                };
                self.status = Some(format!("{} game for {}", verb, username.trim()));
                self.engine.release(&mut self.state, held);
            }
            Err(err) => self.storage_failed("Save", err, held),
        }
    }

    fn load(&mut self, username: &str, held: Phase) {
        let record = match self.store.load(username) {
            Ok(record) => record,
            Err(StorageError::UserNotFound(_)) => {
                self.status = Some("User Not Found".to_string());
                self.engine.release(&mut self.state, held);
                return;
            }
            Err(err) => return self.storage_failed("Load", err, held),
        };

        match self.engine.restore(&mut self.state, record) {
            Ok(()) => {
                self.metrics.on_game_start();
                self.status = Some(format!("Loaded game for {}", username.trim()));
            }
            Err(err) => {
                warn!(%err, "saved game rejected");
                self.status = Some(format!("Load failed: {}", err));
                self.engine.release(&mut self.state, held);
            }
        }
    }

    fn storage_failed(&mut self, action: &str, err: StorageError, held: Phase) {
        warn!(%err, action, "storage operation failed");
        self.status = Some(format!("{} failed: {}", action, err));
        self.engine.release(&mut self.state, held);
    }

    fn update_game(&mut self) -> Result<()> {
        match self.engine.step(&mut self.state) {
            Ok(result) => {
                // Track game over
                if result.info.collision_type.is_some() {
                    self.metrics.on_game_over(&self.state.score);
                }
                Ok(())
            }
            Err(GameError::BoardSaturated { .. }) => {
                info!(score = self.state.score.score, "board filled");
                self.metrics.on_game_over(&self.state.score);
                self.status = Some("The board is full!".to_string());
                Ok(())
            }
            Err(err) => Err(err).context("Game step failed"),
        }
    }

    fn overlay(&self) -> Option<Overlay> {
        match self.modal.as_ref()? {
            Modal::Username { request, input, .. } => {
                let title = match request {
                    StorageRequest::Save => "Save",
                    StorageRequest::Load => "Load",
                };
                Some(Overlay {
                    title: title.to_string(),
                    lines: vec![format!("Enter your username to {}", title.to_lowercase())],
                    input: Some(input.clone()),
                })
            }
            Modal::ConfirmOverwrite { username, .. } => Some(Overlay {
                title: "Overwrite?".to_string(),
                lines: vec![
                    format!("{} already has a save.", username.trim()),
                    "Overwrite it? (y/n)".to_string(),
                ],
                input: None,
            }),
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mode(dir: &TempDir) -> HumanMode {
        HumanMode::new(
            GameConfig::small().with_seed(21),
            dir.path().to_path_buf(),
        )
    }

    fn type_name(mode: &mut HumanMode, name: &str) {
        for c in name.chars() {
            mode.handle_prompt(PromptKey::Char(c));
        }
        mode.handle_prompt(PromptKey::Submit);
    }

    #[test]
    fn test_game_initialization() {
        let dir = TempDir::new().unwrap();
        let mode = mode(&dir);
        assert_eq!(mode.state.phase, Phase::NotStarted);
        assert_eq!(mode.state.score.score, 0);
    }

    #[test]
    fn test_start_and_restart() {
        let dir = TempDir::new().unwrap();
        let mut mode = mode(&dir);
        mode.handle_command(Command::StartOrReset).unwrap();
        assert_eq!(mode.state.phase, Phase::Running);

        mode.state.score.score = 10;
        mode.state.phase = Phase::Over;
        mode.handle_command(Command::StartOrReset).unwrap();
        assert_eq!(mode.state.score.score, 0);
        assert_eq!(mode.state.phase, Phase::Running);
    }

    #[test]
    fn test_prompt_holds_the_game() {
        let dir = TempDir::new().unwrap();
        let mut mode = mode(&dir);
        mode.handle_command(Command::StartOrReset).unwrap();

        mode.handle_command(Command::SaveRequest).unwrap();
        assert_eq!(mode.state.phase, Phase::Paused);
        assert!(mode.overlay().is_some());

        // nothing moves while the prompt is open
        let before = mode.state.clone();
        mode.update_game().unwrap();
        assert_eq!(mode.state, before);

        mode.handle_prompt(PromptKey::Cancel);
        assert!(mode.modal.is_none());
        assert_eq!(mode.state.phase, Phase::Running);
        assert!(!mode.store.index_path().exists());
    }

    #[test]
    fn test_empty_name_cancels() {
        let dir = TempDir::new().unwrap();
        let mut mode = mode(&dir);
        mode.handle_command(Command::StartOrReset).unwrap();
        mode.handle_command(Command::LoadRequest).unwrap();
        mode.handle_prompt(PromptKey::Submit);
        assert!(mode.modal.is_none());
        assert_eq!(mode.state.phase, Phase::Running);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut mode = mode(&dir);
        mode.handle_command(Command::StartOrReset).unwrap();
        mode.state.score.score = 42;
        mode.state.score.fruits_eaten = 3;
        let saved = mode.state.clone();

        mode.handle_command(Command::SaveRequest).unwrap();
        type_name(&mut mode, "alice");
        assert_eq!(mode.status.as_deref(), Some("Saved game for alice"));
        assert_eq!(mode.state.phase, Phase::Running);

        // start over, then come back
        mode.state.phase = Phase::Over;
        mode.handle_command(Command::StartOrReset).unwrap();
        assert_eq!(mode.state.score.score, 0);

        mode.handle_command(Command::LoadRequest).unwrap();
        type_name(&mut mode, "alice");

        assert_eq!(mode.status.as_deref(), Some("Loaded game for alice"));
        assert_eq!(mode.state.phase, Phase::Running);
        assert_eq!(mode.state.snake, saved.snake);
        assert_eq!(mode.state.score, saved.score);
        assert_eq!(mode.state.board.cells(), saved.board.cells());
    }

    #[test]
    fn test_overwrite_needs_confirmation() {
        let dir = TempDir::new().unwrap();
        let mut mode = mode(&dir);
        mode.handle_command(Command::StartOrReset).unwrap();
        mode.handle_command(Command::SaveRequest).unwrap();
        type_name(&mut mode, "bob");

        mode.state.score.score = 77;
        mode.handle_command(Command::SaveRequest).unwrap();
        type_name(&mut mode, "bob");
        assert!(matches!(mode.modal, Some(Modal::ConfirmOverwrite { .. })));

        // declining leaves the slot alone
        mode.handle_prompt(PromptKey::Char('n'));
        assert!(mode.modal.is_none());
        assert_eq!(mode.store.load("bob").unwrap().score, 0);

        mode.handle_command(Command::SaveRequest).unwrap();
        type_name(&mut mode, "bob");
        mode.handle_prompt(PromptKey::Char('y'));
        assert_eq!(mode.store.load("bob").unwrap().score, 77);
        assert_eq!(mode.status.as_deref(), Some("Overwrote game for bob"));
    }

    #[test]
    fn test_load_unknown_user() {
        let dir = TempDir::new().unwrap();
        let mut mode = mode(&dir);
        mode.handle_command(Command::StartOrReset).unwrap();
        let before = mode.state.clone();

        mode.handle_command(Command::LoadRequest).unwrap();
        type_name(&mut mode, "nobody");

        assert_eq!(mode.status.as_deref(), Some("User Not Found"));
        assert_eq!(mode.state, before);
    }
}
