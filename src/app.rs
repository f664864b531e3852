//! App: terminal init, main loop, tick and key handling.

use crate::GameConfig;
use crate::input::{Action, key_to_action};
use crate::level::Level;
use crate::simulation::Simulation;
use crate::theme::Theme;
use crate::tile::DrawCommand;
use anyhow::{Result, ensure};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use tracing::{debug, info};

pub struct App {
    config: GameConfig,
    theme: Theme,
    /// Kept so restart can rebuild the simulation from scratch.
    level: Level,
    sim: Simulation,
    paused: bool,
    last_tick: Instant,
    /// Lock cells opened on the last tick that had any, as they looked before opening.
    unlocking: Vec<DrawCommand>,
    /// TachyonFX fades for `unlocking` (created on the first frame that shows them).
    unlock_effects: Option<Vec<Effect>>,
    /// Last time we processed the unlock effects (for delta).
    unlock_effect_process_time: Option<Instant>,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme, level: Level) -> Result<Self> {
        ensure!(
            config.tick_rate.is_finite() && config.tick_rate > 0.0,
            "tick rate must be a positive number, got {}",
            config.tick_rate
        );
        ensure!(
            config.frame_rate.is_finite() && config.frame_rate > 0.0,
            "frame rate must be a positive number, got {}",
            config.frame_rate
        );
        let sim = Simulation::new(&level, config.input_order);
        Ok(Self {
            config,
            theme,
            level,
            sim,
            paused: false,
            last_tick: Instant::now(),
            unlocking: Vec::new(),
            unlock_effects: None,
            unlock_effect_process_time: None,
        })
    }

    fn reset_game(&mut self) {
        self.sim = Simulation::new(&self.level, self.config.input_order);
        self.paused = false;
        self.last_tick = Instant::now();
        self.clear_unlock_effect();
        info!(level = self.level.name(), "level restarted");
    }

    fn clear_unlock_effect(&mut self) {
        self.unlocking.clear();
        self.unlock_effects = None;
        self.unlock_effect_process_time = None;
    }

    /// Returns `false` when the app should exit.
    fn apply_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::Pause => {
                self.paused = !self.paused;
                debug!(paused = self.paused, "pause toggled");
            }
            Action::Restart => self.reset_game(),
            Action::Move(input) if !self.paused => self.sim.push_input(input),
            Action::Move(_) | Action::None => {}
        }
        true
    }

    /// Advance one simulation tick and start a fade for any locks it opened.
    fn tick(&mut self) {
        self.sim.update();
        let cleared = self.sim.last_cleared();
        if cleared.is_empty() || self.config.no_animation {
            return;
        }
        self.unlocking = cleared
            .iter()
            .filter_map(|&(x, y, tile)| tile.draw(&self.theme, x, y))
            .collect();
        self.unlock_effects = None;
        self.unlock_effect_process_time = None;
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let tick_interval = Duration::from_secs_f64(1.0 / self.config.tick_rate);
        let frame_duration = Duration::from_secs_f64(1.0 / self.config.frame_rate);
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    &self.sim,
                    &self.theme,
                    self.level.name(),
                    self.paused,
                    f.area(),
                    &self.unlocking,
                    &mut self.unlock_effects,
                    &mut self.unlock_effect_process_time,
                    now,
                );
            })?;

            if crate::ui::unlock_done(&self.unlock_effects) {
                self.clear_unlock_effect();
            }

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if !self.apply_action(key_to_action(key)) {
                            return Ok(());
                        }
                    }
                }
            }

            if !self.paused && self.last_tick.elapsed() >= tick_interval {
                self.last_tick = Instant::now();
                self.tick();
            }
        }
    }
}
