//! Layout and drawing: board, sidebar, pause overlay, lock-opening fade.

use crate::simulation::Simulation;
use crate::theme::Theme;
use crate::tile::{DrawCommand, Glyph};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Terminal columns per tile, so cells come out roughly square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 26;
const SIDEBAR_HEIGHT: u16 = 18;

/// Duration of the lock-opening fade (TachyonFX) in ms.
const UNLOCK_FADE_MS: u32 = 400;

/// Board size in terminal cells (border + grid).
fn board_outer_size(sim: &Simulation) -> (u16, u16) {
    let grid = sim.grid();
    (
        grid.width() as u16 * CELL_WIDTH + 2,
        grid.height() as u16 + 2,
    )
}

/// Board and sidebar rects, centred in `area`.
fn game_layout(area: Rect, sim: &Simulation) -> (Rect, Rect) {
    let (bw, bh) = board_outer_size(sim);
    let total_w = bw + SIDEBAR_WIDTH;

    let horiz_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);

    let vert_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(bh.max(SIDEBAR_HEIGHT)),
            Constraint::Fill(1),
        ])
        .split(horiz_chunks[1]);

    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert_chunks[1]);
    let board = Rect {
        height: bh.min(inner[0].height),
        ..inner[0]
    };
    (board, inner[1])
}

/// Screen rect of grid cell `(x, y)` inside the board's inner rect, if visible.
fn cell_rect(board_inner: Rect, x: usize, y: usize) -> Option<Rect> {
    let rx = board_inner.x.checked_add((x as u16).checked_mul(CELL_WIDTH)?)?;
    let ry = board_inner.y.checked_add(y as u16)?;
    let visible = rx + CELL_WIDTH <= board_inner.x + board_inner.width
        && ry < board_inner.y + board_inner.height;
    visible.then_some(Rect {
        x: rx,
        y: ry,
        width: CELL_WIDTH,
        height: 1,
    })
}

/// Draw one frame. When `unlocking` is non-empty and `unlock_effects` is
/// `None`, starts a fade per cleared lock; `unlock_process_time` tracks the
/// delta between frames.
pub fn draw(
    frame: &mut Frame,
    sim: &Simulation,
    theme: &Theme,
    title: &str,
    paused: bool,
    area: Rect,
    unlocking: &[DrawCommand],
    unlock_effects: &mut Option<Vec<Effect>>,
    unlock_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let (board_area, sidebar_area) = game_layout(area, sim);
    let board_inner = draw_board(frame, sim, theme, title, board_area);
    draw_sidebar(frame, sim, theme, sidebar_area);
    if !unlocking.is_empty() {
        apply_unlock_effect(
            frame,
            board_inner,
            unlocking,
            unlock_effects,
            unlock_process_time,
            now,
        );
    }
    if paused {
        draw_pause_overlay(frame, theme, area);
    }
}

/// Draws border, background and every draw command. Returns the inner rect.
fn draw_board(frame: &mut Frame, sim: &Simulation, theme: &Theme, title: &str, area: Rect) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(format!(" {title} "), theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    for y in inner.y..inner.y + inner.height {
        for x in inner.x..inner.x + inner.width {
            buf[(x, y)].set_symbol(" ").set_style(Style::default().bg(theme.bg));
        }
    }
    for cmd in sim.draw(theme) {
        if let Some(rect) = cell_rect(inner, cmd.x, cmd.y) {
            draw_cell(buf, rect, &cmd, theme);
        }
    }
    inner
}

fn glyph_symbols(glyph: Glyph) -> [&'static str; 2] {
    match glyph {
        Glyph::Solid => ["█", "█"],
        Glyph::Key => ["o", "╼"],
        Glyph::Lock => ["▓", "▓"],
    }
}

fn draw_cell(buf: &mut Buffer, rect: Rect, cmd: &DrawCommand, theme: &Theme) {
    let style = Style::default().fg(cmd.color).bg(theme.bg);
    for (i, symbol) in glyph_symbols(cmd.glyph).into_iter().enumerate() {
        buf[(rect.x + i as u16, rect.y)]
            .set_symbol(symbol)
            .set_style(style);
    }
}

/// Fade each cleared lock cell from its lock colour to whatever now fills it.
fn apply_unlock_effect(
    frame: &mut Frame,
    board_inner: Rect,
    unlocking: &[DrawCommand],
    unlock_effects: &mut Option<Vec<Effect>>,
    unlock_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = unlock_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    let tfx_delta = TfxDuration::from_millis(delta_ms);
    *unlock_process_time = Some(now);

    let effects = unlock_effects.get_or_insert_with(|| {
        unlocking
            .iter()
            .map(|cmd| {
                let area = cell_rect(board_inner, cmd.x, cmd.y).unwrap_or_default();
                fx::fade_from(cmd.color, cmd.color, (UNLOCK_FADE_MS, Interpolation::Linear))
                    .with_area(area)
            })
            .collect()
    });

    for (effect, cmd) in effects.iter_mut().zip(unlocking) {
        if let Some(area) = cell_rect(board_inner, cmd.x, cmd.y) {
            frame.render_effect(effect, area, tfx_delta);
        }
    }
}

/// True once every fade has finished.
pub fn unlock_done(unlock_effects: &Option<Vec<Effect>>) -> bool {
    unlock_effects
        .as_ref()
        .is_some_and(|effects| effects.iter().all(Effect::done))
}

fn draw_sidebar(frame: &mut Frame, sim: &Simulation, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Stats
            Constraint::Length(1), // gap
            Constraint::Length(11), // Legend + controls
        ])
        .split(area);

    let stat = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value, fg_style),
        ])
    };
    let grid = sim.grid();
    let (px, py) = sim.player().position();
    let stats_lines = vec![
        stat("Tick: ", sim.tick().to_string()),
        stat("Locks: ", grid.locks_remaining().to_string()),
        stat("Falling: ", grid.falling_blocks().to_string()),
        stat("Player: ", format!("{px},{py}")),
    ];
    Paragraph::new(Text::from(stats_lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .render(chunks[0], frame.buffer_mut());

    let swatch = |color: Color, glyph: Glyph, label: &'static str| {
        let [a, b] = glyph_symbols(glyph);
        Line::from(vec![
            Span::styled(format!("{a}{b}"), Style::default().fg(color)),
            Span::styled(format!(" {label}"), fg_style),
        ])
    };
    let legend_lines = vec![
        swatch(theme.player, Glyph::Solid, "you"),
        swatch(theme.stone, Glyph::Solid, "stone"),
        swatch(theme.box_fill, Glyph::Solid, "box"),
        swatch(theme.flux, Glyph::Solid, "flux"),
        swatch(theme.key1, Glyph::Key, "key"),
        swatch(theme.key1, Glyph::Lock, "lock"),
        Line::from(""),
        Line::from(Span::styled("←↑→↓ move  r restart", title_style)),
        Line::from(Span::styled("p pause    q quit", title_style)),
    ];
    Paragraph::new(Text::from(legend_lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .render(chunks[2], frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup_w = 28u16;
    let popup_h = 5u16;
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w.min(area.width),
        height: popup_h.min(area.height),
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P: resume    Q: quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}
