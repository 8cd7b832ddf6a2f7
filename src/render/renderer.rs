use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::game::{Direction, Phase, Position, RenderSnapshot, Rgb, TileKind};
use crate::metrics::GameMetrics;

/// A modal box drawn over the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub title: String,
    pub lines: Vec<String>,
    /// Text typed so far, for input prompts
    pub input: Option<String>,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        snapshot: &RenderSnapshot,
        metrics: &GameMetrics,
        overlay: Option<&Overlay>,
        status: Option<&str>,
    ) {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board and side panel
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(snapshot, metrics);
        frame.render_widget(stats, chunks[0]);

        let middle = Layout::default()
            .direction(LayoutDirection::Horizontal)
            .constraints([
                Constraint::Length(snapshot.cols as u16 * 2 + 2),
                Constraint::Min(30),
            ])
            .split(chunks[1]);

        let grid = self.render_grid(snapshot);
        frame.render_widget(grid, middle[0]);
        frame.render_widget(self.render_side_panel(snapshot, metrics), middle[1]);

        let phase_overlay = phase_message(snapshot.phase);
        if let Some(overlay) = overlay.or(phase_overlay.as_ref()) {
            let area = centered_rect(middle[0], 36, overlay.lines.len() as u16 + 4);
            frame.render_widget(Clear, area);
            frame.render_widget(self.render_overlay(overlay), area);
        }

        let footer = self.render_footer(status);
        frame.render_widget(footer, chunks[2]);
    }

    fn render_grid(&self, snapshot: &RenderSnapshot) -> Paragraph<'_> {
        let mut lines = Vec::with_capacity(snapshot.rows);

        for y in 0..snapshot.rows {
            let spans: Vec<Span> = (0..snapshot.cols)
                .map(|x| {
                    let pos = Position::new(x as i32, y as i32);
                    cell_span(snapshot.cell(pos), snapshot.decoration(pos), snapshot.head_direction)
                })
                .collect();
            lines.push(Line::from(spans));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Snake Remake "),
        )
    }

    fn render_stats(&self, snapshot: &RenderSnapshot, metrics: &GameMetrics) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                snapshot.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Length: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                snapshot.snake_length.to_string(),
                Style::default().fg(Color::White),
            ),
            Span::raw("    "),
            Span::styled("Time: ", Style::default().fg(Color::Yellow)),
            Span::styled(metrics.format_time(), Style::default().fg(Color::White)),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_side_panel(&self, snapshot: &RenderSnapshot, metrics: &GameMetrics) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Gray);
        let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

        let stat = |name: &'static str, v: String| {
            Line::from(vec![Span::styled(name, label), Span::styled(v, value)])
        };
        let control = |name: &'static str, keys: &'static str| {
            Line::from(vec![
                Span::styled(name, label),
                Span::styled(keys, Style::default().fg(Color::Cyan)),
            ])
        };

        let text = vec![
            Line::from(Span::styled("Statistics", heading)),
            stat("Total Score: ", snapshot.score.to_string()),
            stat("Fruit Eaten: ", snapshot.fruits_eaten.to_string()),
            stat("Fruit Score: ", snapshot.next_reward.to_string()),
            stat("High Score:  ", metrics.high_score.to_string()),
            stat("Most Eaten:  ", metrics.most_eaten.to_string()),
            stat("Games:       ", metrics.games_played.to_string()),
            Line::from(""),
            Line::from(Span::styled("Controls", heading)),
            control("Move:   ", "WASD / arrows"),
            control("Pause:  ", "P"),
            control("Start:  ", "Enter"),
            control("Save:   ", "G"),
            control("Load:   ", "C"),
            control("Quit:   ", "Q"),
        ];

        Paragraph::new(text).block(Block::default().borders(Borders::LEFT).title(" Info "))
    }

    fn render_overlay(&self, overlay: &Overlay) -> Paragraph<'_> {
        let mut text: Vec<Line> = overlay
            .lines
            .iter()
            .map(|line| Line::from(Span::styled(line.clone(), Style::default().fg(Color::White))))
            .collect();

        if let Some(input) = &overlay.input {
            text.push(Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Green)),
                Span::styled(
                    input.clone(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("_", Style::default().fg(Color::Green)),
            ]));
        }

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} ", overlay.title)),
        )
    }

    fn render_footer(&self, status: Option<&str>) -> Paragraph<'_> {
        let line = match status {
            Some(message) => Line::from(Span::styled(
                message.to_string(),
                Style::default().fg(Color::Yellow),
            )),
            None => Line::from(vec![
                Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
                Span::raw(" or "),
                Span::styled("WASD", Style::default().fg(Color::Cyan)),
                Span::raw(" to move | "),
                Span::styled("Q", Style::default().fg(Color::Red)),
                Span::raw(" to quit"),
            ]),
        };

        Paragraph::new(vec![line]).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn cell_span(tile: Option<TileKind>, decoration: Rgb, facing: Direction) -> Span<'static> {
    match tile {
        None => Span::styled(". ", Style::default().fg(Color::DarkGray)),
        Some(TileKind::SnakeHead) => Span::styled(
            head_glyph(facing),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Some(TileKind::SnakeBody) => Span::styled("■ ", Style::default().fg(to_color(decoration))),
        Some(kind @ (TileKind::RewardA | TileKind::RewardB | TileKind::RewardC)) => Span::styled(
            "● ",
            Style::default()
                .fg(to_color(kind.trail_color()))
                .add_modifier(Modifier::BOLD),
        ),
        Some(TileKind::Hazard) => Span::styled(
            "X ",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
    }
}

fn head_glyph(facing: Direction) -> &'static str {
    match facing {
        Direction::North => "▲ ",
        Direction::South => "▼ ",
        Direction::East => "▶ ",
        Direction::West => "◀ ",
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

fn phase_message(phase: Phase) -> Option<Overlay> {
    let (title, large, small) = match phase {
        Phase::NotStarted => ("Snake", "Snake Game!", "Press Enter to Start"),
        Phase::Over => ("Game Over", "Game Over!", "Press Enter to Restart"),
        Phase::Paused => ("Paused", "Paused", "Press P to Resume"),
        Phase::Running => return None,
    };
    Some(Overlay {
        title: title.to_string(),
        lines: vec![large.to_string(), String::new(), small.to_string()],
        input: None,
    })
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
