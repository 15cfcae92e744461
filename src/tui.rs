//! Interactive terminal viewer.

use crate::config::ViewerConfig;
use crate::controller::{Action, GridViewController};
use crate::display::{CellDisplay, CELL_WIDTH};
use crate::errors::YardResult;
use crate::snapshot::Highlight;
use crate::view::{GridView, Tile, TileKind};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{
    prelude::*,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use std::io;
use std::time::{Duration, Instant};

pub struct AppState {
    controller: GridViewController,
    refresh_interval: Option<Duration>,
    last_refresh: Instant,
    /// Text typed so far while entering an operator note
    note_input: Option<String>,
    should_quit: bool,
    show_help: bool,
}

impl AppState {
    pub fn new(controller: GridViewController, config: &ViewerConfig) -> Self {
        Self {
            controller,
            refresh_interval: config.refresh_interval(),
            last_refresh: Instant::now(),
            note_input: None,
            should_quit: false,
            show_help: false,
        }
    }

    pub fn controller(&self) -> &GridViewController {
        &self.controller
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn is_entering_note(&self) -> bool {
        self.note_input.is_some()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if let Some(input) = self.note_input.as_mut() {
            match key.code {
                KeyCode::Enter => {
                    let note = std::mem::take(input);
                    self.note_input = None;
                    self.controller.start_action(Action::Note(note));
                }
                KeyCode::Esc => self.note_input = None,
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) => input.push(c),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Enter => {
                self.controller.advance_step();
            }
            KeyCode::Char('r') => {
                self.controller.fetch_current_state();
                self.last_refresh = Instant::now();
            }
            KeyCode::Char('d') => {
                self.controller.start_action(Action::DownloadManifest);
            }
            KeyCode::Char('c') => {
                self.controller.start_action(Action::Close);
            }
            KeyCode::Char('n') => self.note_input = Some(String::new()),
            KeyCode::Char('h') => self.show_help = !self.show_help,
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    /// Drain responses and issue the periodic refresh when due
    pub fn on_tick(&mut self) {
        self.controller.poll_responses();
        if self.controller.is_closed() {
            self.should_quit = true;
            return;
        }

        if let Some(interval) = self.refresh_interval {
            if self.last_refresh.elapsed() >= interval && self.controller.in_flight() == 0 {
                self.controller.fetch_current_state();
                self.last_refresh = Instant::now();
            }
        }
    }
}

/// Run the viewer until the user quits or closes the session
pub fn run(controller: GridViewController, config: &ViewerConfig) -> YardResult<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = AppState::new(controller, config);
    let result = event_loop(&mut terminal, &mut app, config.tick());

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    tick_rate: Duration,
) -> YardResult<()> {
    app.controller.initialize();
    let mut last_tick = Instant::now();

    loop {
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        terminal.draw(|f| {
            render_main_ui(f, app);
            if app.show_help {
                render_help(f);
            }
        })?;

        if app.should_quit {
            info!("Viewer closed");
            return Ok(());
        }
    }
}

fn render_main_ui(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(10),   // Yard and log
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    let view = app.controller.view();
    render_header(f, chunks[0], view);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((view.config.cols * CELL_WIDTH + 6) as u16),
            Constraint::Min(30),
        ])
        .split(chunks[1]);

    render_yard(f, body[0], view);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(body[1]);

    render_buffer(f, side[0], &view.buffer);
    render_step_log(f, side[1], app);
    render_footer(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, view: &GridView) {
    let status_style = if view.status.is_complete() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };

    let header = Paragraph::new(vec![
        Line::from(Span::styled(view.status.text(), status_style)),
        Line::from(vec![
            Span::styled("Estimated time: ", Style::default().fg(Color::White)),
            Span::styled(view.total_time.clone(), Style::default().fg(Color::Cyan)),
            Span::raw("   "),
            Span::styled("Total steps: ", Style::default().fg(Color::White)),
            Span::styled(view.num_steps.to_string(), Style::default().fg(Color::Cyan)),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title("Status"));

    f.render_widget(header, area);
}

fn tile_style(tile: &Tile) -> Style {
    let base = match tile.kind {
        TileKind::Container { .. } => Style::default().fg(Color::White).bg(Color::Blue),
        TileKind::Nan => Style::default().fg(Color::DarkGray).bg(Color::Black),
        TileKind::Unused => Style::default().fg(Color::Gray),
        TileKind::Void => Style::default().fg(Color::DarkGray),
    };
    match tile.highlight() {
        Some(Highlight::Red) => base.bg(Color::Red).add_modifier(Modifier::BOLD),
        Some(Highlight::Green) => base.bg(Color::Green).add_modifier(Modifier::BOLD),
        None => base,
    }
}

fn tile_spans(tile: &Tile) -> (Span<'static>, Span<'static>) {
    let style = tile_style(tile);
    let weight: String = match &tile.kind {
        TileKind::Container { weight, .. } => weight.chars().take(CELL_WIDTH - 1).collect(),
        _ => String::new(),
    };
    (
        Span::styled(format!("{:^width$}", tile.display_cell(), width = CELL_WIDTH), style),
        Span::styled(format!("{:^width$}", weight, width = CELL_WIDTH), style),
    )
}

fn render_yard(f: &mut Frame, area: Rect, view: &GridView) {
    let mut lines = Vec::with_capacity(view.config.rows * 2);
    for row in view.rows() {
        let y = row.first().map(|tile| tile.coord.y).unwrap_or_default();
        let mut labels = vec![Span::styled(format!("{:02} ", y), Style::default().fg(Color::DarkGray))];
        let mut weights = vec![Span::raw("   ")];
        for tile in row {
            let (label, weight) = tile_spans(tile);
            labels.push(label);
            weights.push(weight);
        }
        lines.push(Line::from(labels));
        lines.push(Line::from(weights));
    }

    let yard = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Ship ({}x{})", view.config.rows, view.config.cols)),
    );
    f.render_widget(yard, area);
}

fn render_buffer(f: &mut Frame, area: Rect, buffer: &Tile) {
    let (label, weight) = tile_spans(buffer);
    let widget = Paragraph::new(vec![Line::from(label), Line::from(weight)])
        .block(Block::default().borders(Borders::ALL).title("Park"));
    f.render_widget(widget, area);
}

fn render_step_log(f: &mut Frame, area: Rect, app: &AppState) {
    let history = app.controller.history();
    let height = area.height.saturating_sub(2) as usize;
    let offset = history.bottom_offset(height);

    let items: Vec<ListItem> = history
        .display_lines()
        .into_iter()
        .skip(offset)
        .map(|line| ListItem::new(Line::from(line.to_string())))
        .collect();

    let log = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Step log"))
        .style(Style::default().fg(Color::White));
    f.render_widget(log, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &AppState) {
    let line = if let Some(input) = &app.note_input {
        Line::from(vec![
            Span::styled("Note: ", Style::default().fg(Color::Yellow)),
            Span::raw(input.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ])
    } else if let Some(status) = app.controller.update_status() {
        Line::from(Span::styled(status.to_string(), Style::default().fg(Color::Green)))
    } else {
        Line::from(Span::styled(
            "Enter: next step  r: refresh  d: download manifest  n: note  c: close  h: help  q: quit",
            Style::default().fg(Color::DarkGray),
        ))
    };

    let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

fn render_help(f: &mut Frame) {
    let area = f.area();

    let help_text = vec![
        Line::from("Yard Viewer - Help"),
        Line::from(""),
        Line::from("Keyboard Commands:"),
        Line::from("  Enter      - Advance to the next step"),
        Line::from("  r          - Reload the current grid"),
        Line::from("  d          - Download the outbound manifest"),
        Line::from("  n          - Add a note to the operation log"),
        Line::from("  c          - Download the log and close"),
        Line::from("  h          - Toggle this help screen"),
        Line::from("  q / Esc    - Quit"),
        Line::from(""),
        Line::from("Grid Legend:"),
        Line::from(vec![
            Span::styled("  ████ ", Style::default().fg(Color::Green)),
            Span::raw("Container to pick up / crane start"),
        ]),
        Line::from(vec![
            Span::styled("  ████ ", Style::default().fg(Color::Red)),
            Span::raw("Target cell"),
        ]),
        Line::from(vec![
            Span::styled("  ████ ", Style::default().fg(Color::Blue)),
            Span::raw("Container"),
        ]),
        Line::from(vec![
            Span::styled("  NAN  ", Style::default().fg(Color::DarkGray)),
            Span::raw("Not part of the hull"),
        ]),
    ];

    let help_widget = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .title_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White));

    let popup_area = centered_rect(60, 70, area);
    f.render_widget(Clear, popup_area);
    f.render_widget(help_widget, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
