use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use outcome_terminal::catalog::CategoryField;
use outcome_terminal::config::{self, AppConfig};
use outcome_terminal::context::AppContext;
use outcome_terminal::outcome::{Outcome, outcome_label};
use outcome_terminal::state::{AppState, Focus, Submission, focus_label};
use outcome_terminal::telemetry;

struct App {
    ctx: AppContext,
    state: AppState,
    should_quit: bool,
}

impl App {
    fn new(ctx: AppContext, config: &AppConfig) -> Self {
        let mut state = AppState::from_catalog(ctx.catalog(), config.attendance_step);
        state.push_log(format!(
            "[INFO] Catalog: {} weather, {} teams, {} locations",
            ctx.catalog().len(CategoryField::Weather),
            ctx.catalog().len(CategoryField::Team),
            ctx.catalog().len(CategoryField::Location),
        ));
        state.push_log(format!("[INFO] Model: {}", ctx.model().describe()));
        Self {
            ctx,
            state,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.state.help_overlay = false;
            }
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => self.state.focus_next(),
            KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => self.state.focus_prev(),
            KeyCode::Char('l') | KeyCode::Right => self.state.cycle_next(),
            KeyCode::Char('h') | KeyCode::Left => self.state.cycle_prev(),
            KeyCode::Char(c) if c.is_ascii_digit() => self.state.push_attendance_digit(c),
            KeyCode::Backspace => self.state.pop_attendance_digit(),
            KeyCode::Enter => self.state.submit(&self.ctx),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    config::load_dotenv();
    let log_path = telemetry::init_file()?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let config = AppConfig::from_env_and_args(&args)?;
    // Startup failures are fatal and must be readable, so they surface before
    // the terminal switches to raw mode.
    let ctx = AppContext::initialize(&config).with_context(|| {
        format!(
            "startup failed (db {}, model {})",
            config.db_path.display(),
            config.model_path.display()
        )
    })?;

    let mut app = App::new(ctx, &config);
    if let Some(path) = log_path {
        app.state
            .push_log(format!("[INFO] Logging to {}", path.display()));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    render_form(frame, columns[0], &app.state);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(3)])
        .split(columns[1]);

    let prediction = prediction_paragraph(&app.state)
        .block(Block::default().title("Prediction").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(prediction, right[0]);

    let console_height = right[1].height.saturating_sub(2) as usize;
    let console = Paragraph::new(console_text(&app.state, console_height))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, right[1]);

    let footer = Paragraph::new(
        "↑/↓ Field | ←/→ Change | 0-9 Attendance | Enter Predict | ? Help | q Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let catalog = app.ctx.catalog();
    let title = format!(
        "MATCH OUTCOME PREDICTOR | {} teams | {} venues | {} predictions",
        catalog.len(CategoryField::Team),
        catalog.len(CategoryField::Location),
        app.state.submissions
    );
    let line1 = format!("  .-.  {title}");
    let line2 = " /___\\".to_string();
    format!("{line1}\n{line2}")
}

fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Match Details").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    const ROW_HEIGHT: u16 = 2;
    for (i, focus) in Focus::ALL.iter().enumerate() {
        let y = inner.y + (i as u16) * ROW_HEIGHT;
        if y >= inner.y + inner.height {
            break;
        }
        let row_area = Rect {
            x: inner.x,
            y,
            width: inner.width,
            height: 1,
        };

        let selected = *focus == state.focus;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(13), Constraint::Min(10)])
            .split(row_area);

        let label = Paragraph::new(focus_label(*focus))
            .style(row_style.add_modifier(Modifier::BOLD));
        frame.render_widget(label, cols[0]);

        let value = Paragraph::new(input_text(state, *focus, selected)).style(row_style);
        frame.render_widget(value, cols[1]);
    }
}

fn input_text(state: &AppState, focus: Focus, selected: bool) -> String {
    match focus.field() {
        Some(field) => {
            let Some(selector) = state.selector(field) else {
                return "-".to_string();
            };
            let Some(value) = selector.value() else {
                return "(no values)".to_string();
            };
            format!(
                "◀ {value} ▶  {}/{}",
                selector.selected + 1,
                selector.options.len()
            )
        }
        None => {
            let shown = if state.attendance_input.is_empty() {
                "0"
            } else {
                state.attendance_input.as_str()
            };
            let cursor = if selected { "_" } else { "" };
            format!("{shown}{cursor}  (±{})", state.attendance_step)
        }
    }
}

fn prediction_paragraph(state: &AppState) -> Paragraph<'static> {
    match &state.last_submission {
        None => Paragraph::new("Press Enter to predict the outcome")
            .style(Style::default().fg(Color::DarkGray)),
        Some(Submission::Predicted(message)) => {
            let color = match message.outcome {
                Outcome::Team1Win => Color::Green,
                Outcome::Team2Win => Color::Red,
                Outcome::Draw => Color::Yellow,
            };
            let text = format!(
                "{}\n\nResult: {} (label {})",
                message.text,
                outcome_label(message.outcome),
                message.label.0
            );
            Paragraph::new(text).style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        }
        Some(Submission::Rejected(reason)) => {
            Paragraph::new(format!("Rejected: {reason}")).style(Style::default().fg(Color::Red))
        }
    }
}

fn console_text(state: &AppState, lines: usize) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(lines.max(1));
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Match Outcome Predictor - Help",
        "",
        "  ↑/↓ j/k Tab   Move between fields",
        "  ←/→ h/l       Change selection / step attendance",
        "  0-9           Type attendance",
        "  Backspace     Delete attendance digit",
        "  Enter         Predict",
        "  ?             Toggle help",
        "  q / Esc       Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
