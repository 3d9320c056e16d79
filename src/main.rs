use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap};

use fpl_stats::config::Config;
use fpl_stats::dashboard::{Section, SectionKind};
use fpl_stats::provider::spawn_provider;
use fpl_stats::rankings::ResultTable;
use fpl_stats::state::{AppState, Delta, LoadState, ProviderCommand, apply_delta};

const MAX_COLUMN_WIDTH: usize = 40;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    config: Config,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>, config: Config) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
            config,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('J') | KeyCode::PageDown => self.state.scroll_down(),
            KeyCode::Char('K') | KeyCode::PageUp => self.state.scroll_up(),
            KeyCode::Char('[') => self.state.cycle_first(-1),
            KeyCode::Char(']') => self.state.cycle_first(1),
            KeyCode::Char('{') => self.state.cycle_second(-1),
            KeyCode::Char('}') => self.state.cycle_second(1),
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_load(),
            KeyCode::Char('e') | KeyCode::Char('E') => self.request_export(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn send(&mut self, cmd: ProviderCommand, what: &str) -> bool {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log(format!("[INFO] {what} unavailable"));
            return false;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log(format!("[WARN] {what} request failed"));
            return false;
        }
        true
    }

    fn request_load(&mut self) {
        if self.send(ProviderCommand::Load, "Load") {
            self.state.push_log("[INFO] Reload requested");
        }
    }

    fn request_export(&mut self) {
        if self.state.export_in_progress {
            self.state.push_log("[INFO] Export already running");
            return;
        }
        if self.state.sections.is_empty() {
            self.state.push_log("[INFO] Nothing to export yet");
            return;
        }
        let cmd = ProviderCommand::Export {
            path: self.config.export_path.clone(),
            sections: self.state.sections.clone(),
        };
        if self.send(cmd, "Export") {
            self.state.export_in_progress = true;
            self.state.push_log(format!(
                "[INFO] Exporting to {}",
                self.config.export_path.display()
            ));
        }
    }
}

fn main() -> io::Result<()> {
    let config = Config::from_env();
    init_logging(&config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(tx, cmd_rx, config.clone());

    let mut app = App::new(Some(cmd_tx), config);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

// The alternate screen owns stdout, so tracing goes to a file.
fn init_logging(config: &Config) {
    let file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
    {
        Ok(file) => file,
        Err(err) => {
            eprintln!(
                "[WARN] logging disabled, cannot open {}: {err}",
                config.log_file.display()
            );
            return;
        }
    };
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(config.log_level)
        .init();
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

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
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(48), Constraint::Min(30)])
        .split(chunks[1]);
    render_section_list(frame, body[0], &app.state);
    render_section(frame, body[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(
        "j/k Section | J/K Scroll | [/] Player 1 | {/} Player 2 | r Reload | e Export | ? Help | q Quit",
    )
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let status = match &state.load {
        LoadState::Loading => "loading".to_string(),
        LoadState::Ready => match &state.loaded_at {
            Some(at) => format!("loaded {at}"),
            None => "ready".to_string(),
        },
        LoadState::Failed(_) => "load failed".to_string(),
    };
    format!("FANTASY PREMIER LEAGUE STATS ANALYSER | {status}")
}

fn render_section_list(frame: &mut Frame, area: Rect, state: &AppState) {
    let lines = SectionKind::ALL
        .iter()
        .enumerate()
        .map(|(idx, kind)| {
            let marker = if idx == state.selected { "> " } else { "  " };
            let failed = state
                .sections
                .get(idx)
                .is_some_and(|s| s.outcome.is_err());
            let line = format!("{marker}{}", kind.title());
            let style = match (idx == state.selected, failed) {
                (_, true) => Style::default().fg(Color::Red),
                (true, false) => Style::default().fg(Color::White).bg(Color::DarkGray),
                (false, false) => Style::default(),
            };
            Line::styled(line, style)
        })
        .collect::<Vec<_>>();
    let list = Paragraph::new(lines).block(Block::default().title("Sections").borders(Borders::ALL));
    frame.render_widget(list, area);
}

fn render_section(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = SectionKind::ALL
        .get(state.selected)
        .map(|k| k.title())
        .unwrap_or_default();
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    match &state.load {
        LoadState::Loading => {
            let loading = Paragraph::new("Loading FPL data...")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(loading, inner);
            return;
        }
        LoadState::Failed(msg) => {
            let failed = Paragraph::new(format!("Could not load FPL data: {msg}\n\nPress r to retry."))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            frame.render_widget(failed, inner);
            return;
        }
        LoadState::Ready => {}
    }

    let Some(section) = state.selected_section() else {
        return;
    };

    let mut area = inner;
    if section.kind == SectionKind::Comparison {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1)])
            .split(inner);
        let selection = state.selection();
        let selectors = Paragraph::new(format!(
            "Player 1: {}    Player 2: {}",
            selection.first, selection.second
        ))
        .style(Style::default().add_modifier(Modifier::BOLD));
        frame.render_widget(selectors, parts[0]);
        area = parts[1];
    }

    render_outcome(frame, area, section, state.scroll);
}

fn render_outcome(frame: &mut Frame, area: Rect, section: &Section, scroll: u16) {
    let table = match &section.outcome {
        Ok(table) => table,
        Err(err) => {
            let failed = Paragraph::new(format!("Section unavailable: {err}"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            frame.render_widget(failed, area);
            return;
        }
    };
    if table.is_empty() {
        let style = if section.kind == SectionKind::Flagged {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let empty = Paragraph::new(section.kind.empty_message()).style(style);
        frame.render_widget(empty, area);
        return;
    }
    frame.render_widget(result_table_widget(table, scroll), area);
}

fn result_table_widget(table: &ResultTable, scroll: u16) -> Table<'static> {
    let mut headers = vec![table.index_column.clone()];
    headers.extend(table.columns.iter().cloned());

    let body = table
        .rows
        .iter()
        .skip(scroll as usize)
        .map(|row| {
            let mut cells = vec![row.index.clone()];
            cells.extend(row.cells.iter().map(|c| c.to_string()));
            cells
        })
        .collect::<Vec<_>>();

    let widths = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let widest = body
                .iter()
                .filter_map(|cells| cells.get(col))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .max(header.chars().count())
                .min(MAX_COLUMN_WIDTH);
            Constraint::Length(widest as u16 + 1)
        })
        .collect::<Vec<_>>();

    let header_row = Row::new(headers).style(Style::default().add_modifier(Modifier::BOLD));
    Table::new(body.into_iter().map(Row::new), widths).header(header_row)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "FPL Stats Analyser - Help",
        "",
        "  j/k or ↑/↓      Select section",
        "  J/K or PgDn/PgUp Scroll rows",
        "  [ / ]           Previous/next player 1",
        "  { / }           Previous/next player 2",
        "  r               Reload (served from session cache)",
        "  e               Export sections to xlsx",
        "  ?               Toggle help",
        "  q               Quit",
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
