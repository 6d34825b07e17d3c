use std::io;
use std::time::Duration;

use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{error, info, warn};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table};

use league_dash::config::AppConfig;
use league_dash::console_log::{self, ConsoleLogger};
use league_dash::dashboard::{
    BarsView, Metric, Page, PageView, Selection, TableView, ViewBlock, render_error, render_page,
};
use league_dash::export;
use league_dash::pipeline::{self, Dataset};
use league_dash::store::QueryExecutor;

const CONSOLE_LINES: usize = 4;

struct App {
    config: AppConfig,
    executor: QueryExecutor,
    logger: &'static ConsoleLogger,
    selection: Selection,
    scroll: usize,
    view: PageView,
    dataset: Option<Dataset>,
    help_overlay: bool,
    should_quit: bool,
}

impl App {
    fn new(config: AppConfig, logger: &'static ConsoleLogger) -> Self {
        let executor = QueryExecutor::new(config.source.clone());
        let mut app = Self {
            config,
            executor,
            logger,
            selection: Selection::default(),
            scroll: 0,
            view: PageView {
                title: String::new(),
                blocks: Vec::new(),
            },
            dataset: None,
            help_overlay: false,
            should_quit: false,
        };
        app.refresh();
        app
    }

    /// Runs the whole pipeline again and re-renders the current page.
    fn refresh(&mut self) {
        match pipeline::load_dataset(&self.executor, self.config.integrity) {
            Ok(data) => {
                self.view = render_page(&self.selection, &data);
                self.dataset = Some(data);
            }
            Err(err) => {
                let err = anyhow::Error::new(err)
                    .context(format!("loading from {}", self.executor.source().label()));
                error!("{err:#}");
                self.view = render_error(&err);
                self.dataset = None;
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('?') => {
                self.help_overlay = !self.help_overlay;
                return;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
                return;
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                return;
            }
            KeyCode::Char(c @ '1'..='6') => {
                let idx = c as usize - '1' as usize;
                self.set_page(Page::ALL[idx]);
            }
            KeyCode::Tab => self.set_page(self.selection.page.next()),
            KeyCode::Char('s') => self.selection.sort_column = self.selection.sort_column.next(),
            KeyCode::Char('S') => self.selection.sort_column = self.selection.sort_column.prev(),
            KeyCode::Char('o') => {
                self.selection.sort_direction = self.selection.sort_direction.toggle()
            }
            KeyCode::Char('a') => self.cycle_team(TeamSlot::A, true),
            KeyCode::Char('A') => self.cycle_team(TeamSlot::A, false),
            KeyCode::Char('b') => self.cycle_team(TeamSlot::B, true),
            KeyCode::Char('B') => self.cycle_team(TeamSlot::B, false),
            KeyCode::Char('m') => self.cycle_matchday(true),
            KeyCode::Char('M') => self.cycle_matchday(false),
            KeyCode::Char('r') => info!("reload requested"),
            KeyCode::Char('e') => {
                self.export();
                return;
            }
            _ => return,
        }
        self.refresh();
    }

    fn set_page(&mut self, page: Page) {
        if self.selection.page != page {
            self.scroll = 0;
        }
        self.selection.page = page;
    }

    fn cycle_team(&mut self, slot: TeamSlot, forward: bool) {
        let Some(data) = &self.dataset else {
            warn!("no teams loaded");
            return;
        };
        let names = data.teams.names();
        if names.is_empty() {
            return;
        }
        let current = match slot {
            TeamSlot::A => self.selection.team_a.as_deref(),
            TeamSlot::B => self.selection.team_b.as_deref(),
        };
        let default_idx = match slot {
            TeamSlot::A => 0,
            TeamSlot::B => 1.min(names.len() - 1),
        };
        let idx = current
            .and_then(|name| names.iter().position(|n| *n == name))
            .unwrap_or(default_idx);
        let next = if forward {
            (idx + 1) % names.len()
        } else {
            (idx + names.len() - 1) % names.len()
        };
        let picked = Some(names[next].to_string());
        match slot {
            TeamSlot::A => self.selection.team_a = picked,
            TeamSlot::B => self.selection.team_b = picked,
        }
    }

    fn cycle_matchday(&mut self, forward: bool) {
        let Some(data) = &self.dataset else {
            return;
        };
        let days = data.matches.matchdays();
        self.selection.matchday = step_matchday(&days, self.selection.matchday, forward);
        self.scroll = 0;
    }

    fn export(&mut self) {
        let Some(data) = &self.dataset else {
            warn!("nothing to export; reload first");
            return;
        };
        let path = &self.config.export_path;
        match export::export_xlsx(data, path) {
            Ok(report) => info!(
                "exported {} teams, {} matches to {}",
                report.teams,
                report.matches,
                path.display()
            ),
            Err(err) => error!("export failed: {err:#}"),
        }
    }
}

#[derive(Clone, Copy)]
enum TeamSlot {
    A,
    B,
}

/// `None` (all matchdays) sits between the last and the first day.
fn step_matchday(days: &[i64], current: Option<i64>, forward: bool) -> Option<i64> {
    if days.is_empty() {
        return None;
    }
    let pos = current.and_then(|day| days.iter().position(|d| *d == day));
    match (pos, forward) {
        (None, true) => days.first().copied(),
        (None, false) => days.last().copied(),
        (Some(i), true) => days.get(i + 1).copied(),
        (Some(0), false) => None,
        (Some(i), false) => days.get(i - 1).copied(),
    }
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let logger = console_log::init();
    let config = AppConfig::from_env().context("configuration")?;
    info!("data source: {}", config.source.label());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(config, logger);
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
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
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
            Constraint::Length(CONSOLE_LINES as u16 + 2),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(14), Constraint::Min(1)])
        .split(chunks[1]);
    render_sidebar(frame, columns[0], app.selection.page);
    render_view(frame, columns[1], &app.view, app.scroll);

    let console = Paragraph::new(console_text(app.logger))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(
        "1-6/Tab Page | s/S Sort | o Order | a/A b/B Teams | m/M Matchday | j/k Scroll | r Reload | e Export | ? Help | q Quit",
    )
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    format!(
        "LEAGUE DASHBOARD | {} | {}",
        app.view.title,
        app.executor.source().label()
    )
}

fn render_sidebar(frame: &mut Frame, area: Rect, current: Page) {
    let lines: Vec<Line> = Page::ALL
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let text = format!("{} {}", i + 1, page.label());
            if *page == current {
                Line::styled(
                    text,
                    Style::default().fg(Color::Black).bg(Color::Cyan),
                )
            } else {
                Line::raw(text)
            }
        })
        .collect();
    let sidebar = Paragraph::new(lines).block(Block::default().title("Pages").borders(Borders::ALL));
    frame.render_widget(sidebar, area);
}

fn render_view(frame: &mut Frame, area: Rect, view: &PageView, scroll: usize) {
    if view.blocks.is_empty() {
        return;
    }
    let constraints: Vec<Constraint> = view.blocks.iter().map(block_constraint).collect();
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (block, area) in view.blocks.iter().zip(areas.iter()) {
        match block {
            ViewBlock::Text(text) => {
                frame.render_widget(Paragraph::new(text.as_str()), *area);
            }
            ViewBlock::Metrics(metrics) => render_metrics(frame, *area, metrics),
            ViewBlock::Table(table) => render_table(frame, *area, table, scroll),
            ViewBlock::Bars(bars) => render_bars(frame, *area, bars),
        }
    }
}

fn block_constraint(block: &ViewBlock) -> Constraint {
    match block {
        ViewBlock::Text(_) => Constraint::Length(1),
        ViewBlock::Metrics(_) => Constraint::Length(3),
        ViewBlock::Table(_) => Constraint::Min(4),
        ViewBlock::Bars(bars) => Constraint::Length(bars.bars.len().min(12) as u16 + 2),
    }
}

fn render_metrics(frame: &mut Frame, area: Rect, metrics: &[Metric]) {
    if metrics.is_empty() {
        return;
    }
    let widths = vec![Constraint::Ratio(1, metrics.len() as u32); metrics.len()];
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    for (metric, cell) in metrics.iter().zip(cells.iter()) {
        let widget = Paragraph::new(metric.value.as_str())
            .style(Style::default().add_modifier(Modifier::BOLD))
            .block(Block::default().title(metric.label.as_str()).borders(Borders::ALL));
        frame.render_widget(widget, *cell);
    }
}

fn render_table(frame: &mut Frame, area: Rect, table: &TableView, scroll: usize) {
    let visible = area.height.saturating_sub(3) as usize;
    let (start, end) = visible_range(scroll, table.rows.len(), visible);

    let header = Row::new(table.headers.iter().map(|h| Cell::from(h.as_str())))
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = table.rows[start..end]
        .iter()
        .map(|row| Row::new(row.iter().map(|v| Cell::from(v.as_str()))));
    let widths = column_widths(table);

    let title = if table.rows.len() > visible {
        format!("{} ({}-{} of {})", table.title, start + 1, end, table.rows.len())
    } else {
        table.title.clone()
    };
    let widget = Table::new(rows, widths)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn column_widths(table: &TableView) -> Vec<Constraint> {
    (0..table.headers.len())
        .map(|col| {
            let widest = table
                .rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(|v| v.chars().count())
                .chain(std::iter::once(table.headers[col].chars().count()))
                .max()
                .unwrap_or(1);
            Constraint::Length(widest.min(24) as u16 + 1)
        })
        .collect()
}

/// Clamps the scroll offset so the last page stays full.
fn visible_range(scroll: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }
    let start = scroll.min(total - visible);
    (start, start + visible)
}

fn render_bars(frame: &mut Frame, area: Rect, view: &BarsView) {
    let bars: Vec<Bar> = view
        .bars
        .iter()
        .map(|(label, value)| {
            let color = if *value < 0 { Color::Red } else { Color::Green };
            Bar::default()
                .label(Line::from(label.clone()))
                .value(value.unsigned_abs())
                .text_value(format!("{value}{}", view.unit))
                .style(Style::default().fg(color))
        })
        .collect();
    let chart = BarChart::default()
        .block(Block::default().title(view.title.as_str()).borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0);
    frame.render_widget(chart, area);
}

fn console_text(logger: &ConsoleLogger) -> String {
    let lines = logger.recent(CONSOLE_LINES);
    if lines.is_empty() {
        return "No log lines yet".to_string();
    }
    lines.join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "League Dashboard - Help",
        "",
        "Pages:",
        "  1-6 / Tab    Home, Teams, Matches, Compare, Stats, Database",
        "",
        "Teams:",
        "  s / S        Next / previous sort column",
        "  o            Toggle ascending / descending",
        "",
        "Matches:",
        "  m / M        Next / previous matchday (wraps to all)",
        "",
        "Compare:",
        "  a / A        Cycle team A",
        "  b / B        Cycle team B",
        "",
        "Global:",
        "  j/k or ↑/↓   Scroll tables",
        "  r            Reload",
        "  e            Export workbook",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text).block(Block::default().title("Help").borders(Borders::ALL));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matchday_steps_wrap_through_all() {
        let days = [1, 2, 3];
        assert_eq!(step_matchday(&days, None, true), Some(1));
        assert_eq!(step_matchday(&days, Some(3), true), None);
        assert_eq!(step_matchday(&days, Some(1), false), None);
        assert_eq!(step_matchday(&days, None, false), Some(3));
        assert_eq!(step_matchday(&[], Some(2), true), None);
    }

    #[test]
    fn scroll_is_clamped_to_last_page() {
        assert_eq!(visible_range(0, 10, 4), (0, 4));
        assert_eq!(visible_range(50, 10, 4), (6, 10));
        assert_eq!(visible_range(3, 2, 4), (0, 2));
        assert_eq!(visible_range(0, 0, 4), (0, 0));
    }
}
