pub mod keys;
pub mod view;

use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use replaygrid_engine::events::TableEvent;
use replaygrid_engine::source::DataProvider;
use replaygrid_engine::{GridError, LoadStatus, Widget};
use replaygrid_io::ExportFormat;

use crate::util;
use keys::{Command, Mode};
use view::TableView;

/// Longest the event loop waits for input before redrawing.
const FRAME: Duration = Duration::from_millis(100);

pub struct ViewOptions {
    /// Shown in the title bar (file path or URL)
    pub source: String,
    /// Where J/C write data.json / data.csv
    pub export_dir: PathBuf,
}

struct TuiApp {
    widget: Widget,
    view: TableView,
    source: String,
    export_dir: PathBuf,
    cursor_row: usize,
    cursor_col: usize,
    scroll_row: usize,
    scroll_col: usize,
    /// Editor text while a cell is being edited
    editor: Option<String>,
    needle: String,
    search_focused: bool,
    notice: Option<String>,
    should_quit: bool,
    show_help: bool,
}

impl TuiApp {
    fn new(widget: Widget, options: ViewOptions) -> Self {
        let view = TableView::from_widget(&widget);
        Self {
            widget,
            view,
            source: options.source,
            export_dir: options.export_dir,
            cursor_row: 0,
            cursor_col: 0,
            scroll_row: 0,
            scroll_col: 0,
            editor: None,
            needle: String::new(),
            search_focused: false,
            notice: None,
            should_quit: false,
            show_help: false,
        }
    }

    fn mode(&self) -> Mode {
        let state = self.widget.state();
        if self.widget.is_replaying() {
            Mode::Replaying
        } else if state.edit.is_some() {
            Mode::Editing
        } else if state.search_active && self.search_focused {
            Mode::Searching
        } else {
            Mode::Browse
        }
    }

    fn handle(&mut self, command: Command, now: Instant) {
        match command {
            Command::Quit => {
                self.widget.teardown();
                self.should_quit = true;
            }
            Command::Help => self.show_help = true,
            Command::Move { rows, cols } => {
                let before = self.cursor_col;
                self.move_cursor(rows, cols);
                if self.mode() == Mode::Searching && before != self.cursor_col && !self.needle.is_empty() {
                    let result = self.widget.search(self.cursor_col, &self.needle);
                    self.report(result);
                }
            }
            Command::Sort => {
                let result = self.widget.sort(self.cursor_col);
                self.report(result);
            }
            Command::StartEdit => {
                if let Some(&record) = self.view.row_ids.get(self.cursor_row) {
                    let result = self.widget.show_editor(record, self.cursor_col);
                    self.report(result);
                }
            }
            Command::EditInput(c) => {
                if let Some(buffer) = self.editor.as_mut() {
                    buffer.push(c);
                }
            }
            Command::EditBackspace => {
                if let Some(buffer) = self.editor.as_mut() {
                    buffer.pop();
                }
            }
            Command::CommitEdit => {
                let input = self.editor.clone().unwrap_or_default();
                let result = self.widget.save(&input);
                if result.is_ok() {
                    self.editor = None;
                }
                self.report(result);
            }
            Command::CancelEdit => {
                let result = self.widget.cancel_edit();
                self.editor = None;
                self.report(result);
            }
            Command::ToggleSearch => {
                self.needle.clear();
                let result = self.widget.toggle_search();
                self.search_focused = self.widget.state().search_active;
                self.report(result);
            }
            Command::FocusSearch => {
                if self.widget.state().search_active {
                    self.search_focused = true;
                } else {
                    self.move_cursor(0, 1);
                }
            }
            Command::FocusTable => self.search_focused = false,
            Command::SearchInput(c) => {
                self.needle.push(c);
                let result = self.widget.search(self.cursor_col, &self.needle);
                self.report(result);
            }
            Command::SearchBackspace => {
                self.needle.pop();
                let result = self.widget.search(self.cursor_col, &self.needle);
                self.report(result);
            }
            Command::ExportJson => self.export(ExportFormat::Json),
            Command::ExportCsv => self.export(ExportFormat::Csv),
            Command::Replay => {
                // NoHistoryToReplay surfaces through the widget's warning event
                if let Err(e) = self.widget.start_replay(now) {
                    if e != GridError::NoHistoryToReplay {
                        self.notice = Some(e.to_string());
                    }
                }
            }
            Command::StopReplay => self.widget.stop_replay(),
        }
        self.refresh();
    }

    fn report(&mut self, result: Result<usize, GridError>) {
        match result {
            Ok(_) => self.notice = None,
            Err(e) => {
                log::debug!("action refused: {}", e);
                self.notice = Some(e.to_string());
            }
        }
    }

    fn export(&mut self, format: ExportFormat) {
        let path = self.export_dir.join(format.default_file_name());
        let data = self.widget.export_data();
        self.notice = Some(match replaygrid_io::export(&data, format, &path) {
            Ok(()) => {
                log::info!("exported {} rows to {}", data.len(), path.display());
                format!("Exported {} rows to {}", data.len(), path.display())
            }
            Err(e) => {
                log::warn!("export to {} failed: {}", path.display(), e);
                format!("Export failed: {}", e)
            }
        });
    }

    /// Replay due entries. Returns true if anything changed.
    fn tick(&mut self, now: Instant) -> bool {
        if self.widget.tick(now) > 0 {
            self.refresh();
            true
        } else {
            false
        }
    }

    /// Rebuild the view after the widget changed and fold its events into the status line.
    fn refresh(&mut self) {
        self.view = TableView::from_widget(&self.widget);
        self.cursor_row = self.cursor_row.min(self.view.num_rows().saturating_sub(1));
        self.cursor_col = self.cursor_col.min(self.view.num_cols().saturating_sub(1));

        let state = self.widget.state();
        match state.edit {
            None => self.editor = None,
            Some(cursor) if self.editor.is_none() => {
                let current = state
                    .row(cursor.record)
                    .and_then(|row| row.cell(cursor.column))
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                self.editor = Some(current);
            }
            Some(_) => {}
        }
        if !state.search_active {
            self.search_focused = false;
            self.needle.clear();
        }

        for event in self.widget.drain_events() {
            match event {
                TableEvent::Warning(msg) => self.notice = Some(msg),
                TableEvent::Loaded { rows } => self.notice = Some(format!("Loaded {} rows", rows)),
                TableEvent::ReplayStarted { entries } => {
                    self.notice = Some(format!("Replaying {} state changes", entries))
                }
                TableEvent::ReplayStopped { completed } => {
                    self.notice = Some(if completed { "Replay finished" } else { "Replay stopped" }.to_string())
                }
                TableEvent::Committed(_) | TableEvent::Replayed(_) => {}
            }
        }
    }

    fn move_cursor(&mut self, drow: i32, dcol: i32) {
        // Letter-titled data columns past the headers are display only
        let cols = self.widget.columns().len();
        if cols > 0 {
            let col = (self.cursor_col as i64 + dcol as i64).clamp(0, cols as i64 - 1);
            self.cursor_col = col as usize;
        }
        if self.view.num_rows() > 0 {
            let row = (self.cursor_row as i64 + drow as i64).clamp(0, self.view.num_rows() as i64 - 1);
            self.cursor_row = row as usize;
        }
    }

    fn ensure_visible(&mut self, visible_rows: usize, area_width: u16) {
        if self.cursor_row < self.scroll_row {
            self.scroll_row = self.cursor_row;
        }
        if visible_rows > 0 && self.cursor_row >= self.scroll_row + visible_rows {
            self.scroll_row = self.cursor_row + 1 - visible_rows;
        }

        if self.cursor_col < self.scroll_col {
            self.scroll_col = self.cursor_col;
        }
        let available = area_width as usize;
        while self.scroll_col < self.cursor_col {
            let cols = self.view.visible_columns(self.scroll_col, available);
            if cols.last().is_some_and(|&last| last >= self.cursor_col) {
                break;
            }
            self.scroll_col += 1;
        }
    }

    /// Rows above the grid body: header, plus the search row when shown.
    fn grid_chrome(&self) -> u16 {
        if self.widget.state().search_active {
            2
        } else {
            1
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

        self.draw_title(frame, chunks[0]);
        self.draw_grid(frame, chunks[1]);
        self.draw_status(frame, chunks[2]);

        if self.show_help {
            self.draw_help(frame, area);
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let replay = match self.widget.replay_progress() {
            Some((applied, total)) => format!(" | replay {}/{}", applied, total),
            None => String::new(),
        };
        let title = format!(
            " rgrid: {} | {} rows x {} cols | {} changes{} ",
            self.source,
            self.view.num_rows(),
            self.view.num_cols(),
            self.widget.history().commit_count(),
            replay
        );
        let bg = if self.widget.is_replaying() { Color::Magenta } else { Color::Cyan };
        let para = Paragraph::new(Line::from(vec![Span::styled(
            title,
            Style::default().fg(Color::Black).bg(bg).add_modifier(Modifier::BOLD),
        )]))
        .style(Style::default().bg(bg));
        frame.render_widget(para, area);
    }

    fn draw_grid(&self, frame: &mut Frame, area: Rect) {
        let vis_cols = self.view.visible_columns(self.scroll_col, area.width as usize);
        let mut lines: Vec<Line> = Vec::new();

        let header_spans: Vec<Span> = vis_cols
            .iter()
            .map(|&c| {
                let w = self.view.width(c);
                let style = if c == self.cursor_col {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                };
                Span::styled(format!("{} ", util::pad_right(&self.view.headers[c], w)), style)
            })
            .collect();
        lines.push(Line::from(header_spans));

        if self.widget.state().search_active {
            let focused = self.mode() == Mode::Searching;
            let search_spans: Vec<Span> = vis_cols
                .iter()
                .map(|&c| {
                    let w = self.view.width(c);
                    if c == self.cursor_col {
                        let text = if focused { format!("{}_", self.needle) } else { self.needle.clone() };
                        Span::styled(
                            format!("{} ", util::pad_right(&text, w)),
                            Style::default().fg(Color::Black).bg(Color::Yellow),
                        )
                    } else {
                        Span::styled(
                            format!("{} ", " ".repeat(w)),
                            Style::default().bg(Color::DarkGray),
                        )
                    }
                })
                .collect();
            lines.push(Line::from(search_spans));
        }

        if self.view.loading {
            lines.push(Line::from(Span::styled("Loading data...", Style::default().fg(Color::DarkGray))));
        }

        let edit = self.widget.state().edit;
        let visible_rows = area.height.saturating_sub(self.grid_chrome()) as usize;
        let end_row = (self.scroll_row + visible_rows).min(self.view.num_rows());

        for r in self.scroll_row..end_row {
            let is_cursor_row = r == self.cursor_row;
            let record = self.view.row_ids[r];
            let spans: Vec<Span> = vis_cols
                .iter()
                .map(|&c| {
                    let w = self.view.width(c);
                    let editing_here = edit.is_some_and(|e| e.record == record && e.column == c);
                    if editing_here {
                        let text = format!("{}_", self.editor.as_deref().unwrap_or(""));
                        return Span::styled(
                            format!("{} ", util::pad_right(&text, w)),
                            Style::default().fg(Color::Black).bg(Color::Green),
                        );
                    }
                    let style = if is_cursor_row && c == self.cursor_col {
                        Style::default().fg(Color::Black).bg(Color::White).add_modifier(Modifier::BOLD)
                    } else if is_cursor_row {
                        Style::default().fg(Color::White)
                    } else {
                        Style::default().fg(Color::Gray)
                    };
                    Span::styled(format!("{} ", util::pad_right(&self.view.rows[r][c], w)), style)
                })
                .collect();
            lines.push(Line::from(spans));
        }

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let left = match (&self.notice, self.widget.load_status()) {
            (Some(notice), _) => format!(" {}", notice),
            (None, LoadStatus::Failed(msg)) => format!(" Failed to load data: {}", msg),
            (None, _) => {
                let col_name = self.view.headers.get(self.cursor_col).map(|s| s.as_str()).unwrap_or("?");
                let value = self
                    .view
                    .rows
                    .get(self.cursor_row)
                    .and_then(|row| row.get(self.cursor_col))
                    .map(|s| s.as_str())
                    .unwrap_or("");
                format!(" {} = {:?}", col_name, value)
            }
        };
        let hint = match self.mode() {
            Mode::Browse => "s sort  e edit  / search  J/C export  Alt+Shift+R replay  ?: help ",
            Mode::Editing => "Enter save  Esc cancel ",
            Mode::Searching => "type to filter  Tab table  Esc close ",
            Mode::Replaying => "Esc stop  q quit ",
        };

        let padding = (area.width as usize).saturating_sub(util::display_width(&left) + hint.len());
        let status = format!("{}{:pad$}{}", left, "", hint, pad = padding);

        let para = Paragraph::new(Line::from(vec![Span::styled(
            status,
            Style::default().fg(Color::Black).bg(Color::DarkGray),
        )]))
        .style(Style::default().bg(Color::DarkGray));
        frame.render_widget(para, area);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let help_lines = [
            "",
            "  Table",
            "  -----",
            "  arrows / hjkl     Move cursor",
            "  s                 Sort by column (again: reverse)",
            "  e / Enter         Edit cell",
            "  /                 Show/hide search row",
            "  Tab               Focus search row",
            "",
            "  Export",
            "  ------",
            "  J                 data.json",
            "  C                 data.csv",
            "",
            "  Replay",
            "  ------",
            "  Alt+Shift+R       Replay every change",
            "  Esc               Stop replay",
            "",
            "  q                 Quit",
            "",
        ];
        let help_width: u16 = 50;
        let help_height: u16 = help_lines.len() as u16 + 2;

        let x = area.width.saturating_sub(help_width) / 2;
        let y = area.height.saturating_sub(help_height) / 2;
        let popup = Rect::new(
            area.x + x,
            area.y + y,
            help_width.min(area.width),
            help_height.min(area.height),
        );

        let lines: Vec<Line> = help_lines
            .iter()
            .map(|s| Line::from(Span::styled(*s, Style::default().fg(Color::White))))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Keybindings ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

/// Run the interactive table. When `provider` is given, the table shows a
/// loading row until it has delivered.
pub fn run(widget: Widget, provider: Option<&dyn DataProvider>, options: ViewOptions) -> Result<(), String> {
    let mut app = TuiApp::new(widget, options);

    terminal::enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {}", e))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| format!("failed to enter alternate screen: {}", e))?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend).map_err(|e| format!("failed to create terminal: {}", e))?;

    if let Some(provider) = provider {
        terminal
            .draw(|frame| app.draw(frame))
            .map_err(|e| format!("draw error: {}", e))?;
        // A failed load leaves the status as Failed; the view shows it
        let _ = app.widget.load(provider);
        app.refresh();
    }

    loop {
        let term_size = terminal
            .size()
            .map(|s| Rect::new(0, 0, s.width, s.height))
            .unwrap_or_default();
        // title + status + header (+ search row)
        let visible_rows = term_size.height.saturating_sub(2 + app.grid_chrome()) as usize;
        app.ensure_visible(visible_rows, term_size.width);

        terminal
            .draw(|frame| app.draw(frame))
            .map_err(|e| format!("draw error: {}", e))?;

        let timeout = app
            .widget
            .next_tick_in(Instant::now())
            .map_or(FRAME, |due| due.min(FRAME));
        if event::poll(timeout).map_err(|e| format!("event poll error: {}", e))? {
            if let Event::Key(key) = event::read().map_err(|e| format!("event read error: {}", e))? {
                if key.kind == KeyEventKind::Press {
                    if app.show_help {
                        app.show_help = false;
                    } else if let Some(command) = keys::map_key(app.mode(), key) {
                        app.handle(command, Instant::now());
                    }
                }
            }
        }
        app.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use replaygrid_engine::validation::{Column, ColumnKind};
    use tempfile::tempdir;

    fn app(export_dir: PathBuf) -> TuiApp {
        let widget = Widget::with_columns(
            vec![Column::new("Book", ColumnKind::Text), Column::new("Year", ColumnKind::Number)],
            vec![
                vec!["The Hobbit".into(), 1937i64.into()],
                vec!["Dune".into(), 1965i64.into()],
                vec!["Emma".into(), 1815i64.into()],
            ],
        )
        .with_replay_interval(Duration::from_millis(10));
        TuiApp::new(widget, ViewOptions { source: "test".into(), export_dir })
    }

    #[test]
    fn edit_flow_commits_typed_value() {
        let mut app = app(PathBuf::from("."));
        let now = Instant::now();
        app.handle(Command::Move { rows: 1, cols: 1 }, now);
        app.handle(Command::StartEdit, now);
        assert_eq!(app.mode(), Mode::Editing);
        assert_eq!(app.editor.as_deref(), Some("1965"));

        app.handle(Command::EditBackspace, now);
        app.handle(Command::EditInput('6'), now);
        app.handle(Command::CommitEdit, now);

        assert_eq!(app.mode(), Mode::Browse);
        assert_eq!(app.view.rows[1][1], "1966");
    }

    #[test]
    fn cursor_stops_at_last_header_column() {
        let widget = Widget::with_columns(
            vec![Column::new("Book", ColumnKind::Text), Column::new("Year", ColumnKind::Number)],
            vec![vec!["Dune".into(), 1965i64.into(), "extra".into()]],
        );
        let mut app = TuiApp::new(widget, ViewOptions { source: "test".into(), export_dir: PathBuf::from(".") });
        let now = Instant::now();
        assert_eq!(app.view.num_cols(), 3);

        app.handle(Command::Move { rows: 0, cols: 5 }, now);
        assert_eq!(app.cursor_col, 1);
        app.handle(Command::Sort, now);
        assert!(app.notice.is_none(), "notice: {:?}", app.notice);
        assert_eq!(app.widget.state().sort.map(|s| s.column), Some(1));
    }

    #[test]
    fn invalid_value_keeps_editor_open() {
        let mut app = app(PathBuf::from("."));
        let now = Instant::now();
        app.handle(Command::Move { rows: 0, cols: 1 }, now);
        app.handle(Command::StartEdit, now);
        app.handle(Command::EditInput('x'), now);
        app.handle(Command::CommitEdit, now);

        assert_eq!(app.mode(), Mode::Editing);
        assert_eq!(app.editor.as_deref(), Some("1937x"));
        assert!(app.notice.as_deref().unwrap_or("").contains("is not a number"));
    }

    #[test]
    fn search_filters_cursor_column() {
        let mut app = app(PathBuf::from("."));
        let now = Instant::now();
        app.handle(Command::ToggleSearch, now);
        assert_eq!(app.mode(), Mode::Searching);
        app.handle(Command::SearchInput('m'), now);
        assert_eq!(app.view.num_rows(), 1);
        assert_eq!(app.view.rows[0][0], "Emma");

        app.handle(Command::ToggleSearch, now);
        assert_eq!(app.mode(), Mode::Browse);
        assert_eq!(app.view.num_rows(), 3);
        assert!(app.needle.is_empty());
    }

    #[test]
    fn replay_without_changes_warns() {
        let mut app = app(PathBuf::from("."));
        app.handle(Command::Replay, Instant::now());
        assert_eq!(app.notice.as_deref(), Some(replaygrid_engine::widget::NO_HISTORY_WARNING));
        assert_eq!(app.mode(), Mode::Browse);
    }

    #[test]
    fn replay_runs_through_ticks() {
        let mut app = app(PathBuf::from("."));
        let start = Instant::now();
        app.handle(Command::Sort, start);
        app.handle(Command::Replay, start);
        assert_eq!(app.mode(), Mode::Replaying);
        // Snapshot first: back to load order
        assert!(app.tick(start + Duration::from_millis(10)));
        assert_eq!(app.view.rows[0][0], "The Hobbit");
        assert!(app.tick(start + Duration::from_millis(20)));
        assert_eq!(app.view.rows[0][0], "Dune");
        assert_eq!(app.mode(), Mode::Browse);
        assert_eq!(app.notice.as_deref(), Some("Replay finished"));
    }

    #[test]
    fn quit_tears_down() {
        let mut app = app(PathBuf::from("."));
        app.handle(Command::Quit, Instant::now());
        assert!(app.should_quit);
        assert!(!app.widget.is_mounted());
    }

    #[test]
    fn export_writes_into_export_dir() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path().to_path_buf());
        app.handle(Command::ExportCsv, Instant::now());
        let content = std::fs::read_to_string(dir.path().join("data.csv")).unwrap();
        assert!(content.starts_with("\"The Hobbit\",\"1937\"\n"));
        assert!(app.notice.as_deref().unwrap_or("").starts_with("Exported 3 rows"));
    }
}
