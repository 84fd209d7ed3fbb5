// rgrid - editable table with a replayable state log
// `view` is interactive; `export`, `replay` and `headers` are headless

mod exit_codes;
mod tui;
mod util;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode, WriteLogger};

use replaygrid_config::Settings;
use replaygrid_engine::script::{parse_script, run_script};
use replaygrid_engine::source::DataProvider;
use replaygrid_engine::validation::ColumnKind;
use replaygrid_engine::{GridError, Widget};
use replaygrid_io::provider::{FileProvider, HttpProvider};
use replaygrid_io::ExportFormat;

use exit_codes::{
    grid_exit_code, EXIT_DATA_IO, EXIT_DATA_PARSE, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "rgrid")]
#[command(about = "Editable table with a replayable history of every change")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Settings file (default: <config dir>/replaygrid/settings.json)
    #[arg(long, global = true, env = "RGRID_CONFIG")]
    config: Option<PathBuf>,

    /// Log verbosity
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Log file for `view` (default: rgrid.log next to the settings file)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive table
    #[command(after_help = "\
Keys:
  arrows / hjkl   move          s        sort (again: reverse)
  e / Enter       edit cell     Enter    save    Esc  cancel
  /               search row    Tab      focus search row
  J / C           export data.json / data.csv
  Alt+Shift+R     replay every change since load
  q               quit

Examples:
  rgrid view
  rgrid view --data books.json
  rgrid view --url https://example.com/table.json --headers Title,Author,Year")]
    View {
        #[command(flatten)]
        source: SourceArgs,

        /// Column titles, comma-separated (overrides settings)
        #[arg(long, value_delimiter = ',')]
        headers: Option<Vec<String>>,

        /// Milliseconds between replayed changes (overrides settings)
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Load data, optionally sort and filter it, and export it
    #[command(after_help = "\
Examples:
  rgrid export --data books.json -t csv
  rgrid export --data books.json -t json -o sorted.json --sort Sales --desc
  rgrid export --data books.csv -t csv --where 'Author~tolkien'")]
    Export {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format
        #[arg(long, short = 't')]
        to: Format,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Sort by column (title or 1-based index)
        #[arg(long, value_name = "COL")]
        sort: Option<String>,

        /// Sort descending (requires --sort)
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Keep rows whose column contains TEXT (case-insensitive)
        #[arg(long, value_name = "COL~TEXT")]
        r#where: Option<String>,

        /// Column titles, comma-separated (overrides settings)
        #[arg(long, value_delimiter = ',')]
        headers: Option<Vec<String>>,
    },

    /// Apply a script of actions, then replay the recorded history
    #[command(after_help = "\
The script is a JSON array of actions:
  [{\"action\": \"sort\", \"column\": 4},
   {\"action\": \"edit\", \"record\": 0, \"column\": 1},
   {\"action\": \"save\", \"value\": \"Tolkien\"}]

Each replayed state is printed as a plain table.

Examples:
  rgrid replay --script session.json --data books.json --interval-ms 200")]
    Replay {
        /// JSON array of actions
        #[arg(long)]
        script: PathBuf,

        #[command(flatten)]
        source: SourceArgs,

        /// Milliseconds between replayed changes (overrides settings)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Column titles, comma-separated (overrides settings)
        #[arg(long, value_delimiter = ',')]
        headers: Option<Vec<String>>,
    },

    /// Print the configured column titles and kinds
    Headers,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Data file (.json array of arrays, or .csv/.tsv)
    #[arg(long, conflicts_with = "url")]
    data: Option<PathBuf>,

    /// Data URL returning a JSON array of arrays (default: settings `data.url`)
    #[arg(long)]
    url: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

impl From<Format> for ExportFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Json => ExportFormat::Json,
            Format::Csv => ExportFormat::Csv,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  replaygrid-engine ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let interactive = matches!(cli.command, Commands::View { .. });
    let result = init_logging(cli.log_level.into(), cli.log_file.clone(), interactive).and_then(|()| {
        let settings = match &cli.config {
            Some(path) => Settings::load_from(path),
            None => Settings::load(),
        };
        match cli.command {
            Commands::View { source, headers, interval_ms } => cmd_view(&settings, source, headers, interval_ms),
            Commands::Export { source, to, output, sort, desc, r#where, headers } => {
                cmd_export(&settings, source, to.into(), output, sort, desc, r#where, headers)
            }
            Commands::Replay { script, source, interval_ms, headers } => {
                cmd_replay(&settings, script, source, interval_ms, headers)
            }
            Commands::Headers => cmd_headers(&settings),
        }
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_DATA_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_DATA_PARSE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<GridError> for CliError {
    fn from(err: GridError) -> Self {
        let hint = match &err {
            GridError::NoHistoryToReplay => Some("add at least one action to the script".to_string()),
            GridError::DataLoadFailed(_) => Some("check --data / --url or `data.url` in settings".to_string()),
            _ => None,
        };
        Self { code: grid_exit_code(&err), message: err.to_string(), hint }
    }
}

// ============================================================================
// logging
// ============================================================================

/// The interactive view owns the terminal, so it logs to a file;
/// headless commands log to stderr.
fn init_logging(level: LevelFilter, log_file: Option<PathBuf>, interactive: bool) -> Result<(), CliError> {
    if level == LevelFilter::Off {
        return Ok(());
    }
    let config = ConfigBuilder::new()
        .add_filter_allow_str("replaygrid")
        .add_filter_allow_str("rgrid")
        .build();

    if interactive {
        let path = log_file.unwrap_or_else(|| Settings::config_path().with_file_name("rgrid.log"));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CliError::io(format!("cannot create {}: {}", parent.display(), e)))?;
        }
        let file = std::fs::File::create(&path)
            .map_err(|e| CliError::io(format!("cannot open log file {}: {}", path.display(), e)))?;
        WriteLogger::init(level, config, file).map_err(|e| CliError::general(e.to_string()))
    } else {
        TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)
            .map_err(|e| CliError::general(e.to_string()))
    }
}

// ============================================================================
// shared setup
// ============================================================================

fn provider_for(settings: &Settings, source: SourceArgs) -> Result<Box<dyn DataProvider>, CliError> {
    match (source.data, source.url) {
        (Some(path), _) => Ok(Box::new(FileProvider::new(path))),
        (None, url) => {
            let url = url.unwrap_or_else(|| settings.data_url.clone());
            let provider = HttpProvider::new(url).map_err(CliError::general)?;
            Ok(Box::new(provider))
        }
    }
}

/// Empty widget with the configured (or overridden) columns and cadence.
fn build_widget(settings: &Settings, headers: Option<Vec<String>>, interval_ms: Option<u64>) -> Widget {
    let widget = match headers {
        Some(headers) => Widget::new(headers, Vec::new()),
        None => match settings.columns() {
            Some(columns) => Widget::with_columns(columns, Vec::new()),
            None => Widget::new(settings.headers.clone(), Vec::new()),
        },
    };
    let interval = match interval_ms {
        Some(ms) => std::time::Duration::from_millis(ms.max(1)),
        None => settings.replay_interval(),
    };
    widget.with_replay_interval(interval)
}

/// Column by title (case-insensitive) or 1-based index.
fn resolve_column(widget: &Widget, name: &str) -> Result<usize, CliError> {
    let columns = widget.columns();
    if let Some(idx) = columns.iter().position(|c| c.title.eq_ignore_ascii_case(name.trim())) {
        return Ok(idx);
    }
    if let Ok(n) = name.trim().parse::<usize>() {
        if n >= 1 && n <= columns.len() {
            return Ok(n - 1);
        }
    }
    let available: Vec<&str> = columns.iter().map(|c| c.title.as_str()).collect();
    Err(CliError::usage(format!("unknown column: \"{}\"", name))
        .with_hint(format!("available columns: {}", available.join(", "))))
}

fn parse_where(expr: &str) -> Result<(&str, &str), CliError> {
    expr.split_once('~').ok_or_else(|| {
        CliError::usage(format!("invalid --where expression: \"{}\"", expr))
            .with_hint("use COL~TEXT, e.g. 'Author~tolkien'")
    })
}

// ============================================================================
// view
// ============================================================================

fn cmd_view(
    settings: &Settings,
    source: SourceArgs,
    headers: Option<Vec<String>>,
    interval_ms: Option<u64>,
) -> Result<(), CliError> {
    let label = match (&source.data, &source.url) {
        (Some(path), _) => path.display().to_string(),
        (None, Some(url)) => url.clone(),
        (None, None) => settings.data_url.clone(),
    };
    let provider = provider_for(settings, source)?;
    let widget = build_widget(settings, headers, interval_ms);
    let options = tui::ViewOptions {
        source: label,
        export_dir: settings.export_directory(),
    };
    tui::run(widget, Some(provider.as_ref()), options).map_err(CliError::general)
}

// ============================================================================
// export
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn cmd_export(
    settings: &Settings,
    source: SourceArgs,
    format: ExportFormat,
    output: Option<PathBuf>,
    sort: Option<String>,
    desc: bool,
    where_clause: Option<String>,
    headers: Option<Vec<String>>,
) -> Result<(), CliError> {
    let provider = provider_for(settings, source)?;
    let mut widget = build_widget(settings, headers, None);
    widget.load(provider.as_ref())?;

    if let Some(name) = sort {
        let column = resolve_column(&widget, &name)?;
        widget.sort(column)?;
        if desc {
            widget.sort(column)?;
        }
    }

    if let Some(expr) = where_clause {
        let (name, needle) = parse_where(&expr)?;
        let column = resolve_column(&widget, name)?;
        widget.toggle_search()?;
        widget.search(column, needle)?;
    }

    let data = widget.export_data();
    log::info!("exporting {} rows as {}", data.len(), format.extension());

    match output {
        Some(path) => replaygrid_io::export(&data, format, &path)
            .map_err(|e| CliError::io(format!("{}: {}", path.display(), e))),
        None => {
            let mut text = replaygrid_io::export_string(&data, format).map_err(CliError::io)?;
            if !text.ends_with('\n') {
                text.push('\n');
            }
            io::stdout()
                .lock()
                .write_all(text.as_bytes())
                .map_err(|e| CliError::io(e.to_string()))
        }
    }
}

// ============================================================================
// replay
// ============================================================================

fn cmd_replay(
    settings: &Settings,
    script: PathBuf,
    source: SourceArgs,
    interval_ms: Option<u64>,
    headers: Option<Vec<String>>,
) -> Result<(), CliError> {
    let text = std::fs::read_to_string(&script)
        .map_err(|e| CliError::io(format!("{}: {}", script.display(), e)))?;
    let actions = parse_script(&text).map_err(|e| CliError::parse(format!("{}: {}", script.display(), e)))?;

    let provider = provider_for(settings, source)?;
    let mut widget = build_widget(settings, headers, interval_ms);
    widget.load(provider.as_ref())?;

    run_script(&mut widget, &actions).map_err(|e| {
        let mut err = CliError::from(e.error.clone());
        err.message = format!("{}: {}", script.display(), e);
        err
    })?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut now = Instant::now();
    widget.start_replay(now)?;

    while widget.is_replaying() {
        let wait = widget.next_tick_in(now).unwrap_or_default();
        std::thread::sleep(wait);
        now += wait;
        if widget.tick(now) == 0 {
            continue;
        }
        let (applied, total) = widget.replay_progress().unwrap_or((widget.history().len(), widget.history().len()));
        let view = tui::view::TableView::from_widget(&widget);
        writeln!(out, "# state {}/{}", applied, total).map_err(|e| CliError::io(e.to_string()))?;
        write!(out, "{}", view.render_plain()).map_err(|e| CliError::io(e.to_string()))?;
        writeln!(out).map_err(|e| CliError::io(e.to_string()))?;
    }

    Ok(())
}

// ============================================================================
// headers
// ============================================================================

fn kind_name(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Any => "any",
        ColumnKind::Text => "text",
        ColumnKind::Number => "number",
    }
}

fn cmd_headers(settings: &Settings) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let columns = settings.columns();
    for (idx, title) in settings.headers.iter().enumerate() {
        let kind = match &columns {
            Some(columns) => columns.get(idx).map(|c| kind_name(c.kind)).unwrap_or("any"),
            None => "inferred",
        };
        writeln!(out, "{}\t{}\t{}", idx + 1, title, kind).map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Widget {
        Widget::new(vec!["Book".into(), "Author".into()], Vec::new())
    }

    #[test]
    fn resolve_column_by_title_or_index() {
        let w = widget();
        assert_eq!(resolve_column(&w, "author").unwrap(), 1);
        assert_eq!(resolve_column(&w, "1").unwrap(), 0);
        let err = resolve_column(&w, "Year").unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
        assert_eq!(err.hint.as_deref(), Some("available columns: Book, Author"));
        assert!(resolve_column(&w, "3").is_err());
    }

    #[test]
    fn parse_where_splits_on_tilde() {
        assert_eq!(parse_where("Author~tolkien").unwrap(), ("Author", "tolkien"));
        assert_eq!(parse_where("Book~").unwrap(), ("Book", ""));
        assert_eq!(parse_where("Author=x").unwrap_err().code, EXIT_USAGE);
    }

    #[test]
    fn build_widget_prefers_override_headers() {
        let settings = Settings::default();
        let w = build_widget(&settings, Some(vec!["A".into()]), Some(5));
        assert_eq!(w.columns().len(), 1);
        assert_eq!(w.replay_interval(), std::time::Duration::from_millis(5));

        let w = build_widget(&settings, None, None);
        assert_eq!(w.columns().len(), 5);
        assert_eq!(w.replay_interval(), std::time::Duration::from_millis(1000));
    }

    #[test]
    fn grid_errors_keep_their_exit_codes() {
        let err = CliError::from(GridError::NoHistoryToReplay);
        assert_eq!(err.code, exit_codes::EXIT_REPLAY_EMPTY);
        assert!(err.hint.is_some());
    }
}
