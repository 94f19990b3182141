use std::env;
use std::io::{self, Stdout};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};

use sqlbridge::app::{App, AppExit};
use sqlbridge::config::{self, Config};
use sqlbridge::{init_query_editor_with_config, logging, Document, Vocabulary};

const FORM_ID: &str = "query-form";
const FIELD_ID: &str = "query";
const EDITOR_ID: &str = "query-editor";

fn print_version() {
    println!("sqlbridge {}", env!("CARGO_PKG_VERSION"));
}

fn print_usage() {
    eprintln!("sqlbridge - SQL editor bound to a submittable form field");
    eprintln!();
    eprintln!("Usage: sqlbridge [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -h, --help            Print this help message");
    eprintln!("  -V, --version         Print version information");
    eprintln!("      --schema <FILE>   JSON vocabulary: {{\"table\": [\"field\", ...]}}");
    eprintln!("      --query <SQL>     Initial value of the query field");
    eprintln!("      --config <FILE>   Use this config file instead of the default");
    eprintln!();
    eprintln!("Environment Variables:");
    eprintln!("  SQLBRIDGE_CONFIG_DIR  Config directory override");
    eprintln!("  {:<20}  Log filter (default: warn)", logging::LOG_ENV);
    eprintln!();
    eprintln!("Configuration:");
    if let Some(path) = config::config_path() {
        eprintln!("  Config file: {}", path.display());
    }
    if let Some(path) = config::log_path() {
        eprintln!("  Log file:    {}", path.display());
    }
    eprintln!();
    eprintln!("On submit (Ctrl+S) the form is printed as name=value lines.");
}

#[derive(Debug, Default)]
struct Args {
    schema: Option<PathBuf>,
    query: Option<String>,
    config: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args::default();
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .with_context(|| format!("{} requires a value", flag))
        };
        match arg.as_str() {
            "--schema" => parsed.schema = Some(PathBuf::from(value("--schema")?)),
            "--query" => parsed.query = Some(value("--query")?),
            "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
            other => bail!("Unknown argument: {} (see --help)", other),
        }
    }

    Ok(parsed)
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        return Ok(());
    }
    if args.iter().any(|a| a == "-V" || a == "--version") {
        print_version();
        return Ok(());
    }

    let args = parse_args(&args)?;

    if let Err(e) = logging::init() {
        eprintln!("Warning: Failed to set up logging: {}", e);
    }

    let cfg = match &args.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config().unwrap_or_else(|e| {
            warn!("failed to load config: {:#}", e);
            eprintln!("Warning: Failed to load config: {}", e);
            Config::default()
        }),
    };

    let vocabulary = args
        .schema
        .as_deref()
        .map(Vocabulary::load)
        .transpose()
        .context("failed to load schema vocabulary")?;

    let mut document = Document::new();
    let form = document.add_form(FORM_ID);
    document.add_container(EDITOR_ID);
    let field = document.add_field(
        FIELD_ID,
        FIELD_ID,
        args.query.as_deref().unwrap_or(""),
        Some(&form),
    );
    let editor = init_query_editor_with_config(&document, EDITOR_ID, FIELD_ID, vocabulary, &cfg)?;

    let mut terminal =
        init_terminal().context("failed to initialize terminal; are you running in a real TTY?")?;

    let mut app = App::new(editor, field, cfg);
    let res = app.run(&mut terminal);

    restore_terminal(terminal)?;

    match res? {
        AppExit::Submitted(submission) => {
            info!(fields = submission.entries().len(), "form submitted");
            print!("{}", submission);
        }
        AppExit::Quit => info!("left without submitting"),
    }
    Ok(())
}

fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        std::iter::once("sqlbridge")
            .chain(items.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args() {
        let args = parse_args(&argv(&["--schema", "s.json", "--query", "SELECT 1"])).unwrap();
        assert_eq!(args.schema, Some(PathBuf::from("s.json")));
        assert_eq!(args.query.as_deref(), Some("SELECT 1"));
        assert!(args.config.is_none());
    }

    #[test]
    fn test_parse_args_missing_value() {
        let err = parse_args(&argv(&["--schema"])).unwrap_err();
        assert!(err.to_string().contains("--schema requires a value"));
    }

    #[test]
    fn test_parse_args_unknown_flag() {
        assert!(parse_args(&argv(&["--bogus"])).is_err());
    }
}
