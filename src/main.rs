//! Purpose: `novelfetch` CLI entry point.
//! Role: Binary crate root; parses args, builds the instrumented client, emits JSON on stdout.
//! Invariants: Results go to stdout; debug events, logs, and errors go to stderr.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::error::Error as StdError;
use std::io::{self, IsTerminal};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod color_json;
mod command_dispatch;
mod debug_output;

use color_json::{JsonStyle, paint, render_json};
use debug_output::{DebugMode, StderrSink};
use novelfetch::api::{
    ClientOptions, DEFAULT_BASE_URL, Error, ErrorKind, InstrumentedClient, PayloadShape,
    StatusPolicy, to_exit_code,
};

const BASE_URL_ENV: &str = "NOVELFETCH_BASE_URL";

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Try `novelfetch --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    init_tracing();
    let color_mode = cli.color;
    let client = build_client(&cli).map_err(|err| (err, color_mode))?;

    command_dispatch::dispatch_command(cli.command, &client, color_mode)
        .map_err(add_transport_hint)
        .map_err(|err| (err, color_mode))
}

fn build_client(cli: &Cli) -> Result<InstrumentedClient, Error> {
    let base_url = cli
        .base_url
        .clone()
        .or_else(|| std::env::var(BASE_URL_ENV).ok())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let mut options = ClientOptions::new();
    if cli.serialized {
        options = options.with_payload_shape(PayloadShape::Serialized);
    }
    if cli.resolve_errors {
        options = options.with_status_policy(StatusPolicy::Resolve);
    }
    let use_color = cli.color.use_color(io::stderr().is_terminal());
    if let Some(sink) = StderrSink::new(cli.debug, use_color) {
        options = options.with_sink(Arc::new(sink));
    }
    InstrumentedClient::with_options(&base_url, options)
}

#[derive(Parser)]
#[command(
    name = "novelfetch",
    version,
    about = "Instrumented client for the novel/series download backend",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Every call prints the backend's JSON response on stdout.
Use --debug text|json to trace each request on stderr."#,
    after_help = r#"EXAMPLES
  $ novelfetch novel search 魔法 --page 2
  $ novelfetch --debug text novel info 12345
  $ novelfetch series download 6789 --mode merge
  $ NOVELFETCH_BASE_URL=http://10.0.0.2:8000 novelfetch service version
  $ novelfetch request --method GET /config/info"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        help = "Backend base address (default: $NOVELFETCH_BASE_URL or http://127.0.0.1:8000)"
    )]
    base_url: Option<String>,
    #[arg(
        long,
        default_value = "off",
        value_enum,
        help = "Trace requests on stderr: off|text|json"
    )]
    debug: DebugMode,
    #[arg(
        long,
        help = "Hand debug payloads to the sink as pretty-printed JSON strings"
    )]
    serialized: bool,
    #[arg(
        long,
        help = "Print non-2xx response bodies as results instead of failing"
    )]
    resolve_errors: bool,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics and pretty JSON output: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SeriesModeCli {
    Split,
    Merge,
}

#[derive(Subcommand)]
enum Command {
    #[command(arg_required_else_help = true, about = "Search, inspect, and download novels")]
    Novel {
        #[command(subcommand)]
        command: NovelCommand,
    },
    #[command(arg_required_else_help = true, about = "Inspect and download novel series")]
    Series {
        #[command(subcommand)]
        command: SeriesCommand,
    },
    #[command(arg_required_else_help = true, about = "Query backend service endpoints")]
    Service {
        #[command(subcommand)]
        command: ServiceCommand,
    },
    #[command(about = "Send one instrumented request to a path or absolute URL")]
    Request {
        #[arg(long, default_value = "GET", help = "HTTP method")]
        method: String,
        #[arg(help = "Path relative to the base address, or an absolute http(s) URL")]
        target: String,
    },
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum NovelCommand {
    #[command(about = "Search novels by keyword")]
    Search {
        keyword: String,
        #[arg(long, default_value_t = 1, help = "Result page (1-based)")]
        page: u32,
    },
    #[command(about = "Show novel metadata")]
    Info { id: String },
    #[command(about = "Show novel text")]
    Content { id: String },
    #[command(about = "Print the download URL for a novel")]
    Download {
        id: String,
        #[arg(long, default_value = "txt", help = "Download format")]
        format: String,
    },
}

#[derive(Subcommand)]
enum SeriesCommand {
    #[command(about = "Show series metadata")]
    Info { id: String },
    #[command(about = "List the novel ids in a series")]
    Content { id: String },
    #[command(about = "Print the download URL for a series")]
    Download {
        id: String,
        #[arg(long, default_value = "split", value_enum, help = "split|merge")]
        mode: SeriesModeCli,
    },
}

#[derive(Subcommand)]
enum ServiceCommand {
    #[command(about = "Show the backend welcome message")]
    Welcome,
    #[command(about = "Show the latest released version")]
    Version,
    #[command(about = "Show the backend configuration")]
    Config,
    #[command(about = "Fetch a URL through the backend proxy")]
    ProxyTest { url: String },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_json(value: &Value, color_mode: ColorMode) {
    let use_color = color_mode.use_color(io::stdout().is_terminal());
    println!("{}", render_json(value, JsonStyle::colored(use_color)));
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn add_transport_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Transport || err.hint().is_some() {
        return err;
    }
    err.with_hint(format!(
        "Is the backend running? Set --base-url or ${BASE_URL_ENV} to point at it."
    ))
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Transport => "transport error".to_string(),
        ErrorKind::Status => "request failed".to_string(),
        ErrorKind::Decode => "invalid response".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(url) = err.url() {
        inner.insert("url".to_string(), json!(url));
    }
    if let Some(status) = err.status() {
        inner.insert("status".to_string(), json!(status));
    }
    if let Some(payload) = err.payload() {
        inner.insert("payload".to_string(), payload.clone());
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = vec![format!(
        "{} {}",
        paint("error:", "31", use_color),
        error_message(err)
    )];
    if let Some(status) = err.status() {
        lines.push(format!("{} {status}", paint("status:", "33", use_color)));
    }
    if let Some(url) = err.url() {
        lines.push(format!("{} {url}", paint("url:", "33", use_color)));
    }
    for cause in error_causes(err) {
        lines.push(format!("{} {cause}", paint("caused by:", "33", use_color)));
    }
    if let Some(hint) = err.hint() {
        lines.push(format!("{} {hint}", paint("hint:", "33", use_color)));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
