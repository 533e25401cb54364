//! Purpose: `qcoerce` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Commands emit stable stdout formats (compact JSON when piped, pretty on a TTY).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `query_coerce::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::io::{self, IsTerminal, Read};

use clap::error::ErrorKind as ClapErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use url::Url;

mod color_json;
mod command_dispatch;
mod serve;

use color_json::colorize_value;
use query_coerce::json::{UndefinedMode, from_json};
use query_coerce::{Error, ErrorKind, Policy, to_exit_code};

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
    let cli = match Cli::try_parse_from(std::env::args_os()) {
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
                let message = clap_error_summary(&err);
                let hint = clap_error_hint(&err);
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(message)
                        .with_hint(hint),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    command_dispatch::dispatch_command(cli.command, color_mode)
        .map_err(add_io_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "qcoerce",
    version,
    about = "Coerce stringly-typed query parameters into native JSON scalars",
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
    before_help = r#"Query strings carry only text. qcoerce turns literals into scalars:
  - "true"/"false" become booleans
  - "null" and "undefined" become markers
  - numeric literals become numbers (NaN stays text)
"#,
    after_help = r#"EXAMPLES
  $ qcoerce coerce 'id=42&active=true&tags=1&tags=x'
  # {"id":42,"active":true,"tags":[1,"x"]}
  $ echo '{"a":{"b":"42"}}' | qcoerce coerce --json
  $ qcoerce serve --bind 127.0.0.1:9780

LEARN MORE
  $ qcoerce <command> --help"#,
    arg_required_else_help = true,
    disable_help_subcommand = false
)]
struct Cli {
    #[arg(
        long,
        global = true,
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

/// Rendering of undefined markers in emitted JSON.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum UndefinedModeCli {
    Stringify,
    Null,
    Reject,
}

impl From<UndefinedModeCli> for UndefinedMode {
    fn from(value: UndefinedModeCli) -> Self {
        match value {
            UndefinedModeCli::Stringify => UndefinedMode::Stringify,
            UndefinedModeCli::Null => UndefinedMode::Null,
            UndefinedModeCli::Reject => UndefinedMode::Reject,
        }
    }
}

#[derive(Args, Clone, Copy, Debug, Default)]
struct PolicyArgs {
    #[arg(long, help = "Keep \"true\"/\"false\" as strings")]
    no_boolean: bool,
    #[arg(long, help = "Keep \"null\" as a string")]
    no_null: bool,
    #[arg(long, help = "Keep numeric literals as strings")]
    no_number: bool,
    #[arg(long, help = "Keep \"undefined\" as a string")]
    no_undefined: bool,
}

impl From<PolicyArgs> for Policy {
    fn from(args: PolicyArgs) -> Self {
        Policy::default()
            .with_boolean(!args.no_boolean)
            .with_null(!args.no_null)
            .with_number(!args.no_number)
            .with_undefined(!args.no_undefined)
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Coerce a query string (or JSON document) and print the result",
        long_about = r#"Decode a query string, coerce its values, and print JSON.

Reads QUERY from the argument, or from stdin when omitted. A leading `?` is
ignored and full http(s) URLs contribute their query component. With --json the
input is a JSON document whose string leaves are coerced instead."#,
        after_help = r#"EXAMPLES
  $ qcoerce coerce 'user[age]=25&user[admin]=false'
  $ qcoerce coerce 'https://example.com/search?page=2&exact=true'
  $ qcoerce coerce --no-number 'zip=02134'
  $ qcoerce coerce --undefined null 'a=undefined'
  $ echo '["1","true","null","x"]' | qcoerce coerce --json

NOTES
  - Undefined markers are omitted from objects and print as null in arrays
    (override with --undefined null|reject)
  - A top-level JSON null is rejected (exit 3)"#
    )]
    Coerce {
        #[arg(help = "Query string or URL (reads stdin when omitted)")]
        input: Option<String>,
        #[arg(long, help = "Treat the input as a JSON document")]
        json: bool,
        #[command(flatten)]
        policy: PolicyArgs,
        #[arg(
            long,
            value_enum,
            default_value = "stringify",
            help = "How undefined markers are written: stringify|null|reject"
        )]
        undefined: UndefinedModeCli,
        #[arg(long, help = "Pretty-print even when stdout is not a TTY")]
        pretty: bool,
    },
    #[command(
        about = "Run an HTTP echo server that returns each request's coerced query",
        long_about = r#"Run a small HTTP server with query coercion installed.

GET /healthz answers {"ok":true}. Every other path and method answers
{"query": ...} with the coerced query of that request.
Logging honours RUST_LOG (default: info)."#,
        after_help = r#"EXAMPLES
  $ qcoerce serve
  $ curl 'http://127.0.0.1:9780/anything?n=1&flag=true'
  $ qcoerce serve --bind 0.0.0.0:9780 --allow-non-loopback --no-null"#
    )]
    Serve {
        #[arg(long, default_value = "127.0.0.1:9780", help = "Address to listen on")]
        bind: String,
        #[arg(long, help = "Allow binding to a non-loopback address")]
        allow_non_loopback: bool,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    #[command(
        about = "Print version info as JSON",
        long_about = r#"Emit version info as JSON (stable, machine-readable)."#,
        after_help = r#"EXAMPLES
  $ qcoerce version"#
    )]
    Version,
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completions",
        long_about = r#"Generate shell completion scripts.

Prints a completion script for the given shell to stdout."#,
        after_help = r#"EXAMPLES
  $ qcoerce completion bash > ~/.local/share/bash-completion/completions/qcoerce
  $ qcoerce completion zsh > ~/.zfunc/_qcoerce
  $ qcoerce completion fish > ~/.config/fish/completions/qcoerce.fish"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn read_stdin() -> Result<String, Error> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read stdin")
            .with_source(err)
    })?;
    Ok(buf)
}

/// Strips the decorations people paste along with a query string.
fn query_component(input: &str) -> Result<String, Error> {
    let trimmed = input.trim_end_matches(['\n', '\r']).trim_start();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        let url = Url::parse(trimmed).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message("invalid URL")
                .with_hint("Pass a bare query string like `a=1&b=true` or a full http(s) URL.")
                .with_source(err)
        })?;
        return Ok(url.query().unwrap_or_default().to_string());
    }
    Ok(trimmed.strip_prefix('?').unwrap_or(trimmed).to_string())
}

fn add_io_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Io || err.hint().is_some() {
        return err;
    }
    err.with_hint("Check that stdin is readable and the address is free.")
}

fn emit_version_output(color_mode: ColorMode) {
    if io::stdout().is_terminal() {
        println!("qcoerce {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(
            json!({
                "name": "qcoerce",
                "version": env!("CARGO_PKG_VERSION"),
            }),
            color_mode,
        );
    }
}

fn emit_json(value: Value, color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let use_color = color_mode.use_color(is_tty);
    let pretty = is_tty || use_color;
    let json = if pretty {
        colorize_value(&from_json(value), UndefinedMode::Stringify, use_color)
    } else {
        serde_json::to_string(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    };
    println!("{json}");
}

/// Prints a coerced tree; `rendered` must already be checked against `mode`.
fn emit_coerced(
    value: &query_coerce::Value,
    rendered: &Value,
    mode: UndefinedMode,
    pretty: bool,
    color_mode: ColorMode,
) {
    let is_tty = io::stdout().is_terminal();
    let use_color = color_mode.use_color(is_tty);
    let text = if pretty || is_tty || use_color {
        colorize_value(value, mode, use_color)
    } else {
        serde_json::to_string(rendered)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    };
    println!("{text}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::InvalidInput => "invalid input".to_string(),
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
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
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

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);

    let Some(usage) = usage else {
        return "Try `qcoerce --help`.".to_string();
    };

    let tokens: Vec<&str> = usage.split_whitespace().collect();
    let Some(pos) = tokens.iter().position(|t| *t == "qcoerce") else {
        return "Try `qcoerce --help`.".to_string();
    };

    let parts: Vec<&str> = tokens
        .iter()
        .skip(pos + 1)
        .take_while(|token| {
            !(token.starts_with('-') || token.starts_with('<') || token.starts_with('['))
        })
        .copied()
        .collect();

    if parts.is_empty() {
        return "Try `qcoerce --help`.".to_string();
    }
    format!("Try `qcoerce {} --help`.", parts.join(" "))
}
