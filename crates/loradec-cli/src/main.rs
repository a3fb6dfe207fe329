use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use glob::glob;
use loradec_core::{
    DeviceKind, DeviceRegistry, DeviceResolver, Port, RawPayload, decode_device,
    decode_uplinks_file,
};
use serde_json::json;
use tracing::{debug, warn};

mod config;

use config::Config;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("LORADEC_BUILD_COMMIT"),
    " ",
    env!("LORADEC_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "loradec")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder for LoRaWAN sensor uplink payloads (DHT22, BME280, CPU load).",
    long_about = None,
    after_help = "Examples:\n  loradec decode --device bme280 0709600960\n  loradec decode --device cpu-load --bytes 0,50\n  loradec batch uplinks.jsonl -o report.json --config devices.toml"
)]
struct Cli {
    /// Log debug details to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a single uplink payload and print the record as JSON.
    Decode(DecodeArgs),
    /// Decode a JSON Lines file of uplinks into a versioned JSON report.
    #[command(
        after_help = "Examples:\n  loradec batch uplinks.jsonl -o report.json\n  loradec batch 'captures/*.jsonl' --stdout --pretty"
    )]
    Batch(BatchArgs),
    /// List the supported layouts and their fields.
    Layouts {
        /// Print the layouts as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Layout identifier or a device id from the config file
    #[arg(short, long)]
    device: String,

    /// Hex-encoded payload (e.g. 0709600960)
    #[arg(required_unless_present = "bytes")]
    hex: Option<String>,

    /// Payload as comma-separated byte values (e.g. 7,9,96,9,96)
    #[arg(
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        conflicts_with = "hex"
    )]
    bytes: Option<Vec<i64>>,

    /// LoRaWAN application port of the uplink
    #[arg(short, long, default_value_t = 1, allow_hyphen_values = true)]
    port: i64,

    /// Device configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Path to a .jsonl or .ndjson uplink file
    input: PathBuf,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Device configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if any uplink failed to decode
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Decode(args) => cmd_decode(args),
        Commands::Batch(args) => cmd_batch(args),
        Commands::Layouts { json } => cmd_layouts(json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "loradec=debug" } else { "loradec=warn" };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default.to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

fn load_registry(path: Option<&PathBuf>) -> Result<DeviceRegistry, CliError> {
    match path {
        Some(path) => {
            let config = Config::load(path).map_err(|err| {
                CliError::new(
                    format!("{:#}", err),
                    Some("expected [[device]] entries with `id` and `layout`".to_string()),
                )
            })?;
            debug!(path = %path.display(), devices = config.devices.len(), "loaded config");
            Ok(config.registry())
        }
        None => Ok(DeviceRegistry::new()),
    }
}

fn layout_hint() -> Option<String> {
    let ids: Vec<_> = DeviceKind::ALL.iter().map(|kind| kind.id()).collect();
    Some(format!(
        "use one of: {} (or a device id from --config)",
        ids.join(", ")
    ))
}

fn cmd_decode(args: DecodeArgs) -> Result<(), CliError> {
    let registry = load_registry(args.config.as_ref())?;
    let kind = registry
        .resolve(&args.device)
        .map_err(|err| CliError::new(err.to_string(), layout_hint()))?;
    let port = Port::from_int(args.port).map_err(|err| CliError::new(err.to_string(), None))?;

    let payload = match (&args.bytes, &args.hex) {
        (Some(bytes), _) => RawPayload::from_ints(bytes.iter().copied()),
        (None, Some(hex)) => RawPayload::from_hex(hex),
        (None, None) => {
            return Err(CliError::new(
                "missing payload",
                Some("pass a hex payload or --bytes".to_string()),
            ));
        }
    }
    .map_err(|err| CliError::new(err.to_string(), None))?;

    debug!(device = %args.device, layout = kind.id(), %port, len = payload.len(), "decoding payload");
    let record = decode_device(kind, &payload, port).map_err(|err| {
        CliError::new(
            err.to_string(),
            Some(format!(
                "layout '{}' needs at least {} bytes",
                kind.id(),
                kind.layout().min_len()
            )),
        )
    })?;

    let json = to_json(&record, args.pretty)?;
    println!("{}", json);
    Ok(())
}

fn cmd_batch(args: BatchArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;
    let report = if args.stdout { None } else { args.report.clone() };
    if let Some(report_path) = report.as_ref() {
        check_report_differs(report_path, &input_abs)?;
    }

    let registry = load_registry(args.config.as_ref())?;
    let rep = decode_uplinks_file(&resolved_input, &registry).context("uplink decoding failed")?;
    log_entries(&rep);
    let json = to_json(&rep, args.pretty && !args.compact)?;
    let failed = rep.summary.failed;

    match report {
        None => println!("{}", json),
        Some(report) => {
            if let Some(parent) = report.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&report, json)
                .with_context(|| format!("Failed to write report: {}", report.display()))?;
            if !args.quiet {
                eprintln!("OK: report written -> {}", report.display());
            }
        }
    }

    if args.strict && failed > 0 {
        return Err(CliError::new(
            format!("{} uplink(s) failed to decode", failed),
            Some("inspect the `error` entries in the report".to_string()),
        ));
    }
    Ok(())
}

fn log_entries(rep: &loradec_core::Report) {
    for entry in &rep.uplinks {
        match (&entry.record, &entry.error) {
            (_, Some(error)) => warn!(line = entry.line, %error, "uplink rejected"),
            (Some(_), None) => debug!(
                line = entry.line,
                layout = entry.layout.as_deref().unwrap_or("-"),
                "uplink decoded"
            ),
            (None, None) => {}
        }
    }
}

fn cmd_layouts(as_json: bool) -> Result<(), CliError> {
    if as_json {
        let layouts: Vec<_> = DeviceKind::ALL
            .iter()
            .map(|kind| {
                let layout = kind.layout();
                json!({
                    "id": kind.id(),
                    "min_len": layout.min_len(),
                    "fields": layout.fields.iter().map(|field| json!({
                        "name": field.name,
                        "offset": field.offset,
                        "width": field.codec.width(),
                        "codec": field.codec.to_string(),
                    })).collect::<Vec<_>>(),
                })
            })
            .collect();
        let json = to_json(&layouts, true)?;
        println!("{}", json);
        return Ok(());
    }

    for kind in DeviceKind::ALL {
        let layout = kind.layout();
        println!("{} ({} bytes)", kind.id(), layout.min_len());
        for field in layout.fields {
            println!(
                "  {:<10} @{:<2} {}",
                field.name, field.offset, field.codec
            );
        }
    }
    Ok(())
}

fn check_report_differs(report: &Path, input_abs: &Path) -> Result<(), CliError> {
    let parent = match report.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let (Ok(dir), Some(name)) = (fs::canonicalize(parent), report.file_name()) else {
        return Ok(());
    };
    if dir.join(name) == input_abs {
        return Err(CliError::new(
            format!("report path must differ from input: {}", report.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

const INPUT_EXTENSIONS: [&str; 2] = ["jsonl", "ndjson"];

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    Ok(json.context("JSON serialization failed")?)
}

fn input_hint() -> Option<String> {
    Some(format!("expected a .{} file", INPUT_EXTENSIONS.join(" or .")))
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    match fs::metadata(input) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => {
            return Err(CliError::new(
                format!("input is not a file: {}", input.display()),
                input_hint(),
            ));
        }
        Err(err) => {
            return Err(CliError::new(
                format!("input file not found: {} ({})", input.display(), err),
                input_hint(),
            ));
        }
    }
    let supported = input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            INPUT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        });
    if !supported {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            input_hint(),
        ));
    }
    Ok(())
}

/// Expands a glob pattern to the single uplink file it must match.
fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !pattern.contains(['*', '?', '[']) {
        return Ok(input.to_path_buf());
    }
    let pattern_error = |detail: String| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", detail)),
        )
    };

    let mut matches = Vec::new();
    for entry in glob(&pattern).map_err(|err| pattern_error(err.msg.to_string()))? {
        let path = entry.map_err(|err| pattern_error(err.to_string()))?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let listed: Vec<_> = matches
                .iter()
                .take(3)
                .map(|path| path.display().to_string())
                .collect();
            let more = if count > 3 { ", ..." } else { "" };
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches): {}{}",
                    pattern,
                    count,
                    listed.join(", "),
                    more
                ),
                Some("pass a single uplink file, or run once per file".to_string()),
            ))
        }
    }
}
