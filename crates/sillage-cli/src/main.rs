use facet::Facet;
use figue as args;
use sillage::types::TransactionOp;
use sillage::{BrowserTracingOptions, parse_cursor_advance};

mod recording;

use recording::{ReplayOptions, parse_recording, replay};

const DEFAULT_OP: &str = "pageload";
const DEFAULT_NAME: &str = "/";

#[derive(Facet, Debug)]
struct Cli {
    #[facet(flatten)]
    builtins: args::FigueBuiltins,
    #[facet(args::subcommand)]
    command: Command,
}

#[derive(Facet, Debug)]
#[repr(u8)]
enum Command {
    /// Replay a recorded timeline and print the resulting transaction as JSON.
    Project {
        #[facet(args::named)]
        recording: String,
        #[facet(args::named, default)]
        op: Option<String>,
        #[facet(args::named, default)]
        name: Option<String>,
        /// Transaction start in seconds since the Unix epoch.
        #[facet(args::named, default)]
        start: Option<f64>,
        /// `past-end` or `reexamine-last`.
        #[facet(args::named, default)]
        cursor_advance: Option<String>,
        #[facet(args::named, default)]
        no_vitals: bool,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let figue_config = args::builder::<Cli>()
        .map_err(|e| format!("failed to build CLI schema: {e}"))?
        .cli(|cli| cli.strict())
        .help(|h| {
            h.program_name("sillage")
                .description("Replay recorded performance timelines into traces")
                .version(option_env!("CARGO_PKG_VERSION").unwrap_or("dev"))
        })
        .build();
    let cli = args::Driver::new(figue_config)
        .run()
        .into_result()
        .map_err(|e| e.to_string())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.value.command {
        Command::Project {
            recording,
            op,
            name,
            start,
            cursor_advance,
            no_vitals,
        } => run_project(recording, op, name, start, cursor_advance, no_vitals),
    }
}

fn run_project(
    recording_path: String,
    op: Option<String>,
    name: Option<String>,
    start: Option<f64>,
    cursor_advance: Option<String>,
    no_vitals: bool,
) -> Result<(), String> {
    let json = std::fs::read_to_string(&recording_path)
        .map_err(|e| format!("read recording {recording_path}: {e}"))?;
    let recording = parse_recording(&json)?;

    // Flags win over SILLAGE_* environment variables.
    let mut tracing_options = BrowserTracingOptions::from_env();
    if let Some(value) = cursor_advance {
        tracing_options.cursor_advance = parse_cursor_advance(&value).ok_or_else(|| {
            format!("unknown cursor advance {value:?}; expected `past-end` or `reexamine-last`")
        })?;
    }
    if no_vitals {
        tracing_options.track_vitals = false;
    }

    let options = ReplayOptions {
        name: name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
        op: TransactionOp::from(op.as_deref().unwrap_or(DEFAULT_OP)),
        start,
        tracing: tracing_options,
    };
    let transaction = replay(recording, options);

    println!(
        "{}",
        facet_json::to_string_pretty(&transaction)
            .map_err(|e| format!("encode transaction: {e}"))?
    );
    Ok(())
}
