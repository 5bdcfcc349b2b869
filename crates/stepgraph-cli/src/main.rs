use futures::executor::block_on;
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::sync::mpsc;
use stepgraph::{
    Engine, EngineConfig, Highlight, IngestOptions, PlaybackController, RankDir, StepChanged,
    Trace, TraceGraph,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Trace(stepgraph::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Trace(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<stepgraph::Error> for CliError {
    fn from(value: stepgraph::Error) -> Self {
        Self::Trace(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    Detect,
    #[default]
    Ingest,
    Layout,
    Replay,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    strict: bool,
    direction: Option<RankDir>,
    config: Option<String>,
    step: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOut<'a> {
    #[serde(flatten)]
    graph: &'a TraceGraph,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout_error: Option<String>,
    errors: &'a [stepgraph::TraceFormatError],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StepOut {
    index: usize,
    line: Option<u32>,
    highlight: Highlight,
    variables: serde_json::Map<String, Value>,
}

fn usage() -> &'static str {
    "stepgraph-cli\n\
\n\
USAGE:\n\
  stepgraph-cli [ingest] [--pretty] [--strict] [<path>|-]\n\
  stepgraph-cli detect [<path>|-]\n\
  stepgraph-cli layout [--pretty] [--strict] [--direction tb|bt|lr|rl] [--config <path>] [<path>|-]\n\
  stepgraph-cli replay [--pretty] [--strict] [--step <n>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - Input is a JSON trace: a call/return event array, a DAG table or traversal snapshots.\n\
  - --config reads a JSON object of engine config overrides (e.g. {\"layout\":{\"rankSep\":80}}).\n\
  - replay prints one JSON record per step; --step prints only that step (clamped).\n\
  - Set STEPGRAPH_LOG (e.g. STEPGRAPH_LOG=debug) to see diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "detect" => args.command = Command::Detect,
            "ingest" => args.command = Command::Ingest,
            "layout" => args.command = Command::Layout,
            "replay" => args.command = Command::Replay,
            "--pretty" => args.pretty = true,
            "--strict" => args.strict = true,
            "--direction" => {
                let Some(dir) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.direction = Some(
                    dir.parse::<RankDir>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--step" => {
                let Some(step) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.step = Some(step.parse::<usize>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn engine_config(args: &Args) -> Result<EngineConfig, CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => {
            let overrides: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            EngineConfig::from_overrides(&overrides)?
        }
        None => EngineConfig::default(),
    };
    if let Some(direction) = args.direction {
        config.layout.direction = direction;
    }
    if args.strict {
        config.ingest.strict = true;
    }
    Ok(config)
}

fn replay(trace: &Trace, step: Option<usize>, pretty: bool) -> Result<(), CliError> {
    let mut controller = PlaybackController::default();
    let (tx, rx) = mpsc::channel::<StepChanged>();
    controller.subscribe(move |event| {
        let _ = tx.send(event.clone());
    });
    controller.load(std::sync::Arc::new(trace.clone()));

    let events: Vec<StepChanged> = match step {
        Some(step) => {
            controller.seek(step);
            rx.try_iter().last().into_iter().collect()
        }
        None => {
            while controller.next() {}
            rx.try_iter().collect()
        }
    };

    for event in events {
        let out = StepOut {
            index: event.index,
            line: event.line,
            variables: trace.variables_at(event.index).into_iter().collect(),
            highlight: event.highlight,
        };
        write_json(&out, pretty)?;
    }
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let payload: Value = serde_json::from_str(&text)?;
    let engine = Engine::new().with_config(engine_config(&args)?);
    let options = engine.ingest_options();
    tracing::debug!(command = ?args.command, strict = options.strict, "running");

    match args.command {
        Command::Detect => {
            let (kind, _) = stepgraph::detect_payload(&payload)?;
            println!("{}", kind.as_str());
            Ok(())
        }
        Command::Ingest => {
            let trace = engine.ingest_with(&payload, options)?;
            write_json(&trace, args.pretty)
        }
        Command::Layout => {
            let loaded = block_on(engine.load(&payload, options))?;
            let out = LayoutOut {
                graph: &loaded.graph,
                layout_error: loaded.graph.layout_error.as_ref().map(|e| e.to_string()),
                errors: loaded.trace.errors(),
            };
            write_json(&out, args.pretty)
        }
        Command::Replay => {
            let trace = engine.ingest_with(&payload, options)?;
            replay(&trace, args.step, args.pretty)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("STEPGRAPH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
