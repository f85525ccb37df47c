//! touchsize CLI - measure touch sizes on a multitouch device
//!
//! Commands:
//! - measure: Read events live from an evdev device node
//! - replay: Replay an evemu recording
//! - quirks: Show the thresholds that would be used for a device

use clap::{Args, Parser, Subcommand};
use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use touchsize::{
    run_session, AxisCapabilities, DeviceQuirks, EventSource, InputEvent, MeasureError,
    RecordingSource, SessionController, SessionUpdate, ThresholdConfig, Thresholds, TouchRange,
    TOUCHSIZE_VERSION,
};

/// touchsize - Measure touch size and orientation of a single finger
#[derive(Parser)]
#[command(name = "touchsize")]
#[command(version = TOUCHSIZE_VERSION)]
#[command(about = "Measure touch size and classify touches as down/up and palm", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read events live from a device node (e.g. /dev/input/event5)
    Measure {
        /// Path to the event device
        device: PathBuf,

        #[command(flatten)]
        thresholds: ThresholdArgs,

        /// Print a JSON session report at exit instead of live output
        #[arg(long)]
        json: bool,
    },

    /// Replay an evemu recording
    Replay {
        /// Recording file path (use - for stdin)
        input: PathBuf,

        #[command(flatten)]
        thresholds: ThresholdArgs,

        /// Print a JSON session report at the end instead of live output
        #[arg(long)]
        json: bool,
    },

    /// Show the thresholds that would be used for a device
    Quirks {
        /// Path to the event device
        device: PathBuf,

        #[command(flatten)]
        thresholds: ThresholdArgs,
    },
}

#[derive(Args)]
struct ThresholdArgs {
    /// Touch size thresholds in the form down:up
    #[arg(long, value_name = "DOWN:UP")]
    touch_thresholds: Option<TouchRange>,

    /// Palm size threshold
    #[arg(long)]
    palm_threshold: Option<i32>,

    /// Load thresholds from a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read device quirks from a file instead of `libinput quirks list`
    #[arg(long)]
    quirks: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), CliFailure> {
    match cli.command {
        Commands::Measure {
            device,
            thresholds,
            json,
        } => cmd_measure(&device, &thresholds, json),
        Commands::Replay {
            input,
            thresholds,
            json,
        } => cmd_replay(&input, &thresholds, json),
        Commands::Quirks { device, thresholds } => cmd_quirks(&device, &thresholds),
    }
}

fn cmd_measure(path: &Path, args: &ThresholdArgs, json: bool) -> Result<(), CliFailure> {
    let thresholds = resolve_thresholds(args, Some(path))?;
    let mut source = DeviceSource::open(path)?;
    let mut controller = SessionController::new(thresholds, source.capabilities())?;

    if !json {
        print_header(&source.name, path, &thresholds);
    }
    drive(&mut source, &mut controller, json)
}

fn cmd_replay(input: &Path, args: &ThresholdArgs, json: bool) -> Result<(), CliFailure> {
    let thresholds = resolve_thresholds(args, None)?;

    if input.as_os_str() == "-" {
        let stdin = io::stdin();
        let source = RecordingSource::open(stdin.lock())?;
        replay(source, input, thresholds, json)
    } else {
        let source = RecordingSource::open(BufReader::new(File::open(input)?))?;
        replay(source, input, thresholds, json)
    }
}

fn replay<R: io::BufRead>(
    mut source: RecordingSource<R>,
    input: &Path,
    thresholds: Thresholds,
    json: bool,
) -> Result<(), CliFailure> {
    let mut controller = SessionController::new(thresholds, source.capabilities())?;
    if !json {
        let name = source.name().unwrap_or("unknown device").to_string();
        print_header(&name, input, &thresholds);
    }
    drive(&mut source, &mut controller, json)
}

fn cmd_quirks(path: &Path, args: &ThresholdArgs) -> Result<(), CliFailure> {
    let thresholds = resolve_thresholds(args, Some(path))?;
    println!("Touch sizes used: {}", thresholds.touch_range());
    println!("Palm size used: {}", thresholds.palm());
    if thresholds.is_unset() {
        println!("No touch size thresholds configured for this device");
    }
    if thresholds.palm_is_unset() {
        println!("No palm size threshold configured for this device");
    }
    Ok(())
}

/// Explicit args and config file override device quirks, which override defaults
fn resolve_thresholds(
    args: &ThresholdArgs,
    device: Option<&Path>,
) -> Result<Thresholds, CliFailure> {
    let mut config = match &args.config {
        Some(path) => ThresholdConfig::from_json(&fs::read_to_string(path)?)?,
        None => ThresholdConfig::default(),
    };
    if args.touch_thresholds.is_some() {
        config.touch_range = args.touch_thresholds;
    }
    if args.palm_threshold.is_some() {
        config.palm = args.palm_threshold;
    }

    let quirks = match (&args.quirks, device) {
        (Some(path), _) => DeviceQuirks::parse(&fs::read_to_string(path)?)?,
        (None, Some(device)) => libinput_quirks(device)?,
        (None, None) => DeviceQuirks::default(),
    };

    Ok(config.resolve(&quirks)?)
}

/// Ask libinput for the quirks of `device`. A missing `libinput` binary means no quirks.
fn libinput_quirks(device: &Path) -> Result<DeviceQuirks, MeasureError> {
    let output = match Command::new("libinput")
        .args(["quirks", "list"])
        .arg(device)
        .output()
    {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            debug!(status = %output.status, "libinput quirks list failed");
            return Ok(DeviceQuirks::default());
        }
        Err(e) => {
            debug!(error = %e, "could not run libinput quirks list");
            return Ok(DeviceQuirks::default());
        }
    };
    DeviceQuirks::parse(&String::from_utf8_lossy(&output.stdout))
}

fn print_header(name: &str, path: &Path, thresholds: &Thresholds) {
    println!("Using {}: {}", name, path.display());
    println!();
    println!("Touch sizes used: {}", thresholds.touch_range());
    println!("Palm size used: {}", thresholds.palm());
    if thresholds.is_unset() {
        eprintln!("Warning: no touch size thresholds configured, every touch is reported as down");
    }
    if thresholds.palm_is_unset() {
        eprintln!("Warning: no palm size threshold configured, every touch is tagged as palm");
    }
    println!();
    println!("Place a single finger on the device to measure touch size.");
    println!("Ctrl+C to exit");
    println!();
}

fn drive<S: EventSource>(
    source: &mut S,
    controller: &mut SessionController,
    json: bool,
) -> Result<(), CliFailure> {
    let interactive = atty::is(atty::Stream::Stdout);
    let mut stdout = io::stdout();

    run_session(source, controller, |update| {
        if !json {
            present(&mut stdout, &update, interactive)?;
        }
        Ok(())
    })?;

    if json {
        println!("{}", controller.report().to_json_pretty()?);
    }
    Ok(())
}

fn present(out: &mut impl Write, update: &SessionUpdate, interactive: bool) -> io::Result<()> {
    match update {
        SessionUpdate::Frame(state) if interactive => {
            write!(out, "\r{:<78}", state.to_string())?;
            out.flush()
        }
        SessionUpdate::Frame(state) => writeln!(out, "{}", state),
        SessionUpdate::Finished(summary) if interactive => {
            writeln!(out, "\r{:<78}", summary.to_string())
        }
        SessionUpdate::Finished(summary) => writeln!(out, "{}", summary),
        SessionUpdate::MultiFinger { .. } => {
            eprintln!("\rThis tool cannot handle multiple fingers, output will be invalid");
            Ok(())
        }
    }
}

// Live device source

struct DeviceSource {
    device: evdev::Device,
    name: String,
    pending: VecDeque<InputEvent>,
}

impl DeviceSource {
    fn open(path: &Path) -> Result<Self, MeasureError> {
        let device = evdev::Device::open(path)?;
        let name = device.name().unwrap_or("unknown device").to_string();
        Ok(Self {
            device,
            name,
            pending: VecDeque::new(),
        })
    }

    fn capabilities(&self) -> AxisCapabilities {
        match self.device.supported_absolute_axes() {
            Some(axes) => AxisCapabilities::from_abs_codes(axes.iter().map(|axis| axis.0)),
            None => AxisCapabilities::default(),
        }
    }
}

impl EventSource for DeviceSource {
    fn next_event(&mut self) -> Result<Option<InputEvent>, MeasureError> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }
            for event in self.device.fetch_events()? {
                self.pending.push_back(InputEvent::from_raw(
                    event.event_type().0,
                    event.code(),
                    event.value(),
                ));
            }
        }
    }
}

// Error types

#[derive(Debug)]
enum CliFailure {
    Io(io::Error),
    Measure(MeasureError),
}

impl From<io::Error> for CliFailure {
    fn from(e: io::Error) -> Self {
        CliFailure::Io(e)
    }
}

impl From<MeasureError> for CliFailure {
    fn from(e: MeasureError) -> Self {
        CliFailure::Measure(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CliFailure> for CliError {
    fn from(e: CliFailure) -> Self {
        let (code, hint) = match &e {
            CliFailure::Io(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                ("IO_ERROR", Some("Run as root or add your user to the input group"))
            }
            CliFailure::Io(_) => ("IO_ERROR", Some("Check file paths and permissions")),
            CliFailure::Measure(MeasureError::Io(_)) => {
                ("IO_ERROR", Some("The device was removed or became unreadable"))
            }
            CliFailure::Measure(MeasureError::InvalidThresholds(_)) => (
                "CONFIG_ERROR",
                Some("Thresholds must satisfy down >= up and palm >= 0"),
            ),
            CliFailure::Measure(MeasureError::MissingAxis(_)) => (
                "UNSUPPORTED_DEVICE",
                Some("This tool needs a device that reports touch size"),
            ),
            CliFailure::Measure(MeasureError::NoActiveSequence) => (
                "ORDERING_ERROR",
                Some("Lift all fingers before starting, then touch the device"),
            ),
            CliFailure::Measure(MeasureError::RecordingParse { .. }) => {
                ("PARSE_ERROR", Some("Input must be an evemu-record recording"))
            }
            CliFailure::Measure(MeasureError::Json(_)) => ("JSON_ERROR", Some("Check JSON syntax")),
        };

        let message = match e {
            CliFailure::Io(err) => err.to_string(),
            CliFailure::Measure(err) => err.to_string(),
        };

        CliError {
            code: code.to_string(),
            message,
            hint: hint.map(str::to_string),
        }
    }
}
