mod config;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

use facebank_core::audit::domain::audit_sink::AuditSink;
use facebank_core::audit::infrastructure::firestore_audit_sink::{
    FirestoreAuditSink, FirestoreConfig,
};
use facebank_core::audit::infrastructure::jsonl_audit_sink::JsonlAuditSink;
use facebank_core::audit::infrastructure::log_audit_sink::LogAuditSink;
use facebank_core::auth::domain::authenticator::Authenticator;
use facebank_core::banking::domain::account::Account;
use facebank_core::capture::domain::frame_source::FrameSource;
use facebank_core::capture::infrastructure::ffmpeg_camera_source::FfmpegCameraSource;
use facebank_core::capture::infrastructure::image_file_writer::ImageFileWriter;
use facebank_core::capture::infrastructure::image_sequence_source::ImageSequenceSource;
use facebank_core::detection::domain::face_locator::FaceLocator;
use facebank_core::detection::infrastructure::model_resolver;
use facebank_core::detection::infrastructure::onnx_face_locator::{
    OnnxFaceLocator, DEFAULT_CONFIDENCE,
};
use facebank_core::pipeline::authenticate_frame_use_case::AuthenticateFrameUseCase;
use facebank_core::pipeline::enroll_faces_use_case::EnrollFacesUseCase;
use facebank_core::pipeline::frame_display::{FrameDisplay, LogDisplay};
use facebank_core::pipeline::infrastructure::channel_console::ChannelConsole;
use facebank_core::pipeline::infrastructure::snapshot_display::SnapshotDisplay;
use facebank_core::pipeline::kiosk::Kiosk;
use facebank_core::pipeline::operator_console::OperatorConsole;
use facebank_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use facebank_core::recognition::domain::face_classifier::FaceClassifier;
use facebank_core::recognition::domain::identity_oracle::{IdentityOracle, UnanimousEnsemble};
use facebank_core::recognition::infrastructure::gallery::Gallery;
use facebank_core::recognition::infrastructure::nearest_neighbour_classifier::{
    NearestNeighbourClassifier, DEFAULT_KNN_KS,
};
use facebank_core::recognition::infrastructure::onnx_face_classifier::{
    load_labels, OnnxFaceClassifier,
};
use facebank_core::shared::constants::{DEFAULT_ENROLL_COUNT, FACE_MODEL_NAME, FACE_MODEL_URL};

use config::AuthConfig;

#[cfg(target_os = "linux")]
const DEFAULT_CAMERA: &str = "/dev/video0";
#[cfg(not(target_os = "linux"))]
const DEFAULT_CAMERA: &str = "0";

/// Face-authenticated banking kiosk.
#[derive(Parser)]
#[command(name = "facebank")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the live authentication loop and banking menu.
    Run(RunArgs),
    /// Capture face crops for a user into the enrollment directory.
    Enroll(EnrollArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum AuditKind {
    Firestore,
    Jsonl,
    Log,
}

#[derive(Args)]
struct CaptureArgs {
    /// Camera device, video file, or directory of still images.
    #[arg(long, default_value = DEFAULT_CAMERA)]
    camera: String,

    /// Override the ffmpeg capture format (e.g. v4l2, avfoundation, dshow).
    #[arg(long)]
    capture_format: Option<String>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Face detection ONNX model (downloaded to the cache if omitted).
    #[arg(long)]
    face_model: Option<PathBuf>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    capture: CaptureArgs,

    /// JSON config file (default: <config dir>/FaceBank/config.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Identity allowed to open the banking menu.
    #[arg(long)]
    authorized: Option<String>,

    /// Consecutive failures before lockout.
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Lockout duration in seconds.
    #[arg(long)]
    lock_time: Option<u64>,

    /// Starting account balance.
    #[arg(long, allow_hyphen_values = true)]
    initial_balance: Option<i64>,

    /// ONNX identity classifier (repeatable; all must agree).
    #[arg(long)]
    classifier_model: Vec<PathBuf>,

    /// Labels file mapping classifier outputs to identities.
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Enrollment directory (<dir>/<user>/*.jpg) for nearest-neighbour classifiers.
    #[arg(long)]
    gallery: Option<PathBuf>,

    /// Neighbour counts for gallery classifiers (comma-separated, one classifier each).
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_KNN_KS)]
    knn_k: Vec<usize>,

    /// Audit sink.
    #[arg(long, value_enum, default_value = "log")]
    audit: AuditKind,

    /// Output file for the jsonl audit sink.
    #[arg(long, default_value = "login_logs.jsonl")]
    audit_file: PathBuf,

    /// Firestore project id (falls back to FIREBASE_PROJECT_ID).
    #[arg(long)]
    firestore_project: Option<String>,

    /// Write an annotated snapshot image to this path.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Frames between snapshot writes.
    #[arg(long, default_value = "10")]
    snapshot_every: usize,
}

#[derive(Args)]
struct EnrollArgs {
    #[command(flatten)]
    capture: CaptureArgs,

    /// User id; crops go to <data-dir>/<user>/.
    #[arg(long)]
    user: String,

    /// Enrollment root directory.
    #[arg(long, default_value = "face_data")]
    data_dir: PathBuf,

    /// Number of face crops to capture.
    #[arg(long, default_value_t = DEFAULT_ENROLL_COUNT)]
    count: usize,
}

fn main() {
    init_logging();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// The operator console runs the terminal raw, so every line needs an
/// explicit carriage return.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default())
        .format(|buf, record| {
            let message = record.args().to_string().replace('\n', "\r\n");
            write!(
                buf,
                "[{} {:<5} {}] {message}\r\n",
                buf.timestamp(),
                record.level(),
                record.target()
            )
        })
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => {
            validate_run(&args)?;
            run_kiosk(&args)
        }
        Command::Enroll(args) => {
            validate_enroll(&args)?;
            run_enroll(&args)
        }
    }
}

fn run_kiosk(args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AuthConfig::load(args.config.as_deref())?;
    apply_overrides(&mut config, args);
    let policy = config.to_policy()?;
    log::info!(
        "Authorized identity {}, lockout after {} failures for {}s",
        policy.authorized_identity(),
        policy.max_attempts(),
        config.lock_time_secs
    );

    let oracle = build_oracle(args)?;
    let locator = build_locator(&args.capture)?;
    let source = open_source(&args.capture)?;
    let audit = build_audit(args)?;
    let display: Box<dyn FrameDisplay> = match &args.snapshot {
        Some(path) => Box::new(SnapshotDisplay::new(
            Box::new(ImageFileWriter::new()),
            path.clone(),
            args.snapshot_every,
        )),
        None => Box::new(LogDisplay::new()),
    };
    let console = open_console()?;

    let mut kiosk = Kiosk::new(
        source,
        AuthenticateFrameUseCase::new(locator, oracle),
        Authenticator::new(policy),
        Account::new(config.initial_balance),
        audit,
        display,
        Box::new(console),
        Box::new(StdoutPipelineLogger::default()),
    );
    let reason = kiosk.run()?;
    log::info!(
        "Stopped ({reason:?}), final balance {}",
        kiosk.account().balance()
    );
    Ok(())
}

fn run_enroll(args: &EnrollArgs) -> Result<(), Box<dyn std::error::Error>> {
    let dir = args.data_dir.join(&args.user);
    let locator = build_locator(&args.capture)?;
    let source = open_source(&args.capture)?;

    let mut use_case = EnrollFacesUseCase::new(source, locator, Box::new(ImageFileWriter::new()));
    let mut console = open_console()?;
    console.report("Capturing faces; press Esc or q to stop early.");
    let mut logger = StdoutPipelineLogger::default();
    let saved = use_case.execute(&dir, args.count, &mut console, &mut logger)?;
    log::info!("Enrolled {saved} face crops for {}", args.user);
    Ok(())
}

fn open_console() -> Result<ChannelConsole, Box<dyn std::error::Error>> {
    ChannelConsole::terminal()
        .map_err(|e| format!("Operator console needs an interactive terminal: {e}").into())
}

fn apply_overrides(config: &mut AuthConfig, args: &RunArgs) {
    if let Some(identity) = &args.authorized {
        config.authorized_identity = identity.clone();
    }
    if let Some(n) = args.max_attempts {
        config.max_attempts = n;
    }
    if let Some(secs) = args.lock_time {
        config.lock_time_secs = secs;
    }
    if let Some(balance) = args.initial_balance {
        config.initial_balance = balance;
    }
}

fn build_oracle(args: &RunArgs) -> Result<Box<dyn IdentityOracle>, Box<dyn std::error::Error>> {
    let mut classifiers: Vec<Box<dyn FaceClassifier>> = Vec::new();

    if let Some(labels_path) = &args.labels {
        let labels = load_labels(labels_path)?;
        for model in &args.classifier_model {
            classifiers.push(Box::new(OnnxFaceClassifier::new(model, labels.clone())?));
        }
    }

    if let Some(dir) = &args.gallery {
        let gallery = Gallery::load(dir)?;
        log::info!(
            "Gallery {}: {} samples of {}",
            dir.display(),
            gallery.len(),
            gallery.labels().join(", ")
        );
        for &k in &args.knn_k {
            classifiers.push(Box::new(NearestNeighbourClassifier::new(gallery.clone(), k)?));
        }
    }

    let names: Vec<&str> = classifiers.iter().map(|c| c.name()).collect();
    log::info!("Identity classifiers: {}", names.join(", "));
    Ok(Box::new(UnanimousEnsemble::new(classifiers)?))
}

fn build_locator(args: &CaptureArgs) -> Result<Box<dyn FaceLocator>, Box<dyn std::error::Error>> {
    let model_path = match &args.face_model {
        Some(path) => path.clone(),
        None => {
            log::info!("Resolving model: {FACE_MODEL_NAME}");
            let path = model_resolver::resolve(
                FACE_MODEL_NAME,
                FACE_MODEL_URL,
                None,
                Some(Box::new(download_progress)),
            )?;
            eprintln!();
            path
        }
    };
    Ok(Box::new(OnnxFaceLocator::new(&model_path, args.confidence)?))
}

fn open_source(args: &CaptureArgs) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    let location = Path::new(&args.camera);
    let mut source: Box<dyn FrameSource> = if location.is_dir() {
        Box::new(ImageSequenceSource::new())
    } else if location.is_file() && !is_device(location) {
        Box::new(FfmpegCameraSource::file())
    } else if let Some(format) = &args.capture_format {
        Box::new(FfmpegCameraSource::with_capture_format(format.clone()))
    } else {
        Box::new(FfmpegCameraSource::camera())
    };

    let metadata = source.open(location)?;
    let rate = if metadata.fps > 0.0 {
        format!(" @ {:.1} fps", metadata.fps)
    } else {
        String::new()
    };
    log::info!(
        "Opened {} ({}x{}{rate}{})",
        metadata.location.display(),
        metadata.width,
        metadata.height,
        if metadata.is_live() { ", live" } else { "" }
    );
    Ok(source)
}

fn is_device(path: &Path) -> bool {
    path.starts_with("/dev")
}

fn build_audit(args: &RunArgs) -> Result<Box<dyn AuditSink>, Box<dyn std::error::Error>> {
    let sink: Box<dyn AuditSink> = match args.audit {
        AuditKind::Firestore => {
            let config = FirestoreConfig::from_env(args.firestore_project.clone())?;
            Box::new(FirestoreAuditSink::new(config)?)
        }
        AuditKind::Jsonl => Box::new(JsonlAuditSink::open(&args.audit_file)?),
        AuditKind::Log => Box::new(LogAuditSink),
    };
    Ok(sink)
}

fn validate_capture(args: &CaptureArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&args.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            args.confidence
        )
        .into());
    }
    if let Some(model) = &args.face_model {
        if !model.exists() {
            return Err(format!("Face model not found: {}", model.display()).into());
        }
    }
    Ok(())
}

fn validate_run(args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    validate_capture(&args.capture)?;
    if args.classifier_model.is_empty() && args.gallery.is_none() {
        return Err("At least one --classifier-model or a --gallery is required".into());
    }
    if !args.classifier_model.is_empty() && args.labels.is_none() {
        return Err("--classifier-model requires --labels".into());
    }
    for model in &args.classifier_model {
        if !model.exists() {
            return Err(format!("Classifier model not found: {}", model.display()).into());
        }
    }
    if let Some(dir) = &args.gallery {
        if !dir.is_dir() {
            return Err(format!("Gallery directory not found: {}", dir.display()).into());
        }
        if args.knn_k.is_empty() || args.knn_k.contains(&0) {
            return Err("--knn-k values must be positive".into());
        }
    }
    if args.max_attempts == Some(0) {
        return Err("Max attempts must be at least 1".into());
    }
    if args.snapshot_every == 0 {
        return Err("Snapshot interval must be at least 1".into());
    }
    Ok(())
}

fn validate_enroll(args: &EnrollArgs) -> Result<(), Box<dyn std::error::Error>> {
    validate_capture(&args.capture)?;
    if args.user.trim().is_empty() {
        return Err("User id must not be empty".into());
    }
    if args.user.contains(['/', '\\']) || args.user == ".." {
        return Err(format!("User id must be a plain name, got '{}'", args.user).into());
    }
    if args.count == 0 {
        return Err("Count must be at least 1".into());
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
