use agecam::capture::{CaptureSource, StillImageSource, WebcamCapture};
use agecam::detection::{self, PerformanceMode};
use agecam::estimation;
use agecam::output::{ConsoleSink, StateSink};
use agecam::pipeline::{self, Admission, PipelineController, SystemClock};
use agecam::PipelineConfig;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use image::imageops::FilterType;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input webcam device index
    #[arg(short, long, default_value_t = 0)]
    input_device: u32,

    /// Capture resolution width
    #[arg(long, default_value_t = 640)]
    capture_width: u32,

    /// Capture resolution height
    #[arg(long, default_value_t = 480)]
    capture_height: u32,

    /// Read frames from a still image instead of the webcam
    #[arg(long)]
    image: Option<String>,

    /// Path to the age classification model (ONNX file)
    #[arg(long)]
    model: String,

    /// Path to the SeetaFace face detection model
    #[arg(long)]
    face_model: String,

    /// Minimum time between processed frames, in milliseconds
    #[arg(long, default_value_t = 250)]
    min_interval_ms: u64,

    /// Context added around the face, as a fraction of the box size per side
    #[arg(long, default_value_t = 0.4)]
    margin: f32,

    /// Filter used to resize face crops to the model input
    #[arg(long, value_enum, default_value_t = ResizeFilter::Triangle)]
    resize_filter: ResizeFilter,

    /// Trade detection speed for recall
    #[arg(long)]
    accurate_detection: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl Args {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            min_interval: Duration::from_millis(self.min_interval_ms),
            margin: self.margin,
            resize_filter: self.resize_filter.into(),
            detector_mode: if self.accurate_detection {
                PerformanceMode::Accurate
            } else {
                PerformanceMode::Fast
            },
            ..PipelineConfig::default()
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = args.pipeline_config();

    tracing::info!("agecam starting");
    tracing::info!("Minimum interval: {:?}", config.min_interval);
    tracing::info!("Margin: {}", config.margin);

    // Initialize frame source
    let mut capture: Box<dyn CaptureSource> = match &args.image {
        Some(path) => Box::new(StillImageSource::open(path)?),
        None => Box::new(
            WebcamCapture::new(args.input_device, args.capture_width, args.capture_height)
                .context("Failed to initialize webcam capture")?,
        ),
    };
    let (width, height) = capture.resolution();
    tracing::info!("Capture: {}x{}", width, height);

    // Models are loaded once and live for the whole process
    let detector = detection::create_default_detector(&args.face_model, config.detector_mode)
        .context("Failed to load face detection model")?;
    let model = estimation::create_default_model(&args.model, config.input_size)
        .context("Failed to load age model")?;

    let cycle = pipeline::build_cycle(detector, model, &config)?;
    let controller = PipelineController::spawn(cycle, config.min_interval, SystemClock)?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("Failed to install Ctrl+C handler")?;
    }

    let mut sink = ConsoleSink::new(std::io::stdout());
    run_pipeline(capture.as_mut(), &controller, &mut sink, &running)?;

    tracing::info!("Stopping");
    let last = controller.shutdown();
    sink.present(&last)?;

    Ok(())
}

#[derive(Debug, Default)]
struct Stats {
    captured: u64,
    accepted: u64,
    throttled: u64,
    busy: u64,
    capture_time: Duration,
}

fn run_pipeline<C, S>(
    capture: &mut C,
    controller: &PipelineController<SystemClock>,
    sink: &mut S,
    running: &AtomicBool,
) -> Result<()>
where
    C: CaptureSource + ?Sized,
    S: StateSink,
{
    let mut stats = Stats::default();
    let mut last_version = 0;

    tracing::info!("Starting capture loop");
    tracing::info!("Press Ctrl+C to stop");

    while running.load(Ordering::SeqCst) {
        let capture_start = Instant::now();
        let frame = capture.capture_frame().context("Failed to capture frame")?;
        stats.capture_time += capture_start.elapsed();
        stats.captured += 1;

        match controller.submit(frame) {
            Admission::Accepted => stats.accepted += 1,
            Admission::Throttled => stats.throttled += 1,
            Admission::Busy => stats.busy += 1,
            Admission::Closed => break,
        }

        let state = controller.snapshot();
        if state.version != last_version {
            last_version = state.version;
            sink.present(&state)?;
        }

        // Log stats every 30 frames
        if stats.captured % 30 == 0 {
            let avg_capture_ms =
                stats.capture_time.as_secs_f64() * 1000.0 / stats.captured as f64;
            tracing::info!(
                "Frame {}: accepted={}, throttled={}, busy={}, cycles={}, capture={:.1}ms",
                stats.captured,
                stats.accepted,
                stats.throttled,
                stats.busy,
                controller.completed_cycles(),
                avg_capture_ms
            );
        }

        // A still image would otherwise spin
        if capture_start.elapsed() < Duration::from_millis(5) {
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    Ok(())
}
