use clap::{Parser, Subcommand};
use log::{error, info, LevelFilter};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use yard_grid::grid_display::{display_view, GridDisplayConfig};
use yard_grid::{html, tui};
use yard_grid::{
    GridView, GridViewController, HttpBackend, RequestKind, StepHistory, ViewerConfig, YardBackend, YardResult,
};

#[derive(Debug, Parser)]
#[command(name = "yard_grid", version, about = "Terminal viewer for the crane yard backend")]
struct Cli {
    /// Backend base URL, e.g. http://127.0.0.1:5000
    #[arg(long, global = true)]
    server: Option<String>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Upload this manifest first; the backend session lasts for this process only
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive viewer (default)
    View {
        /// Refetch the current grid every N milliseconds
        #[arg(long)]
        refresh_ms: Option<u64>,
    },
    /// Print one snapshot and exit
    Snapshot {
        /// Advance one step before printing
        #[arg(long)]
        next: bool,
        /// Print HTML fragments instead of text
        #[arg(long)]
        html: bool,
    },
    /// Poll the current grid and print it whenever it changes
    Watch {
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
    /// Upload a manifest and print the resulting plan
    Upload { file: PathBuf },
    /// Add a note to the backend's operation log
    Note {
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Save the outbound manifest
    DownloadManifest {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Save the operation log and end the session
    Close {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn load_config(cli: &Cli) -> YardResult<ViewerConfig> {
    let mut config = match &cli.config {
        Some(path) => ViewerConfig::load_from_file(path)?,
        None => ViewerConfig::default(),
    };
    config.apply_env();

    if let Some(server) = &cli.server {
        config.server.base_url = server.clone();
    }
    match &cli.command {
        Some(Command::View { refresh_ms: Some(ms) }) => {
            config.display.refresh_interval_ms = (*ms > 0).then_some(*ms);
        }
        Some(Command::DownloadManifest { out: Some(dir) }) | Some(Command::Close { out: Some(dir) }) => {
            config.display.download_dir = dir.clone();
        }
        _ => {}
    }

    config.validate()?;
    Ok(config)
}

/// Log to stderr, or to the configured file while the terminal UI owns the screen
fn init_logging(config: &ViewerConfig, interactive: bool) {
    let env = env_logger::Env::default().default_filter_or(config.logging.level.as_str());
    let mut builder = env_logger::Builder::from_env(env);

    if interactive {
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.logging.log_file)
        {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!(
                    "Cannot open log file {}: {} (logging disabled)",
                    config.logging.log_file.display(),
                    e
                );
                builder.filter_level(LevelFilter::Off);
            }
        }
    }

    builder.init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let interactive = matches!(cli.command, None | Some(Command::View { .. }));
    init_logging(&config, interactive);

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: ViewerConfig) -> YardResult<()> {
    let backend = Arc::new(HttpBackend::new(&config.server)?);
    info!("Using backend {}", backend.base_url());

    if let Some(manifest) = &cli.manifest {
        backend.upload_manifest(manifest)?;
        info!("Uploaded manifest {}", manifest.display());
    }

    let mut controller = GridViewController::new(backend.clone(), &config);
    let text_config = GridDisplayConfig::default();

    match cli.command.unwrap_or(Command::View { refresh_ms: None }) {
        Command::View { .. } => tui::run(controller, &config),
        Command::Snapshot { next, html: as_html } => {
            let kind = if next { RequestKind::Next } else { RequestKind::Current };
            controller.fetch_blocking(kind)?;
            if as_html {
                print!(
                    "{}",
                    html::render_document(controller.view(), controller.history(), controller.update_status())
                );
            } else {
                display_view(controller.view(), controller.history(), None, &text_config);
            }
            Ok(())
        }
        Command::Watch { interval_ms } => watch(&mut controller, Duration::from_millis(interval_ms), &text_config),
        Command::Upload { file } => {
            backend.upload_manifest(&file)?;
            println!("Uploaded {}", file.display());
            controller.fetch_blocking(RequestKind::Current)?;
            display_view(controller.view(), controller.history(), None, &text_config);
            Ok(())
        }
        Command::Note { message } => {
            controller.post_note(&message.join(" "))?;
            println!("Note added to log");
            Ok(())
        }
        Command::DownloadManifest { .. } => {
            let path = controller.download_manifest()?;
            println!("Manifest downloaded: {}", path.display());
            Ok(())
        }
        Command::Close { .. } => {
            let path = controller.close_app()?;
            println!("Log downloaded: {}", path.display());
            Ok(())
        }
    }
}

/// Print the grid each time the backend reports something new, until Ctrl+C
fn watch(controller: &mut GridViewController, interval: Duration, text_config: &GridDisplayConfig) -> YardResult<()> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    if let Err(e) = ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst)) {
        error!("Failed to install Ctrl+C handler: {}", e);
    }

    let mut last_printed: Option<(GridView, StepHistory)> = None;
    while running.load(Ordering::SeqCst) {
        let started = Instant::now();

        // Failures are logged by the controller; keep polling
        if controller.fetch_blocking(RequestKind::Current).is_ok() {
            let current = (controller.view().clone(), controller.history().clone());
            if last_printed.as_ref() != Some(&current) {
                display_view(&current.0, &current.1, None, text_config);
                last_printed = Some(current);
            }
        }

        while running.load(Ordering::SeqCst) && started.elapsed() < interval {
            thread::sleep(Duration::from_millis(50).min(interval));
        }
    }

    info!("Watch stopped");
    Ok(())
}
