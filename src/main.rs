use anyhow::Result;
use clap::Parser;
use dashcam::control::{prepare_system, wait_for_shutdown_signal};
use dashcam::{ControlLoop, DashcamConfig};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "dashcam")]
#[command(about = "Touchscreen dashcam with live preview and segmented GPS-tagged recording")]
#[command(version)]
#[command(long_about = "A Raspberry Pi dashcam controller. Shows a live camera preview with \
on-screen buttons, records fixed-length video segments tagged with the current GPS position, \
and powers the device off safely when the battery runs low.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "dashcam.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without starting the system")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Dry run mode - open every device but don't start the loop
    #[arg(long, help = "Perform dry run - open all devices but don't start the control loop")]
    dry_run: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    init_logging(&args)?;

    info!("Starting dashcam v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let config = match DashcamConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        eprintln!("✗ Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    if args.validate_config {
        println!("✓ Configuration is valid");
        return Ok(());
    }

    let cancel = CancellationToken::new();

    if !args.dry_run {
        prepare_system(&config);
    }

    let mut control = ControlLoop::from_config(&config, cancel.clone()).map_err(|e| {
        error!("Failed to initialize devices: {}", e);
        e
    })?;

    if args.dry_run {
        info!("Dry run mode - devices opened but control loop not started");
        println!("✓ Dry run completed successfully - all devices initialized");
        return Ok(());
    }

    let loop_cancel = cancel.clone();
    let mut task = tokio::task::spawn_blocking(move || control.run(&loop_cancel));

    let result = tokio::select! {
        result = &mut task => result,
        reason = wait_for_shutdown_signal() => {
            info!("Shutdown initiated: {:?}", reason);
            cancel.cancel();
            task.await
        }
    };

    let exit_code = match result {
        Ok(Ok(reason)) if reason.powers_off() => {
            info!("Dashcam stopped, power-off requested: {:?}", reason);
            0
        }
        Ok(Ok(reason)) => {
            info!("Dashcam stopped without powering off: {:?}", reason);
            0
        }
        Ok(Err(e)) => {
            error!("Dashcam stopped on error: {}", e);
            1
        }
        Err(e) => {
            error!("Control loop task failed: {}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{
        fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    };

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dashcam={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_names(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_target(true)
                .with_thread_names(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    Ok(())
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    println!("# Dashcam Configuration File");
    println!("# This is the default configuration with all available options");
    println!();
    println!("{}", toml::to_string_pretty(&DashcamConfig::default())?);
    Ok(())
}
