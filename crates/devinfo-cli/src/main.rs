mod config;
mod render;

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use config::CliConfig;
use devinfo_adb::{first_online_serial, health_from_state, list_devices, AdbAccessor};
use devinfo_core::{
    CollectionReport, Collector, CollectorOptions, PlatformAccessor, ProfileAccessor,
};
use devinfo_util::{expand_user, write_json_atomic};
use tracing::info;

#[derive(Parser)]
#[command(name = "devinfo", version, about = "Android device data point collector")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Collect every device attribute once and print the snapshot
    Collect(CollectArgs),
    /// List devices visible to adb
    Devices {
        /// Include offline and unauthorized devices
        #[arg(long)]
        all: bool,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Show version and purpose
    About,
}

#[derive(Args)]
struct CollectArgs {
    /// adb serial; defaults to DEVINFO_SERIAL or the first online device
    #[arg(long)]
    serial: Option<String>,
    /// Installed application to collect for; defaults to DEVINFO_PACKAGE
    #[arg(long)]
    package: Option<String>,
    /// Read attributes from a JSON device profile instead of adb
    #[arg(long, conflicts_with_all = ["serial", "package"])]
    profile: Option<String>,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Also write the snapshot as JSON to this file
    #[arg(long)]
    output: Option<String>,
    /// Bound for App Set ID and advertising ID lookups, 0 disables it
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Print the reason for every fallback value to stderr
    #[arg(long)]
    report: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    devinfo_util::init_tracing()?;
    let cli = Cli::parse();
    let cfg = CliConfig::load();

    match cli.cmd {
        Cmd::Collect(args) => collect(args, &cfg).await?,
        Cmd::Devices { all, format } => {
            let devices = list_devices(all, cfg.adb_timeout()).await?;
            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&devices)?),
                Format::Text => {
                    for device in devices {
                        println!(
                            "{}\t{}\t{}\t{}",
                            device.serial,
                            device.display_name(),
                            health_from_state(&device.state),
                            device.kind.as_str()
                        );
                    }
                }
            }
        }
        Cmd::About => print!("{}", render::render_about()),
    }

    Ok(())
}

async fn collect(args: CollectArgs, cfg: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let options = CollectorOptions {
        async_timeout: match args.timeout_ms {
            Some(0) => None,
            Some(ms) => Some(Duration::from_millis(ms)),
            None => cfg.async_timeout(),
        },
    };

    let report = match &args.profile {
        Some(path) => {
            let accessor = ProfileAccessor::load(&expand_user(path))?;
            info!("collecting from profile {path}");
            run(accessor, options).await
        }
        None => {
            let package = args
                .package
                .clone()
                .or_else(|| non_empty(&cfg.package))
                .ok_or("no package given (use --package or DEVINFO_PACKAGE)")?;
            let serial = match args.serial.clone().or_else(|| non_empty(&cfg.serial)) {
                Some(serial) => serial,
                None => first_online_serial(cfg.adb_timeout())
                    .await?
                    .ok_or("no online adb device (use --serial or DEVINFO_SERIAL)")?,
            };
            let accessor = AdbAccessor::new(&serial, package).with_timeout(cfg.adb_timeout());
            accessor.ensure_online().await?;
            info!(
                "collecting from {} for {}",
                accessor.serial(),
                accessor.package()
            );
            run(accessor, options).await
        }
    };

    let snapshot = report.snapshot();
    match args.format {
        Format::Text => print!("{}", render::render_snapshot(snapshot)),
        Format::Json => println!("{}", serde_json::to_string_pretty(snapshot)?),
    }
    if args.report {
        eprint!("{}", render::render_fallbacks(&report));
    }
    if let Some(output) = &args.output {
        let path = expand_user(output);
        write_json_atomic(&path, snapshot)?;
        info!("wrote snapshot to {}", path.display());
    }
    Ok(())
}

async fn run<A: PlatformAccessor>(accessor: A, options: CollectorOptions) -> CollectionReport {
    Collector::new(accessor)
        .with_options(options)
        .collect_report()
        .await
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
