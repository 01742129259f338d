mod cli;

use subforge::{
    batch::{EngineSource, Orchestrator},
    config,
    report::{ConsoleReporter, Reporter, SilentReporter},
    server,
};
use subforge_av::{ToolPaths, ToolRegistry};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ExtractArgs};
use std::path::Path;
use tokio_util::sync::CancellationToken;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "subforge=trace,subforge_av=trace,tower_http=debug".to_string()
        } else {
            "subforge=info,subforge_av=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.stray_extract_args() {
        anyhow::bail!("PATH, --jobs, --timeout and --json only apply when no subcommand is given");
    }

    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Some(Commands::CheckTools) => check_tools(cli.config.as_deref()),
        None => rt.block_on(extract(&cli.extract, cli.config.as_deref())),
    }
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;
    config::apply_env_overrides(&mut config)?;

    // CLI flags win over file and environment
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting subforge server");
    server::start_server(config).await
}

async fn extract(args: &ExtractArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;
    if let Some(jobs) = args.jobs {
        config.extract.jobs = jobs;
    }
    if let Some(secs) = args.timeout {
        config.extract.decode_timeout_secs = Some(secs);
    }
    config::validate_config(&config)?;

    let engine = EngineSource::Tools(config.tools.clone()).engine()?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after in-flight extractions are cleaned up");
            on_signal.cancel();
        }
    });

    let orchestrator = Orchestrator::new(engine)
        .with_jobs(config.extract.jobs)
        .with_timeout(config.extract.decode_timeout())
        .with_cancellation(cancel);

    let reporter: Box<dyn Reporter> = if args.json {
        Box::new(SilentReporter)
    } else {
        Box::new(ConsoleReporter)
    };

    let report = orchestrator.run(&args.path, reporter.as_ref()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let paths: ToolPaths = config::load_config_or_default(config_path)?.tools;

    println!("Checking external tools...\n");

    let registry = ToolRegistry::discover(&paths);
    let tools = registry.check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
        Ok(())
    } else {
        anyhow::bail!("Some required tools are missing. Install ffmpeg (which ships ffprobe).")
    }
}
