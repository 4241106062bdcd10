//! Microgrid simulator entry point: CLI wiring, batch run, and optional API host.

use std::process;

use clap::Parser;
use tracing::{error, info};

use microgrid_sim::cli::Cli;
use microgrid_sim::io::export::export_csv;
use microgrid_sim::runner;
use microgrid_sim::telemetry::{LogFormat, init_tracing};

fn main() {
    let cli = Cli::parse();
    init_tracing(if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    });

    let config = match cli.load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    #[cfg(feature = "api")]
    if cli.serve {
        run_server(config, cli.port);
        return;
    }

    let output = match runner::run(config) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&output.kpis) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to encode KPIs: {e}");
                process::exit(1);
            }
        }
    } else {
        println!("{}", output.kpis);
    }

    if let Some(ref path) = cli.telemetry_out {
        let samples = microgrid_sim::trajectory(&output.state);
        if let Err(e) = export_csv(&samples, path) {
            error!(path = %path.display(), "failed to write CSV: {e}");
            process::exit(1);
        }
        info!(path = %path.display(), samples = samples.len(), "telemetry written");
    }
}

/// Initializes an engine from `config` and serves it until the process exits.
#[cfg(feature = "api")]
fn run_server(config: microgrid_sim::MicrogridConfig, port: u16) {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use microgrid_sim::api::{AppState, serve};
    use microgrid_sim::Engine;

    let mut engine = Engine::new();
    if let Err(e) = engine.initialize(config) {
        eprintln!("error: {e}");
        process::exit(1);
    }
    let state = Arc::new(AppState::new(engine));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("error: failed to create tokio runtime: {e}");
        process::exit(1);
    });
    if let Err(e) = rt.block_on(serve(state, addr)) {
        error!(%addr, "API server stopped: {e}");
        process::exit(1);
    }
}
