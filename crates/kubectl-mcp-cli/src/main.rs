//! `serve|version|diagnostics` launcher (`spec.md` §6).

mod cli;
mod diagnostics;
mod logging;

use clap::Parser;
use kubectl_mcp_k8s::ProviderConfig;
use kubectl_mcp_server::config::{ServerConfig, TransportKind};
use kubectl_mcp_server::safety::SafetyMode;
use kubectl_mcp_server::Server;

use cli::{Cli, Commands, TransportArg};

fn main() {
    let args = Cli::parse();

    let _guard = match logging::init() {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Error: failed to initialize logging: {err}");
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("Error: failed to start async runtime: {err}");
            std::process::exit(1);
        }
    };

    let exit_code = runtime.block_on(run(args));
    std::process::exit(exit_code);
}

async fn run(args: Cli) -> i32 {
    let result = match args.command {
        Commands::Version => {
            println!("kubectl-mcp-server {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Diagnostics => diagnostics::run().await,
        Commands::Serve { transport, host, port, disable_destructive, read_only } => {
            serve(transport, host, port, disable_destructive, read_only).await
        }
    };

    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("Error: {err}");
            1
        }
    }
}

async fn serve(
    transport: TransportArg,
    host: String,
    port: u16,
    disable_destructive: bool,
    read_only: bool,
) -> anyhow::Result<()> {
    let safety_mode = match (read_only, disable_destructive) {
        (true, _) => SafetyMode::ReadOnly,
        (false, true) => SafetyMode::DisableDestructive,
        (false, false) => SafetyMode::Normal,
    };

    let config = ServerConfig {
        transport: match transport {
            TransportArg::Stdio => TransportKind::Stdio,
            TransportArg::Sse | TransportArg::Http => TransportKind::Http,
        },
        host,
        port,
        safety_mode,
        provider: ProviderConfig::from_env(),
        ..ServerConfig::default()
    };

    Server::new(config).run().await
}
