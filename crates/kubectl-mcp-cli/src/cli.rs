//! CLI argument parsing (`spec.md` §6 CLI surface), grounded on the
//! teacher's `turbomcp-cli::cli::Cli`/`Commands` shape.

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "kubectl-mcp-server",
    version,
    about = "MCP server exposing kubectl/helm/kind operations to an AI assistant"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server
    Serve {
        /// Transport to serve on
        #[arg(long, value_enum, default_value_t = TransportArg::Stdio)]
        transport: TransportArg,
        /// Bind host (http/sse only)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Bind port (http/sse only)
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Block every tool annotated `destructive`
        #[arg(long)]
        disable_destructive: bool,
        /// Block every tool not annotated `read_only`
        #[arg(long)]
        read_only: bool,
    },
    /// Print the server version
    Version,
    /// Check kubectl/helm/kind availability and the active kubeconfig context
    Diagnostics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum TransportArg {
    Stdio,
    Sse,
    Http,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_with_safety_flags() {
        let cli = Cli::parse_from(["kubectl-mcp-server", "serve", "--read-only", "--transport", "http", "--port", "9000"]);
        match cli.command {
            Commands::Serve { transport, port, read_only, disable_destructive, .. } => {
                assert_eq!(transport, TransportArg::Http);
                assert_eq!(port, 9000);
                assert!(read_only);
                assert!(!disable_destructive);
            }
            other => panic!("expected Serve, got {other:?}"),
        }
    }

    #[test]
    fn defaults_to_stdio_transport() {
        let cli = Cli::parse_from(["kubectl-mcp-server", "serve"]);
        match cli.command {
            Commands::Serve { transport, .. } => assert_eq!(transport, TransportArg::Stdio),
            other => panic!("expected Serve, got {other:?}"),
        }
    }

    #[test]
    fn parses_version_and_diagnostics() {
        assert!(matches!(Cli::parse_from(["kubectl-mcp-server", "version"]).command, Commands::Version));
        assert!(matches!(Cli::parse_from(["kubectl-mcp-server", "diagnostics"]).command, Commands::Diagnostics));
    }
}
