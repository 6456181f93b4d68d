//! `diagnostics` subcommand body (`SPEC_FULL.md` §6 supplement): a thin,
//! grounded self-check over the two core APIs that already know how to
//! answer "is this cluster reachable" — [`SubprocessRunner`] for the CLI
//! binaries and [`Provider`] for the active kubeconfig context.

use kubectl_mcp_k8s::{Provider, ProviderConfig, SubprocessRunner};

pub async fn run() -> anyhow::Result<()> {
    let runner = SubprocessRunner::new();
    for binary in ["kubectl", "helm", "kind"] {
        match (runner.available(binary).await, runner.version(binary).await) {
            (true, Some(version)) => println!("{binary}: available ({version})"),
            (true, None) => println!("{binary}: available (version unknown)"),
            (false, _) => println!("{binary}: not found on PATH"),
        }
    }

    let provider = Provider::new(ProviderConfig::from_env());
    match provider.current_context().await {
        Ok(Some(context)) => println!("kubeconfig current-context: {context}"),
        Ok(None) => println!("kubeconfig current-context: (none set)"),
        Err(err) => println!("kubeconfig: unavailable ({err})"),
    }

    match provider.list_contexts().await {
        Ok(contexts) => {
            println!("kubeconfig contexts: {}", contexts.len());
            for ctx in contexts {
                let marker = if ctx.is_active { "*" } else { " " };
                println!("  {marker} {} (cluster={}, user={})", ctx.name, ctx.cluster, ctx.user);
            }
        }
        Err(err) => println!("kubeconfig contexts: unavailable ({err})"),
    }

    Ok(())
}
