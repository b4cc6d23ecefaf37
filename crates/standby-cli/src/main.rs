use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "standbyctl",
    about = "Standby replica assignment for stateful tasks",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign standby replicas for every stateful task in a snapshot.
    ///
    /// Processes are picked least-loaded first, never the process that
    /// already runs the task. Tasks that cannot reach the requested
    /// replica count are reported as under-replicated.
    Assign {
        /// Cluster snapshot (JSON)
        #[arg(short, long)]
        snapshot: PathBuf,
        /// Assignor config (standby.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override [assignor].num_standby_replicas
        #[arg(short, long)]
        replicas: Option<u32>,
        /// Override [assignor].max_tasks_per_process
        #[arg(long)]
        max_tasks: Option<u32>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Validate a cluster snapshot without assigning anything
    Check {
        #[arg(short, long)]
        snapshot: PathBuf,
    },
}

/// Directives applied when `RUST_LOG` is unset or empty.
const DEFAULT_LOG_DIRECTIVES: &str = "standbyctl=info,standby_assignor=info";

/// `RUST_LOG` wins as-is; otherwise fall back to the defaults.
fn log_filter(rust_log: Option<&str>) -> anyhow::Result<EnvFilter> {
    let directives = match rust_log {
        Some(directives) if !directives.trim().is_empty() => directives,
        _ => DEFAULT_LOG_DIRECTIVES,
    };
    Ok(EnvFilter::try_new(directives)?)
}

fn main() -> anyhow::Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(rust_log.as_deref())?)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Assign {
            snapshot,
            config,
            replicas,
            max_tasks,
            format,
        } => {
            let overrides = commands::assign::Overrides { replicas, max_tasks };
            commands::assign::assign(&snapshot, config.as_deref(), overrides, &format)
        }
        Commands::Check { snapshot } => commands::assign::check(&snapshot),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_is_kept_verbatim() {
        let filter = log_filter(Some("standby_assignor=debug")).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("standby_assignor=debug"), "{rendered}");
        assert!(!rendered.contains("standby_assignor=warn"), "{rendered}");
    }

    #[test]
    fn test_defaults_when_rust_log_unset() {
        for unset in [None, Some(""), Some("  ")] {
            let rendered = log_filter(unset).unwrap().to_string();
            assert!(rendered.contains("standbyctl=info"), "{rendered}");
            assert!(rendered.contains("standby_assignor=info"), "{rendered}");
        }
    }

    #[test]
    fn test_invalid_rust_log_is_an_error() {
        assert!(log_filter(Some("standby_assignor=notalevel")).is_err());
    }
}
