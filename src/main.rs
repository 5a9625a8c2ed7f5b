use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use http_poller::Settings;
use std::io;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

mod cli;

#[derive(Parser)]
#[command(name = "http-poller")]
#[command(author, version, about = "Poll an HTTP endpoint at a fixed interval")]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll an endpoint and print every payload
    Watch {
        /// Endpoint URL (defaults to `endpoint` from the config file)
        endpoint: Option<String>,

        /// Delay between the end of one request and the next, in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Treat response bodies as text instead of JSON
        #[arg(long)]
        text: bool,

        /// Exit after the first successful payload
        #[arg(long)]
        once: bool,

        /// Pretty-print JSON payloads
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

fn init_logging(json: bool) -> FilterHandle {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(io::stderr)))
        .init();

    handle
}

/// Level implied by `debug = true` in the config file; `RUST_LOG` wins.
fn settings_level(debug: bool, rust_log_set: bool) -> Option<&'static str> {
    (debug && !rust_log_set).then_some("debug")
}

fn apply_settings_level(handle: &FilterHandle, settings: &Settings) {
    let rust_log_set = std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();
    if let Some(level) = settings_level(settings.debug, rust_log_set) {
        if let Err(e) = handle.reload(EnvFilter::new(level)) {
            tracing::warn!(error = %e, "Failed to apply log level from config");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            endpoint,
            interval_ms,
            text,
            once,
            json,
        } => {
            let filter = init_logging(cli.log_json);
            let settings = Settings::load()?;
            apply_settings_level(&filter, &settings);
            let args = cli::watch::WatchArgs {
                endpoint,
                interval_ms,
                text,
                once,
                json,
            };
            cli::watch::run(args, settings).await
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watch() {
        let cli = Cli::try_parse_from([
            "http-poller",
            "watch",
            "http://x/status",
            "--interval-ms",
            "100",
            "--once",
            "--log-json",
        ])
        .unwrap();

        assert!(cli.log_json);
        match cli.command {
            Commands::Watch {
                endpoint,
                interval_ms,
                once,
                text,
                ..
            } => {
                assert_eq!(endpoint.as_deref(), Some("http://x/status"));
                assert_eq!(interval_ms, Some(100));
                assert!(once);
                assert!(!text);
            }
            Commands::Completions { .. } => panic!("expected watch"),
        }
    }

    #[test]
    fn test_log_json_defaults_off() {
        let cli = Cli::try_parse_from(["http-poller", "watch"]).unwrap();
        assert!(!cli.log_json);
    }

    #[test]
    fn test_settings_level() {
        assert_eq!(settings_level(true, false), Some("debug"));
        assert_eq!(settings_level(true, true), None);
        assert_eq!(settings_level(false, false), None);
    }
}
