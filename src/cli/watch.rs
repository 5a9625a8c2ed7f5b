use anyhow::{Context, Result};
use http_poller::{HttpTransport, Payload, PollerBuilder, Settings};
use tokio::sync::mpsc;

pub struct WatchArgs {
    pub endpoint: Option<String>,
    pub interval_ms: Option<u64>,
    pub text: bool,
    pub once: bool,
    pub json: bool,
}

enum WatchEvent {
    Data(Payload),
    Error(String),
}

pub async fn run(args: WatchArgs, mut settings: Settings) -> Result<()> {
    apply_overrides(&mut settings, &args);
    settings.validate()?;

    let transport =
        HttpTransport::from_settings(&settings.http).context("Failed to build HTTP client")?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let error_tx = tx.clone();

    let mut builder = PollerBuilder::with_transport(transport)
        .with_settings(&settings.poll)
        .on_data(move |payload| {
            let _ = tx.send(WatchEvent::Data(payload));
        })
        .on_error(move |err| {
            let _ = error_tx.send(WatchEvent::Error(err.to_string()));
        });
    if let Some(endpoint) = settings.endpoint.clone() {
        builder = builder.endpoint(endpoint);
    }
    let poller = builder
        .build()
        .context("Pass an endpoint or set `endpoint` in the config file")?;

    tracing::info!(
        endpoint = poller.endpoint(),
        interval_ms = settings.poll.interval_ms,
        one_shot = settings.poll.one_shot,
        "Polling"
    );
    poller.start();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            Some(event) = rx.recv() => match event {
                WatchEvent::Data(payload) => {
                    println!("{}", render(&payload, args.json)?);
                    if settings.poll.one_shot {
                        break;
                    }
                }
                WatchEvent::Error(message) => eprintln!("error: {message}"),
            },
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted, stopping poller");
                break;
            }
        }
    }

    poller.stop();
    Ok(())
}

fn apply_overrides(settings: &mut Settings, args: &WatchArgs) {
    if let Some(endpoint) = &args.endpoint {
        settings.endpoint = Some(endpoint.clone());
    }
    if let Some(interval_ms) = args.interval_ms {
        settings.poll.interval_ms = interval_ms;
    }
    if args.text {
        settings.poll.text = true;
    }
    if args.once {
        settings.poll.one_shot = true;
    }
}

fn render(payload: &Payload, pretty: bool) -> Result<String> {
    Ok(match payload {
        Payload::Json(value) if pretty => serde_json::to_string_pretty(value)?,
        Payload::Json(value) => serde_json::to_string(value)?,
        Payload::Text(text) => text.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args() -> WatchArgs {
        WatchArgs {
            endpoint: None,
            interval_ms: None,
            text: false,
            once: false,
            json: false,
        }
    }

    #[test]
    fn test_flags_override_settings() {
        let mut settings = Settings::default();
        settings.endpoint = Some("http://from-config/status".to_string());

        let args = WatchArgs {
            endpoint: Some("http://from-flag/status".to_string()),
            interval_ms: Some(250),
            text: true,
            once: true,
            ..args()
        };
        apply_overrides(&mut settings, &args);

        assert_eq!(settings.endpoint.as_deref(), Some("http://from-flag/status"));
        assert_eq!(settings.poll.interval_ms, 250);
        assert!(settings.poll.text);
        assert!(settings.poll.one_shot);
    }

    #[test]
    fn test_config_values_kept_without_flags() {
        let mut settings = Settings::default();
        settings.endpoint = Some("http://from-config/status".to_string());
        settings.poll.one_shot = true;

        apply_overrides(&mut settings, &args());

        assert_eq!(settings.endpoint.as_deref(), Some("http://from-config/status"));
        assert_eq!(settings.poll.interval_ms, 3000);
        assert!(settings.poll.one_shot);
    }

    #[test]
    fn test_render() {
        let payload = Payload::Json(json!({"ok": true}));
        assert_eq!(render(&payload, false).unwrap(), r#"{"ok":true}"#);
        assert_eq!(render(&payload, true).unwrap(), "{\n  \"ok\": true\n}");

        let payload = Payload::Text("plain body".to_string());
        assert_eq!(render(&payload, true).unwrap(), "plain body");
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_reported() {
        let err = run(args(), Settings::default()).await.unwrap_err();
        assert!(err.to_string().contains("endpoint"));
    }
}
