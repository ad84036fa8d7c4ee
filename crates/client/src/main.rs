//! `wildcam-tv` -- headless stack viewer.
//!
//! Wires the selection state and stack pipeline to the HTTP backend,
//! applies an initial selection from the environment and logs every
//! update on the stack, frame-rate and loading channels until Ctrl-C.
//!
//! # Environment variables
//!
//! See [`ClientConfig::from_env`] for connection settings and
//! [`initial_selection`] for the selection fields (`DEPLOYMENT_ID`,
//! `PERIOD_START`, `PERIOD_END`, `INTERVAL_SECS`, `PHASE`, `FRAME_RATE`).

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wildcam_client::config::initial_selection;
use wildcam_client::{fallback_source, ClientConfig, StackApi};
use wildcam_events::SelectionState;
use wildcam_pipeline::{PipelineEvent, PipelineOutputs, StackPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "wildcam_tv=info,wildcam_pipeline=info,wildcam_client=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env()?;
    let selection = initial_selection(|key| std::env::var(key).ok())?;

    tracing::info!(
        api_url = %config.api_url,
        asset_path = %config.asset_path,
        timeout_secs = config.request_timeout_secs,
        "Starting wildcam-tv",
    );

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()?;
    let api = StackApi::with_client(client.clone(), config.api_url.clone());
    let pipeline =
        StackPipeline::new(Arc::new(api)).with_fallback(fallback_source(&config, client));
    let outputs = pipeline.outputs();

    if config.use_fallback {
        pipeline.load_fallback().await?;
    }

    let reporter = tokio::spawn(report(outputs));

    let state = SelectionState::new();
    let pipeline_task = pipeline.spawn(&state);
    state.update(selection);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    // Dropping the state closes the selection feed and stops the pipeline.
    drop(state);
    pipeline_task.await?;
    reporter.abort();
    Ok(())
}

/// Log every value published on the pipeline's channels, in publish order.
async fn report(outputs: PipelineOutputs) {
    let mut events = outputs.subscribe_all();

    while let Some(event) = events.recv().await {
        match event {
            PipelineEvent::Stack(stack) => match stack.time_range() {
                Some((first, last)) => tracing::info!(
                    images = stack.len(),
                    %first,
                    %last,
                    "Stack ready",
                ),
                None => tracing::info!(images = stack.len(), "Stack ready"),
            },
            PipelineEvent::FrameRate(fps) => tracing::info!(fps, "Frame rate"),
            PipelineEvent::Loading(busy) => tracing::info!(loading = busy, "Loading"),
        }
    }
}
