use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use skillgate::{server, App, DebugHandler, RequestVerifier, SkillConfig, StrictHandler};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod args;
mod demo;

use args::Args;
use demo::DemoSkill;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn config_from(args: &Args) -> SkillConfig {
    let mut config = SkillConfig::from_env();
    if let Some(id) = &args.application_id {
        config = config.with_application_id(id.clone());
    }
    if let Some(secs) = args.max_clock_skew_secs {
        config = config.with_max_clock_skew(Duration::from_secs(secs));
    }
    if let Some(secs) = args.cert_fetch_timeout_secs {
        config = config.with_cert_fetch_timeout(Duration::from_secs(secs));
    }
    if let Some(limit) = args.max_body_bytes {
        config = config.with_max_body_bytes(limit);
    }
    config
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = config_from(&args);
    if config.application_id.is_empty() {
        warn!("no application id configured; every request will be rejected");
    }

    let app = App::new(config.application_id.clone(), Arc::new(DemoSkill));
    let handler = Arc::new(DebugHandler::new(StrictHandler::new(app, &config)));
    let mut router = server::skill_router(handler);

    if args.no_verify {
        warn!("request signature verification disabled");
    } else {
        let verifier = RequestVerifier::over_https(config.cert_fetch_timeout)
            .context("failed to build certificate fetcher")?
            .with_max_body_bytes(config.max_body_bytes);
        router = server::with_request_verification(router, Arc::new(verifier));
    }

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    info!(
        addr = %args.listen,
        application_id = %config.application_id,
        max_clock_skew_secs = config.max_clock_skew.as_secs(),
        "skill endpoint listening"
    );

    axum::serve(listener, router).await.context("server error")
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.log_json);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            ExitCode::from(2)
        }
    }
}
