use std::net::SocketAddr;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "skillgate-server",
    version,
    about = "Serve a demo skill behind signed-request authentication"
)]
pub struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// Application id requests must be addressed to
    #[arg(long, env = "SKILLGATE_APPLICATION_ID")]
    pub application_id: Option<String>,

    /// Request timestamp tolerance in seconds
    #[arg(long)]
    pub max_clock_skew_secs: Option<u64>,

    /// Signing certificate fetch deadline in seconds
    #[arg(long)]
    pub cert_fetch_timeout_secs: Option<u64>,

    /// Largest accepted request body in bytes
    #[arg(long)]
    pub max_body_bytes: Option<usize>,

    /// Skip signature verification (local testing only)
    #[arg(long)]
    pub no_verify: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}
