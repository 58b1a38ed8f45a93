//! AWS Lambda handler for the feedback relay
//!
//! Every request, regardless of path, goes through [`FeedbackRelay::handle`]:
//! - OPTIONS - CORS preflight
//! - POST - Send a feedback email
//!
//! ## Deployment
//!
//! ```bash
//! # Install cargo-lambda
//! cargo install cargo-lambda
//!
//! # Build for ARM64
//! cargo lambda build --release --arm64 -p feedback-relay
//!
//! # Deploy with a function URL
//! cargo lambda deploy feedback-relay --enable-function-url \
//!   --env-var SMTP_PASSWORD=... --env-var ALLOWED_ORIGIN=https://recebimentosmart.com.br
//! ```

use std::sync::Arc;

use feedback_relay::{FeedbackRelay, RelayConfig, SmtpMailer};
use lambda_http::{run, service_fn, Error, Request};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Local development: cargo lambda watch picks up .env
    dotenvy::dotenv().ok();

    // CloudWatch adds its own timestamps and does not render ANSI colors
    tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_current_span(false)
        .without_time()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("feedback_relay=info".parse()?),
        )
        .init();

    let config = RelayConfig::from_env();
    info!(
        version = feedback_relay::VERSION,
        smtp_host = %config.smtp_host,
        smtp_port = config.smtp_port,
        allowed_origin = %config.allowed_origin,
        "Starting feedback relay Lambda"
    );
    if config.smtp_password.is_none() {
        warn!("SMTP_PASSWORD is not set; every submission will be rejected");
    }

    let relay = Arc::new(FeedbackRelay::new(config, Arc::new(SmtpMailer::new())));

    run(service_fn(move |event: Request| {
        let relay = Arc::clone(&relay);
        async move { Ok::<_, Error>(relay.handle(event).await) }
    }))
    .await
}
