//! HTTP handling for the feedback endpoint
//!
//! - `OPTIONS` - CORS preflight, `204`
//! - `POST` - validate and relay a feedback submission
//! - anything else - `405`

use std::sync::Arc;

use chrono::Utc;
use lambda_http::{
    http::{
        header::{
            HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
        },
        Method, StatusCode,
    },
    Body, Request, Response,
};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::error::RelayError;
use crate::smtp::Mailer;
use crate::template::compose_message;
use crate::types::{ApiResponse, FeedbackSubmission};
use crate::RelayConfig;

pub const SUCCESS_MESSAGE: &str = "Feedback enviado com sucesso!";

const ALLOW_HEADERS: &str = "Content-Type";
const ALLOW_METHODS: &str = "POST, OPTIONS";

/// The feedback endpoint: configuration plus a mailer, shared across invocations
pub struct FeedbackRelay {
    config: RelayConfig,
    mailer: Arc<dyn Mailer>,
    allowed_origin: HeaderValue,
}

impl FeedbackRelay {
    pub fn new(config: RelayConfig, mailer: Arc<dyn Mailer>) -> Self {
        let allowed_origin = HeaderValue::from_str(&config.allowed_origin).unwrap_or_else(|_| {
            warn!(origin = %config.allowed_origin, "Invalid ALLOWED_ORIGIN, using *");
            HeaderValue::from_static("*")
        });

        Self {
            config,
            mailer,
            allowed_origin,
        }
    }

    /// Handle one request. Never fails: every error becomes a response.
    #[instrument(skip_all, fields(method = %event.method()))]
    pub async fn handle(&self, event: Request) -> Response<Body> {
        let response = match event.method() {
            &Method::OPTIONS => empty_response(StatusCode::NO_CONTENT),
            &Method::POST => match self.relay(event.body()).await {
                Ok(()) => json_response(StatusCode::OK, &ApiResponse::ok(SUCCESS_MESSAGE)),
                Err(e) => error_response(e),
            },
            method => {
                warn!(method = %method, "Method not allowed");
                error_response(RelayError::MethodNotAllowed)
            }
        };

        self.with_cors(response)
    }

    /// Validate, compose and deliver one submission
    async fn relay(&self, body: &Body) -> Result<(), RelayError> {
        let submission = FeedbackSubmission::parse(body.as_ref())?;
        let settings = self.config.smtp_settings()?;
        let message = compose_message(&submission, &settings, Utc::now());

        self.mailer
            .send(&settings, &message)
            .await
            .map_err(RelayError::Transport)?;

        info!(
            recipient = %message.to,
            subject = %message.subject,
            sender_name = %submission.user_name(),
            sender_email = %submission.user_email(),
            "Feedback email sent"
        );
        Ok(())
    }

    fn with_cors(&self, mut response: Response<Body>) -> Response<Body> {
        let headers = response.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allowed_origin.clone());
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        response
    }
}

fn error_response(err: RelayError) -> Response<Body> {
    let status = err.status();
    if status.is_server_error() {
        error!(error = %err, "Failed to send feedback");
    } else {
        warn!(status = status.as_u16(), reason = %err, "Rejected feedback request");
    }
    json_response(status, &ApiResponse::error(err.public_message()))
}

/// Create a JSON response
fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Body> {
    let json = serde_json::to_string(body).unwrap_or_default();
    let mut response = Response::new(Body::from(json));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

fn empty_response(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::Empty);
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_response_shape() {
        let response = json_response(StatusCode::OK, &ApiResponse::ok(SUCCESS_MESSAGE));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let body: ApiResponse = serde_json::from_slice(response.body().as_ref()).unwrap();
        assert_eq!(body, ApiResponse::ok(SUCCESS_MESSAGE));
    }

    #[test]
    fn test_error_response_hides_transport_detail() {
        let response = error_response(RelayError::Transport(anyhow::anyhow!(
            "535 Authentication Failed"
        )));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let raw = String::from_utf8_lossy(response.body().as_ref()).to_string();
        assert!(!raw.contains("535"));
    }

    #[test]
    fn test_invalid_origin_falls_back_to_wildcard() {
        struct NoopMailer;

        #[async_trait::async_trait]
        impl Mailer for NoopMailer {
            async fn send(
                &self,
                _: &crate::SmtpSettings,
                _: &crate::OutboundMessage,
            ) -> anyhow::Result<()> {
                Ok(())
            }
        }

        let config = RelayConfig {
            allowed_origin: "bad\norigin".to_string(),
            ..RelayConfig::default()
        };
        let relay = FeedbackRelay::new(config, Arc::new(NoopMailer));
        let response = relay.with_cors(empty_response(StatusCode::NO_CONTENT));
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
