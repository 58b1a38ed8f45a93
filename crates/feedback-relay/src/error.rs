//! Error types for the feedback relay

use lambda_http::http::StatusCode;
use thiserror::Error;

use crate::types::ValidationError;

/// Message returned to the caller for any failure that is not the caller's to fix
pub const INTERNAL_ERROR_MESSAGE: &str = "Erro interno do servidor. Tente novamente mais tarde.";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Método não permitido. Use POST.")]
    MethodNotAllowed,

    #[error("JSON inválido no body da requisição")]
    InvalidJson(#[source] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Missing SMTP credential or recipient. Kept as a `400` for
    /// compatibility with the existing frontend.
    #[error("Configuração SMTP incompleta - {0}")]
    Config(&'static str),

    #[error("SMTP delivery failed: {0:#}")]
    Transport(#[source] anyhow::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::InvalidJson(_) | RelayError::Validation(_) | RelayError::Config(_) => {
                StatusCode::BAD_REQUEST
            }
            RelayError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the caller. Transport detail stays server-side.
    pub fn public_message(&self) -> String {
        match self {
            RelayError::Transport(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}
