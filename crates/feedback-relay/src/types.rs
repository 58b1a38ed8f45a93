//! Feedback request/response structures

use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_EMAIL: &str = "nao-informado@email.com";
pub const DEFAULT_USER_NAME: &str = "Usuário";
pub const DEFAULT_FEEDBACK_TYPE: &str = "Feedback";

/// Raw JSON body as sent by the frontend feedback form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackPayload {
    #[serde(default)]
    pub subject: Option<String>,

    #[serde(default)]
    pub comment: Option<String>,

    /// Submitter email address
    #[serde(default, rename = "from")]
    pub user_email: Option<String>,

    /// Submitter display name
    #[serde(default, rename = "name")]
    pub user_name: Option<String>,

    /// Free-form category, e.g. "Crítica", "Sugestão", "Bug Report"
    #[serde(default, rename = "type")]
    pub feedback_type: Option<String>,
}

/// A validated feedback submission
///
/// Subject and comment are guaranteed non-blank. Optional fields have had
/// their defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackSubmission {
    subject: String,
    comment: String,
    user_email: String,
    user_name: String,
    feedback_type: String,
    email_provided: bool,
}

impl FeedbackSubmission {
    /// Validate a parsed payload. Subject is checked before comment.
    pub fn from_payload(payload: FeedbackPayload) -> Result<Self, ValidationError> {
        let subject = non_blank(payload.subject).ok_or(ValidationError::MissingSubject)?;
        let comment = non_blank(payload.comment).ok_or(ValidationError::MissingComment)?;
        let user_email = non_blank(payload.user_email);
        let email_provided = user_email.is_some();

        Ok(Self {
            subject,
            comment,
            user_email: user_email.unwrap_or_else(|| DEFAULT_USER_EMAIL.to_string()),
            user_name: non_blank(payload.user_name)
                .unwrap_or_else(|| DEFAULT_USER_NAME.to_string()),
            feedback_type: non_blank(payload.feedback_type)
                .unwrap_or_else(|| DEFAULT_FEEDBACK_TYPE.to_string()),
            email_provided,
        })
    }

    /// Parse and validate a raw request body
    pub fn parse(body: &[u8]) -> Result<Self, crate::RelayError> {
        if body.is_empty() {
            return Err(ValidationError::EmptyBody.into());
        }
        // Derived structs also deserialize from arrays; only objects are payloads
        let object: serde_json::Map<String, serde_json::Value> =
            serde_json::from_slice(body).map_err(crate::RelayError::InvalidJson)?;
        let payload: FeedbackPayload = serde_json::from_value(serde_json::Value::Object(object))
            .map_err(crate::RelayError::InvalidJson)?;
        Ok(Self::from_payload(payload)?)
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn user_email(&self) -> &str {
        &self.user_email
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn feedback_type(&self) -> &str {
        &self.feedback_type
    }

    /// Submitter address usable as `Reply-To`, if one was given and is well formed
    pub fn reply_to(&self) -> Option<&str> {
        (self.email_provided && email_address::EmailAddress::is_valid(&self.user_email))
            .then_some(self.user_email.as_str())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Body da requisição está vazio")]
    EmptyBody,

    #[error("Assunto é obrigatório")]
    MissingSubject,

    #[error("Comentário é obrigatório")]
    MissingComment,
}

/// JSON body of every non-preflight response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
