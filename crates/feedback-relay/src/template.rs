//! Outbound email composition

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};

use crate::smtp::SmtpSettings;
use crate::types::FeedbackSubmission;

/// Business timezone offset (Brasília, no DST)
const BUSINESS_UTC_OFFSET_SECS: i32 = -3 * 3600;
const BUSINESS_TZ_LABEL: &str = "BRT";

/// A fully composed message, ready to hand to a [`crate::Mailer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
}

/// Build the notification email for a submission
pub fn compose_message(
    submission: &FeedbackSubmission,
    settings: &SmtpSettings,
    now: DateTime<Utc>,
) -> OutboundMessage {
    let feedback_type = submission.feedback_type();
    let subject = submission.subject();

    let body = format!(
        "Novo feedback recebido do RecebimentoSmart:\n\
        \n\
        Tipo: {feedback_type}\n\
        Assunto: {subject}\n\
        \n\
        Comentário:\n\
        {comment}\n\
        \n\
        ---\n\
        Enviado por: {name}\n\
        E-mail: {email}\n\
        Data/Hora: {timestamp}\n",
        comment = submission.comment(),
        name = submission.user_name(),
        email = submission.user_email(),
        timestamp = format_timestamp(now),
    );

    OutboundMessage {
        from: settings.from_email.clone(),
        to: settings.recipient.clone(),
        reply_to: submission.reply_to().map(str::to_string),
        subject: format!("[{feedback_type}] {subject}"),
        body,
    }
}

/// Format as `DD/MM/YYYY HH:MM:SS BRT` in the business timezone
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    let local = business_offset().from_utc_datetime(&now.naive_utc());
    format!("{} {}", local.format("%d/%m/%Y %H:%M:%S"), BUSINESS_TZ_LABEL)
}

fn business_offset() -> FixedOffset {
    FixedOffset::east_opt(BUSINESS_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}
