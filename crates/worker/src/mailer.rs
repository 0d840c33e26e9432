//! Welcome email delivery.
//!
//! [`SmtpMailer`] wraps the `lettre` async SMTP transport. Configuration is
//! loaded from environment variables; if `SMTP_HOST` is not set,
//! [`EmailConfig::from_env`] returns `None` and [`LogMailer`] should be used
//! instead, which only logs what would have been sent.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use roster_events::WelcomeEmailJob;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// The SMTP transport could not be configured.
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The server could not be reached or answered with a temporary failure.
    #[error("Mail server unavailable: {0}")]
    Unavailable(String),

    /// The server permanently refused the message.
    #[error("Mail server rejected message: {0}")]
    Rejected(String),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

impl MailError {
    /// Whether retrying the same job could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Split a send failure into a retryable or a permanent error.
    fn from_send(err: lettre::transport::smtp::Error) -> Self {
        if err.is_permanent() {
            Self::Rejected(err.to_string())
        } else {
            Self::Unavailable(err.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@roster.local";

/// Default sender display name when `SMTP_FROM_NAME` is not set.
const DEFAULT_FROM_NAME: &str = "Roster";

/// Configuration for the SMTP mailer.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Display name for the "From" header, also used in the subject line.
    pub from_name: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is unset or blank, signalling that SMTP
    /// delivery is not configured. Blank optional variables fall back to
    /// their defaults.
    ///
    /// | Variable         | Required | Default                 |
    /// |------------------|----------|-------------------------|
    /// | `SMTP_HOST`      | yes      | -                       |
    /// | `SMTP_PORT`      | no       | `587`                   |
    /// | `SMTP_FROM`      | no       | `noreply@roster.local`  |
    /// | `SMTP_FROM_NAME` | no       | `Roster`                |
    /// | `SMTP_USER`      | no       | -                       |
    /// | `SMTP_PASSWORD`  | no       | -                       |
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let smtp_host = var("SMTP_HOST")?;
        Some(Self {
            smtp_host,
            smtp_port: var("SMTP_PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: var("SMTP_FROM")
                .unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
            from_name: var("SMTP_FROM_NAME")
                .unwrap_or_else(|| DEFAULT_FROM_NAME.to_string()),
            smtp_user: var("SMTP_USER"),
            smtp_password: var("SMTP_PASSWORD"),
        })
    }
}

// ---------------------------------------------------------------------------
// Message rendering
// ---------------------------------------------------------------------------

/// Assemble the plain-text welcome email for `job`.
pub fn welcome_message(
    from_address: &str,
    from_name: &str,
    job: &WelcomeEmailJob,
) -> Result<Message, MailError> {
    let from = Mailbox::new(Some(from_name.to_string()), from_address.parse()?);
    let to = Mailbox::new(
        Some(job.recipient_name.clone()),
        job.recipient_email.parse()?,
    );

    let subject = format!("Welcome to {from_name}");
    let body = format!(
        "Hi {},\n\nThanks for signing up. Your account is ready to use.\n\nThe {} team",
        job.recipient_name, from_name
    );

    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body)
        .map_err(|e| MailError::Build(e.to_string()))
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// Sends the emails produced by queued jobs.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_welcome(&self, job: &WelcomeEmailJob) -> Result<(), MailError>;
}

/// Sends welcome emails via SMTP.
pub struct SmtpMailer {
    config: EmailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the SMTP transport for `config`. No connection is opened until
    /// the first send.
    pub fn new(config: EmailConfig) -> Result<Self, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            config,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_welcome(&self, job: &WelcomeEmailJob) -> Result<(), MailError> {
        let email = welcome_message(&self.config.from_address, &self.config.from_name, job)?;
        self.transport
            .send(email)
            .await
            .map_err(MailError::from_send)?;

        tracing::info!(to = %job.recipient_email, "Welcome email sent");
        Ok(())
    }
}

/// Logs welcome emails instead of sending them.
///
/// Used when no SMTP server is configured, e.g. in local development.
pub struct LogMailer {
    from_address: String,
    from_name: String,
}

impl LogMailer {
    pub fn new() -> Self {
        Self {
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
            from_name: DEFAULT_FROM_NAME.to_string(),
        }
    }
}

impl Default for LogMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_welcome(&self, job: &WelcomeEmailJob) -> Result<(), MailError> {
        let email = welcome_message(&self.from_address, &self.from_name, job)?;
        let formatted = String::from_utf8_lossy(&email.formatted()).into_owned();

        tracing::info!(
            to = %job.recipient_email,
            message = %formatted,
            "Welcome email (log mailer, not sent)"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
