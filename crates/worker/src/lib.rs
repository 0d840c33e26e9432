//! Roster job runner.
//!
//! Consumes [`JobEnvelope`](roster_events::JobEnvelope)s from the in-process
//! queue and executes them, retrying failures with backoff:
//!
//! - [`JobRunner`]: the consume/execute/retry loop.
//! - [`Mailer`]: the seam welcome emails are sent through, with an SMTP
//!   implementation ([`SmtpMailer`]) and a log-only one ([`LogMailer`]).
//! - [`WorkerConfig`]: retry settings loaded from the environment.

pub mod config;
pub mod mailer;
pub mod runner;

pub use config::WorkerConfig;
pub use mailer::{EmailConfig, LogMailer, MailError, Mailer, SmtpMailer};
pub use runner::{JobError, JobOutcome, JobRunner};
