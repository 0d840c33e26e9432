//! Third-party service credentials and settings.
//!
//! [`ServicesConfig`] is built once at process start from environment
//! variables. Every default lives in this loader; callers never supply their
//! own fallbacks.
//!
//! | Variable                         | Setting              | Default                    |
//! |----------------------------------|----------------------|----------------------------|
//! | `POSTMARK_TOKEN`                 | `postmark.token`     | -                          |
//! | `RESEND_KEY`                     | `resend.key`         | -                          |
//! | `AWS_ACCESS_KEY_ID`              | `ses.key`            | -                          |
//! | `AWS_SECRET_ACCESS_KEY`          | `ses.secret`         | -                          |
//! | `AWS_DEFAULT_REGION`             | `ses.region`         | `us-east-1`                |
//! | `MAILGUN_DOMAIN`                 | `mailgun.domain`     | -                          |
//! | `MAILGUN_SECRET`                 | `mailgun.secret`     | -                          |
//! | `MAILGUN_ENDPOINT`               | `mailgun.endpoint`   | `api.mailgun.net`          |
//! | `MAILGUN_SCHEME`                 | `mailgun.scheme`     | `https`                    |
//! | `SLACK_BOT_USER_OAUTH_TOKEN`     | `slack.bot_token`    | -                          |
//! | `SLACK_BOT_USER_DEFAULT_CHANNEL` | `slack.channel`      | -                          |
//! | `OPENAI_API_KEY`                 | `openai.api_key`     | -                          |
//! | `OPENAI_ORGANIZATION`            | `openai.organization`| -                          |
//! | `OPENAI_MODEL`                   | `openai.model`       | `gpt-4o-mini`              |
//! | `ANTHROPIC_API_KEY`              | `anthropic.api_key`  | -                          |
//! | `ANTHROPIC_MODEL`                | `anthropic.model`    | `claude-3-5-sonnet-latest` |

use serde::Serialize;

/// Default AWS region for SES.
pub const DEFAULT_SES_REGION: &str = "us-east-1";

/// Default Mailgun API host.
pub const DEFAULT_MAILGUN_ENDPOINT: &str = "api.mailgun.net";

/// Default Mailgun URL scheme.
pub const DEFAULT_MAILGUN_SCHEME: &str = "https";

/// Default OpenAI chat model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Default Anthropic chat model.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-latest";

/// Placeholder shown instead of a secret in [`ServicesConfig::redacted`].
const REDACTED: &str = "********";

// ---------------------------------------------------------------------------
// Per-service settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostmarkSettings {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResendSettings {
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SesSettings {
    pub key: Option<String>,
    pub secret: Option<String>,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailgunSettings {
    pub domain: Option<String>,
    pub secret: Option<String>,
    pub endpoint: String,
    pub scheme: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlackSettings {
    pub bot_token: Option<String>,
    pub channel: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub organization: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnthropicSettings {
    pub api_key: Option<String>,
    pub model: String,
}

// ---------------------------------------------------------------------------
// ServicesConfig
// ---------------------------------------------------------------------------

/// Read-only settings for every third-party service the application talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicesConfig {
    pub postmark: PostmarkSettings,
    pub resend: ResendSettings,
    pub ses: SesSettings,
    pub mailgun: MailgunSettings,
    pub slack: SlackSettings,
    pub openai: OpenAiSettings,
    pub anthropic: AnthropicSettings,
}

impl ServicesConfig {
    /// Load settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones, so a blank
    /// `AWS_DEFAULT_REGION=` still yields the default region.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let var_or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        Self {
            postmark: PostmarkSettings {
                token: var("POSTMARK_TOKEN"),
            },
            resend: ResendSettings {
                key: var("RESEND_KEY"),
            },
            ses: SesSettings {
                key: var("AWS_ACCESS_KEY_ID"),
                secret: var("AWS_SECRET_ACCESS_KEY"),
                region: var_or("AWS_DEFAULT_REGION", DEFAULT_SES_REGION),
            },
            mailgun: MailgunSettings {
                domain: var("MAILGUN_DOMAIN"),
                secret: var("MAILGUN_SECRET"),
                endpoint: var_or("MAILGUN_ENDPOINT", DEFAULT_MAILGUN_ENDPOINT),
                scheme: var_or("MAILGUN_SCHEME", DEFAULT_MAILGUN_SCHEME),
            },
            slack: SlackSettings {
                bot_token: var("SLACK_BOT_USER_OAUTH_TOKEN"),
                channel: var("SLACK_BOT_USER_DEFAULT_CHANNEL"),
            },
            openai: OpenAiSettings {
                api_key: var("OPENAI_API_KEY"),
                organization: var("OPENAI_ORGANIZATION"),
                model: var_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            },
            anthropic: AnthropicSettings {
                api_key: var("ANTHROPIC_API_KEY"),
                model: var_or("ANTHROPIC_MODEL", DEFAULT_ANTHROPIC_MODEL),
            },
        }
    }

    /// Look up a single setting by its dotted `service.key` path.
    ///
    /// Returns `None` for unknown paths and for optional settings that are
    /// not configured. Settings with a default always return a value.
    pub fn get(&self, path: &str) -> Option<&str> {
        match path {
            "postmark.token" => self.postmark.token.as_deref(),
            "resend.key" => self.resend.key.as_deref(),
            "ses.key" => self.ses.key.as_deref(),
            "ses.secret" => self.ses.secret.as_deref(),
            "ses.region" => Some(self.ses.region.as_str()),
            "mailgun.domain" => self.mailgun.domain.as_deref(),
            "mailgun.secret" => self.mailgun.secret.as_deref(),
            "mailgun.endpoint" => Some(self.mailgun.endpoint.as_str()),
            "mailgun.scheme" => Some(self.mailgun.scheme.as_str()),
            "slack.bot_token" => self.slack.bot_token.as_deref(),
            "slack.channel" => self.slack.channel.as_deref(),
            "openai.api_key" => self.openai.api_key.as_deref(),
            "openai.organization" => self.openai.organization.as_deref(),
            "openai.model" => Some(self.openai.model.as_str()),
            "anthropic.api_key" => self.anthropic.api_key.as_deref(),
            "anthropic.model" => Some(self.anthropic.model.as_str()),
            _ => None,
        }
    }

    /// Names of the services whose credential is present.
    pub fn configured(&self) -> Vec<&'static str> {
        let checks = [
            ("postmark", self.postmark.token.is_some()),
            ("resend", self.resend.key.is_some()),
            ("ses", self.ses.key.is_some() && self.ses.secret.is_some()),
            ("mailgun", self.mailgun.domain.is_some() && self.mailgun.secret.is_some()),
            ("slack", self.slack.bot_token.is_some()),
            ("openai", self.openai.api_key.is_some()),
            ("anthropic", self.anthropic.api_key.is_some()),
        ];
        checks
            .into_iter()
            .filter_map(|(name, ok)| ok.then_some(name))
            .collect()
    }

    /// A JSON view of every setting with secrets masked.
    pub fn redacted(&self) -> serde_json::Value {
        serde_json::to_value(RedactedServices::from(self)).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Redacted view
// ---------------------------------------------------------------------------

fn mask(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| REDACTED)
}

#[derive(Serialize)]
struct RedactedServices {
    postmark: serde_json::Value,
    resend: serde_json::Value,
    ses: serde_json::Value,
    mailgun: serde_json::Value,
    slack: serde_json::Value,
    openai: serde_json::Value,
    anthropic: serde_json::Value,
    configured: Vec<&'static str>,
}

impl From<&ServicesConfig> for RedactedServices {
    fn from(c: &ServicesConfig) -> Self {
        use serde_json::json;
        Self {
            postmark: json!({ "token": mask(&c.postmark.token) }),
            resend: json!({ "key": mask(&c.resend.key) }),
            ses: json!({
                "key": mask(&c.ses.key),
                "secret": mask(&c.ses.secret),
                "region": c.ses.region,
            }),
            mailgun: json!({
                "domain": c.mailgun.domain,
                "secret": mask(&c.mailgun.secret),
                "endpoint": c.mailgun.endpoint,
                "scheme": c.mailgun.scheme,
            }),
            slack: json!({
                "bot_token": mask(&c.slack.bot_token),
                "channel": c.slack.channel,
            }),
            openai: json!({
                "api_key": mask(&c.openai.api_key),
                "organization": c.openai.organization,
                "model": c.openai.model,
            }),
            anthropic: json!({
                "api_key": mask(&c.anthropic.api_key),
                "model": c.anthropic.model,
            }),
            configured: c.configured(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> ServicesConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServicesConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn unset_variables_fall_back_to_defaults() {
        let config = load(&[]);
        assert_eq!(config.get("ses.region"), Some("us-east-1"));
        assert_eq!(config.get("mailgun.endpoint"), Some("api.mailgun.net"));
        assert_eq!(config.get("mailgun.scheme"), Some("https"));
        assert_eq!(config.get("openai.model"), Some(DEFAULT_OPENAI_MODEL));
        assert_eq!(config.get("anthropic.model"), Some(DEFAULT_ANTHROPIC_MODEL));
    }

    #[test]
    fn empty_variable_is_treated_as_unset() {
        let config = load(&[("AWS_DEFAULT_REGION", ""), ("POSTMARK_TOKEN", "  ")]);
        assert_eq!(config.get("ses.region"), Some("us-east-1"));
        assert_eq!(config.get("postmark.token"), None);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = load(&[("AWS_DEFAULT_REGION", "eu-west-2"), ("OPENAI_MODEL", "gpt-4.1")]);
        assert_eq!(config.ses.region, "eu-west-2");
        assert_eq!(config.get("openai.model"), Some("gpt-4.1"));
    }

    #[test]
    fn unknown_path_returns_none() {
        assert_eq!(load(&[]).get("ses.nope"), None);
        assert_eq!(load(&[]).get(""), None);
    }

    #[test]
    fn configured_requires_credentials() {
        let config = load(&[
            ("RESEND_KEY", "re_123"),
            ("AWS_ACCESS_KEY_ID", "AKIA"),
            ("ANTHROPIC_API_KEY", "sk-ant"),
        ]);
        // SES needs both key and secret.
        assert_eq!(config.configured(), vec!["resend", "anthropic"]);
    }

    #[test]
    fn redacted_masks_secrets_but_keeps_settings() {
        let config = load(&[
            ("MAILGUN_DOMAIN", "mg.example.com"),
            ("MAILGUN_SECRET", "key-abc"),
        ]);
        let view = config.redacted();
        assert_eq!(view["mailgun"]["domain"], "mg.example.com");
        assert_eq!(view["mailgun"]["secret"], REDACTED);
        assert!(view["postmark"]["token"].is_null());
        assert_eq!(view["ses"]["region"], "us-east-1");
        assert_eq!(view["configured"], serde_json::json!(["mailgun"]));
        assert!(!view.to_string().contains("key-abc"));
    }
}
