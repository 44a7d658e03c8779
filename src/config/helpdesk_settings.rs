use crate::config::config_spec::{validators, ConfigSpec};
use crate::config::errors::ConfigError;
use crate::config::{EnvironmentProvider, SystemEnvironment};

pub const DEFAULT_FROM_EMAIL: &str = "helpdesk@localhost";
pub const DEFAULT_ESCALATION_CONTACT: &str = "escalations@helpdesk.local";
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TICKET_ID_PREFIX: &str = "JIAI";
pub const DEFAULT_MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_SMTP_PORT: u16 = 587;

/// Outbound mail relay; absent means mail is only written to the log
#[derive(Debug, Clone, PartialEq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
}

/// Business settings for tickets, attachments and notifications
#[derive(Debug, Clone)]
pub struct HelpdeskSettings {
    default_from_email: String,
    escalation_contact_email: String,
    site_url: String,
    ticket_id_prefix: String,
    max_attachment_bytes: u64,
    smtp: Option<SmtpSettings>,
}

fn validate_ticket_prefix(value: &str) -> Result<(), String> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(format!("Ticket ID prefix must be alphanumeric, got '{}'", value));
    }
    Ok(())
}

impl HelpdeskSettings {
    pub fn from_env_provider(env: &dyn EnvironmentProvider) -> Result<Self, ConfigError> {
        let smtp = match ConfigSpec::new(env, "SMTP_HOST")
            .validator(validators::host_address)
            .load_optional()?
        {
            Some(host) => Some(SmtpSettings {
                host,
                port: ConfigSpec::new(env, "SMTP_PORT")
                    .default_value(DEFAULT_SMTP_PORT)
                    .validator(validators::port)
                    .load_parsed()?,
                username: ConfigSpec::new(env, "SMTP_USERNAME").load_optional()?,
            }),
            None => None,
        };

        let site_url = ConfigSpec::new(env, "SITE_URL")
            .default_value(DEFAULT_SITE_URL)
            .min_length(1)
            .load()?;

        Ok(Self {
            default_from_email: ConfigSpec::new(env, "DEFAULT_FROM_EMAIL")
                .default_value(DEFAULT_FROM_EMAIL)
                .validator(validators::email_address)
                .load()?,
            escalation_contact_email: ConfigSpec::new(env, "ESCALATION_CONTACT_EMAIL")
                .default_value(DEFAULT_ESCALATION_CONTACT)
                .validator(validators::email_address)
                .load()?,
            site_url: site_url.trim_end_matches('/').to_string(),
            ticket_id_prefix: ConfigSpec::new(env, "TICKET_ID_PREFIX")
                .default_value(DEFAULT_TICKET_ID_PREFIX)
                .validator(validate_ticket_prefix)
                .load()?,
            max_attachment_bytes: ConfigSpec::new(env, "MAX_ATTACHMENT_BYTES")
                .default_value(DEFAULT_MAX_ATTACHMENT_BYTES)
                .validator(validators::positive_integer)
                .load_parsed()?,
            smtp,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_provider(&SystemEnvironment)
    }

    pub fn default_from_email(&self) -> &str {
        &self.default_from_email
    }

    /// Recipient of the copy sent on every escalation
    pub fn escalation_contact_email(&self) -> &str {
        &self.escalation_contact_email
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn ticket_id_prefix(&self) -> &str {
        &self.ticket_id_prefix
    }

    pub fn max_attachment_bytes(&self) -> u64 {
        self.max_attachment_bytes
    }

    pub fn smtp(&self) -> Option<&SmtpSettings> {
        self.smtp.as_ref()
    }

    pub fn with_escalation_contact(mut self, email: &str) -> Self {
        self.escalation_contact_email = email.to_string();
        self
    }
}

impl Default for HelpdeskSettings {
    fn default() -> Self {
        Self {
            default_from_email: DEFAULT_FROM_EMAIL.to_string(),
            escalation_contact_email: DEFAULT_ESCALATION_CONTACT.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            ticket_id_prefix: DEFAULT_TICKET_ID_PREFIX.to_string(),
            max_attachment_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
            smtp: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockEnvironment;

    fn settings_from(vars: &[(&str, &str)]) -> Result<HelpdeskSettings, ConfigError> {
        HelpdeskSettings::from_env_provider(&MockEnvironment::from_pairs(vars))
    }

    #[test]
    fn test_defaults_match_default_impl() {
        let loaded = settings_from(&[]).unwrap();
        let defaults = HelpdeskSettings::default();

        assert_eq!(loaded.default_from_email(), defaults.default_from_email());
        assert_eq!(loaded.escalation_contact_email(), DEFAULT_ESCALATION_CONTACT);
        assert_eq!(loaded.ticket_id_prefix(), "JIAI");
        assert_eq!(loaded.max_attachment_bytes(), 10 * 1024 * 1024);
        assert!(loaded.smtp().is_none());
    }

    #[test]
    fn test_escalation_contact_is_configurable() {
        let loaded = settings_from(&[("ESCALATION_CONTACT_EMAIL", "oncall@example.com")]).unwrap();
        assert_eq!(loaded.escalation_contact_email(), "oncall@example.com");
    }

    #[test]
    fn test_invalid_escalation_contact_rejected() {
        assert!(settings_from(&[("ESCALATION_CONTACT_EMAIL", "nobody")]).is_err());
    }

    #[test]
    fn test_smtp_settings_loaded_when_host_present() {
        let loaded = settings_from(&[
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "2525"),
            ("SMTP_USERNAME", "mailer"),
        ])
        .unwrap();

        assert_eq!(
            loaded.smtp(),
            Some(&SmtpSettings {
                host: "smtp.example.com".to_string(),
                port: 2525,
                username: Some("mailer".to_string()),
            })
        );
    }

    #[test]
    fn test_smtp_port_defaults_to_submission_port() {
        let loaded = settings_from(&[("SMTP_HOST", "smtp.example.com")]).unwrap();
        assert_eq!(loaded.smtp().map(|s| s.port), Some(587));
    }

    #[test]
    fn test_ticket_prefix_validation() {
        assert_eq!(settings_from(&[("TICKET_ID_PREFIX", "HD")]).unwrap().ticket_id_prefix(), "HD");
        assert!(settings_from(&[("TICKET_ID_PREFIX", "HD-")]).is_err());
    }

    #[test]
    fn test_max_attachment_bytes_must_be_positive() {
        assert!(settings_from(&[("MAX_ATTACHMENT_BYTES", "0")]).is_err());
        assert_eq!(
            settings_from(&[("MAX_ATTACHMENT_BYTES", "2048")]).unwrap().max_attachment_bytes(),
            2048
        );
    }

    #[test]
    fn test_site_url_trailing_slash_trimmed() {
        let loaded = settings_from(&[("SITE_URL", "https://help.example.com/")]).unwrap();
        assert_eq!(loaded.site_url(), "https://help.example.com");
    }
}
