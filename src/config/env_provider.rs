#[cfg(test)]
use std::collections::HashMap;

/// Source of environment variables
///
/// Settings read through this trait so tests can supply their own values
/// without touching the process environment.
pub trait EnvironmentProvider: Send + Sync {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed variable set for tests
#[cfg(test)]
#[derive(Default)]
pub struct MockEnvironment(HashMap<String, String>);

#[cfg(test)]
impl MockEnvironment {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

#[cfg(test)]
impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_environment_returns_configured_values() {
        let provider = MockEnvironment::from_pairs(&[
            ("SMTP_HOST", "mail.example.com"),
            ("SITE_URL", "https://help.example.com"),
        ]);

        assert_eq!(provider.get_var("SMTP_HOST").as_deref(), Some("mail.example.com"));
        assert_eq!(provider.get_var("SITE_URL").as_deref(), Some("https://help.example.com"));
        assert_eq!(provider.get_var("SMTP_USERNAME"), None);
    }

    #[test]
    fn test_system_environment_missing_var() {
        assert_eq!(SystemEnvironment.get_var("HELPDESK_SURELY_UNSET_VARIABLE_7731"), None);
    }
}
