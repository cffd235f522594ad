use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;

/// SMTP parameters read from `mailing_params.json`.
#[derive(Clone, Deserialize)]
pub struct MailSettings {
    pub sender: String,
    pub recipient: String,
    pub server: String,
    pub port: u16,
    pub password: String,
}

impl MailSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("sender", &self.sender),
            ("recipient", &self.recipient),
            ("server", &self.server),
            ("password", &self.password),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "mailing parameter '{name}' must not be empty"
                )));
            }
        }
        if self.port == 0 {
            return Err(ConfigError::ValidationError(
                "mailing parameter 'port' must not be zero".to_string(),
            ));
        }
        Ok(())
    }
}

// The password never ends up in logs.
impl fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailSettings")
            .field("sender", &self.sender)
            .field("recipient", &self.recipient)
            .field("server", &self.server)
            .field("port", &self.port)
            .field("password", &"***")
            .finish()
    }
}
