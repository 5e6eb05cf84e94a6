use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::ConnectOptions;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::domain::SubmissionEmail;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
    pub catalogue: CatalogueSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    /// Public website URL, linked from email bodies.
    pub base_url: String,
    #[serde(default)]
    pub diagnostics_enabled: bool,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: SecretString,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
}

impl DatabaseSettings {
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .ssl_mode(ssl_mode)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db()
            .database(&self.database_name)
            .log_statements(tracing::log::LevelFilter::Trace)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct EmailClientSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    /// SMTP login; also used as the sender address.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<SecretString>,
    pub sender_name: String,
    /// Staff inbox receiving contact and newsletter notifications.
    pub notification_email: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl EmailClientSettings {
    /// SMTP credentials, present only when both login and password are set.
    pub fn credentials(&self) -> Option<(String, SecretString)> {
        let username = self.username.as_deref().map(str::trim).unwrap_or_default();
        let password = self.password.as_ref()?;
        if username.is_empty() || password.expose_secret().is_empty() {
            return None;
        }
        Some((username.to_string(), password.clone()))
    }

    pub fn sender(&self) -> Result<SubmissionEmail, String> {
        match self.username.as_deref().map(str::trim) {
            Some(username) if !username.is_empty() => SubmissionEmail::parse(username.to_string()),
            _ => self.notification_recipient(),
        }
    }

    pub fn notification_recipient(&self) -> Result<SubmissionEmail, String> {
        SubmissionEmail::parse(self.notification_email.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct CatalogueSettings {
    pub path: PathBuf,
    /// File name used for the email attachment.
    pub attachment_filename: String,
    /// File name offered to browsers on direct download.
    pub download_filename: String,
}

/// Load the settings from `configuration/` and the environment.
///
/// Layers, later ones winning: `base.yaml`, `{APP_ENVIRONMENT}.yaml`,
/// `APP_*` variables (e.g. `APP_EMAIL_CLIENT__HOST`), then the conventional
/// deployment variables (`PORT`, `SMTP_*`, `NOTIFICATION_EMAIL`, `WEBSITE_URL`).
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("application.port", env_var("PORT"))?
        .set_override_option("application.base_url", env_var("WEBSITE_URL"))?
        .set_override_option("email_client.host", env_var("SMTP_HOST"))?
        .set_override_option("email_client.port", env_var("SMTP_PORT"))?
        .set_override_option("email_client.username", env_var("SMTP_EMAIL"))?
        .set_override_option("email_client.password", env_var("SMTP_PASSWORD"))?
        .set_override_option("email_client.sender_name", env_var("SMTP_FROM_NAME"))?
        .set_override_option(
            "email_client.notification_email",
            env_var("NOTIFICATION_EMAIL"),
        )?
        .build()?;

    settings.try_deserialize::<Settings>()
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// The possible runtime environment for our application.
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
