use std::{fmt, fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::{NotifyError, Result},
    models::{NotificationMeta, Phase},
    util::parse_absolute_url,
};

/// How the card is put together. Loaded from YAML; every field is optional.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Lead the fact list with the `env` input when it is set.
    pub include_env_fact: bool,
    /// Replace the run-details fact with the publish URL on success.
    pub include_publish_url_on_success: bool,
    /// Append `(name email)` to the start card subtitle as well.
    pub actor_in_start_subtitle: bool,
    pub colors: ColorScheme,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            include_env_fact: true,
            include_publish_url_on_success: true,
            actor_in_start_subtitle: false,
            colors: ColorScheme::default(),
        }
    }
}

impl NotifyConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            NotifyError::config(format!("Failed to open config file '{}': {}", path.display(), e))
        })?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|e| {
            NotifyError::config(format!("Failed to parse config file '{}': {}", path.display(), e))
        })
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColorScheme {
    pub started: ThemeColor,
    pub success: ThemeColor,
    pub cancelled: ThemeColor,
    pub failure: ThemeColor,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            started: ThemeColor::from_static("888ABD"),
            success: ThemeColor::from_static("90C978"),
            cancelled: ThemeColor::from_static("FFF175"),
            failure: ThemeColor::from_static("C23B23"),
        }
    }
}

/// Six hex digits, uppercase, no leading `#`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct ThemeColor(String);

impl ThemeColor {
    fn from_static(value: &'static str) -> Self { Self(value.to_string()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for ThemeColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value.strip_prefix('#').unwrap_or(&value);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("invalid theme color '{value}', expected 6 hex digits"));
        }
        Ok(Self(digits.to_ascii_uppercase()))
    }
}

impl From<ThemeColor> for String {
    fn from(value: ThemeColor) -> Self { value.0 }
}

impl fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Action inputs, validated.
#[derive(Clone, PartialEq, Eq)]
pub struct Inputs {
    pub github_token: String,
    pub webhook_uri: String,
    pub phase: Phase,
    /// Raw `status` input. Required for `finish`; the job steps decide the actual status.
    pub status: Option<String>,
    pub email: String,
    pub name: String,
    pub message: String,
    pub env: Option<String>,
    pub publish_url: Option<String>,
    pub job_name: Option<String>,
}

impl fmt::Debug for Inputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inputs")
            .field("github_token", &"***")
            .field("webhook_uri", &"***")
            .field("phase", &self.phase)
            .field("status", &self.status)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("message", &self.message)
            .field("env", &self.env)
            .field("publish_url", &self.publish_url)
            .field("job_name", &self.job_name)
            .finish()
    }
}

impl Inputs {
    /// Read and validate inputs by name.
    ///
    /// `phase` overrides the `type`/`position` inputs when given. Values are
    /// trimmed and empty values count as missing.
    pub fn from_source<F>(get: F, phase: Option<Phase>) -> Result<Self>
    where F: Fn(&str) -> Option<String> {
        let get =
            |name: &str| get(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |name: &str| {
            get(name).ok_or_else(|| {
                NotifyError::config(format!("Input required and not supplied: {name}"))
            })
        };

        let github_token = required("github-token")?;
        let webhook_uri = required("webhook-uri")?;
        parse_absolute_url(&webhook_uri)
            .map_err(|e| NotifyError::config(format!("'webhook-uri' is not a valid URL: {e}")))?;

        let phase = match phase {
            Some(phase) => phase,
            None => get("type")
                .or_else(|| get("position"))
                .and_then(|v| v.parse::<Phase>().ok())
                .ok_or_else(|| NotifyError::config("'type' input must be 'start' or 'finish'"))?,
        };
        let status = get("status");
        if phase == Phase::Finish && status.is_none() {
            return Err(NotifyError::config("Input required and not supplied: status"));
        }

        let publish_url = get("publish-url");
        if let Some(url) = &publish_url {
            parse_absolute_url(url).map_err(|e| {
                NotifyError::config(format!("'publish-url' is not a valid URL: {e}"))
            })?;
        }

        Ok(Self {
            github_token,
            webhook_uri,
            phase,
            status,
            email: get("email").unwrap_or_default(),
            name: get("name").unwrap_or_default(),
            message: get("message").unwrap_or_default(),
            env: get("env"),
            publish_url,
            job_name: get("job-name"),
        })
    }

    pub fn meta(&self) -> NotificationMeta {
        NotificationMeta {
            name: self.name.clone(),
            email: self.email.clone(),
            message: self.message.clone(),
            environment: self.env.clone(),
            publish_url: self.publish_url.clone(),
        }
    }
}
