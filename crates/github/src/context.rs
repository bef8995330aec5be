use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use workflow_notify_core::{
    error::{NotifyError, Result},
    models::RunContext,
};

const DEFAULT_SERVER_URL: &str = "https://github.com";

/// Identifiers of the current run, taken from the runner environment.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ActionContext {
    pub owner: String,
    pub repo: String,
    pub run_id: u64,
    pub run_number: u64,
    pub workflow: String,
    pub event_name: String,
    pub git_ref: String,
    pub actor: String,
    /// Key of the job running this step.
    pub job: String,
    pub server_url: String,
    pub api_url: Option<String>,
    pub payload: EventPayload,
}

/// The parts of the webhook event payload the card links to.
#[derive(Debug, Clone, Default, Eq, PartialEq, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub repository: Option<PayloadRepository>,
    #[serde(default)]
    pub pull_request: Option<PayloadPullRequest>,
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct PayloadRepository {
    pub full_name: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct PayloadPullRequest {
    pub html_url: Option<String>,
}

impl EventPayload {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event payload {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse event payload {}", path.display()))
    }
}

impl ActionContext {
    /// Build the context from `GITHUB_*` variables.
    ///
    /// A missing or unreadable event payload is logged and treated as empty.
    pub fn from_source<F>(get: F) -> Result<Self>
    where F: Fn(&str) -> Option<String> {
        let required = |name: &str| {
            get(name).filter(|v| !v.is_empty()).ok_or_else(|| {
                NotifyError::config(format!("{name} is not set; is this running in GitHub Actions?"))
            })
        };
        let number = |name: &str| {
            let value = required(name)?;
            value.parse::<u64>().map_err(|_| {
                NotifyError::config(format!("{name} is not a valid number: '{value}'"))
            })
        };

        let repository = required("GITHUB_REPOSITORY")?;
        let (owner, repo) = repository
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty())
            .ok_or_else(|| {
                NotifyError::config(format!("GITHUB_REPOSITORY is not owner/repo: '{repository}'"))
            })?;

        let payload = match get("GITHUB_EVENT_PATH").filter(|v| !v.is_empty()) {
            Some(path) => EventPayload::from_path(Path::new(&path)).unwrap_or_else(|e| {
                tracing::warn!("{:#}", e);
                EventPayload::default()
            }),
            None => {
                tracing::warn!("GITHUB_EVENT_PATH is not set, links will use defaults");
                EventPayload::default()
            }
        };

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            run_id: number("GITHUB_RUN_ID")?,
            run_number: number("GITHUB_RUN_NUMBER")?,
            workflow: get("GITHUB_WORKFLOW").unwrap_or_default(),
            event_name: required("GITHUB_EVENT_NAME")?,
            git_ref: get("GITHUB_REF").unwrap_or_default(),
            actor: get("GITHUB_ACTOR").unwrap_or_default(),
            job: get("GITHUB_JOB").unwrap_or_default(),
            server_url: get("GITHUB_SERVER_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            api_url: get("GITHUB_API_URL").filter(|v| !v.is_empty()),
            payload,
        })
    }

    pub fn owner_repo(&self) -> String { format!("{}/{}", self.owner, self.repo) }

    /// Repository name, preferring the event payload.
    pub fn repository_full_name(&self) -> String {
        self.payload
            .repository
            .as_ref()
            .and_then(|r| r.full_name.clone())
            .unwrap_or_else(|| self.owner_repo())
    }

    /// Repository web URL, preferring the event payload.
    pub fn repository_url(&self) -> String {
        self.payload.repository.as_ref().and_then(|r| r.html_url.clone()).unwrap_or_else(|| {
            format!("{}/{}", self.server_url.trim_end_matches('/'), self.owner_repo())
        })
    }

    pub fn pull_request_url(&self) -> Option<String> {
        self.payload.pull_request.as_ref().and_then(|pr| pr.html_url.clone())
    }

    /// Combine with the run URL fetched from the API.
    pub fn run_context(&self, run_url: String) -> RunContext {
        RunContext {
            owner_repo: self.owner_repo(),
            run_id: self.run_id,
            run_number: self.run_number,
            workflow_name: self.workflow.clone(),
            event_name: self.event_name.clone(),
            git_ref: self.git_ref.clone(),
            actor: self.actor.clone(),
            repository_url: Some(self.repository_url()),
            repository_full_name: self.repository_full_name(),
            pull_request_url: self.pull_request_url(),
            run_url,
        }
    }
}
