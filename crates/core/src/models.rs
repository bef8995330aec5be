use std::{fmt, str::FromStr};

use serde::Deserialize;

/// Which end of the workflow run is being announced.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Phase {
    Start,
    Finish,
}

impl Phase {
    pub const fn variants() -> &'static [Self] { &[Self::Start, Self::Finish] }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Finish => "finish",
        }
    }
}

impl FromStr for Phase {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "finish" => Ok(Self::Finish),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Queued,
    InProgress,
    Completed,
    Waiting,
    Pending,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepConclusion {
    Success,
    Failure,
    Cancelled,
    TimedOut,
    ActionRequired,
    Skipped,
    Neutral,
    #[serde(other)]
    Unknown,
}

impl StepConclusion {
    /// Conclusions that mean the job stopped at this step.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Failure | Self::TimedOut | Self::Cancelled | Self::ActionRequired)
    }
}

/// One step of a job, as reported by the jobs API.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct JobStepRecord {
    pub name: String,
    pub status: StepStatus,
    #[serde(default)]
    pub conclusion: Option<StepConclusion>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ResolvedStatus {
    Started,
    Succeeded,
    Cancelled,
    Failed,
}

impl ResolvedStatus {
    /// Map a step conclusion onto a terminal status. A missing conclusion is a failure.
    pub fn from_conclusion(conclusion: Option<StepConclusion>) -> Self {
        match conclusion {
            Some(StepConclusion::Success) => Self::Succeeded,
            Some(StepConclusion::Cancelled) => Self::Cancelled,
            _ => Self::Failed,
        }
    }

    /// Uppercase label used in card titles and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Started => "STARTED",
            Self::Succeeded => "SUCCESS",
            Self::Cancelled => "CANCELLED",
            Self::Failed => "FAILURE",
        }
    }

    /// Parse the free-form `status` input (`success`, `cancelled`, anything else).
    pub fn from_status_input(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Succeeded,
            "cancelled" => Self::Cancelled,
            _ => Self::Failed,
        }
    }
}

impl fmt::Display for ResolvedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

/// Snapshot of the workflow run being announced.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RunContext {
    /// `owner/repo`
    pub owner_repo: String,
    pub run_id: u64,
    pub run_number: u64,
    pub workflow_name: String,
    pub event_name: String,
    pub git_ref: String,
    pub actor: String,
    pub repository_url: Option<String>,
    pub repository_full_name: String,
    pub pull_request_url: Option<String>,
    /// HTML URL of the workflow run, as returned by the API.
    pub run_url: String,
}

impl RunContext {
    pub fn is_pull_request(&self) -> bool { self.event_name == "pull_request" }
}

/// Caller-supplied text that goes into the card.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct NotificationMeta {
    pub name: String,
    pub email: String,
    pub message: String,
    pub environment: Option<String>,
    pub publish_url: Option<String>,
}

impl NotificationMeta {
    /// `name email`, skipping whichever is empty. `None` when both are.
    pub fn actor_label(&self) -> Option<String> {
        let parts = [self.name.trim(), self.email.trim()];
        let label = parts.iter().filter(|s| !s.is_empty()).copied().collect::<Vec<_>>().join(" ");
        (!label.is_empty()).then_some(label)
    }
}
