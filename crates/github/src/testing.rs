use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use anyhow::{Result, bail};
use workflow_notify_core::{
    card::Notification,
    models::{JobStepRecord, StepConclusion, StepStatus},
};

use crate::{
    CiApi, JobRecord, WorkflowRunRecord,
    context::{ActionContext, EventPayload},
    webhook::WebhookSender,
};

/// In-memory Actions API that counts its calls.
#[derive(Clone, Default)]
pub struct FakeApi {
    jobs: Arc<Vec<JobRecord>>,
    fail: bool,
    run_calls: Arc<AtomicUsize>,
    job_calls: Arc<AtomicUsize>,
}

impl FakeApi {
    pub fn new(jobs: Vec<JobRecord>) -> Self { Self { jobs: Arc::new(jobs), ..Self::default() } }

    pub fn failing() -> Self { Self { fail: true, ..Self::default() } }

    pub fn run_calls(&self) -> usize { self.run_calls.load(Ordering::SeqCst) }

    pub fn job_calls(&self) -> usize { self.job_calls.load(Ordering::SeqCst) }
}

impl CiApi for FakeApi {
    async fn get_workflow_run(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> Result<WorkflowRunRecord> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            bail!("GitHub: Bad credentials");
        }
        Ok(WorkflowRunRecord {
            id: run_id,
            html_url: format!("https://github.com/{owner}/{repo}/actions/runs/{run_id}"),
        })
    }

    async fn list_jobs_for_workflow_run(
        &self,
        _owner: &str,
        _repo: &str,
        _run_id: u64,
    ) -> Result<Vec<JobRecord>> {
        self.job_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            bail!("GitHub: Bad credentials");
        }
        Ok(self.jobs.as_ref().clone())
    }
}

/// Keeps every notification instead of posting it.
#[derive(Clone, Default)]
pub struct RecordingWebhook {
    sent: Arc<Mutex<Vec<(String, Notification)>>>,
    fail: bool,
}

impl RecordingWebhook {
    pub fn failing() -> Self { Self { fail: true, ..Self::default() } }

    pub fn sent(&self) -> Vec<(String, Notification)> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

impl WebhookSender for RecordingWebhook {
    async fn send(&self, uri: &str, notification: &Notification) -> Result<()> {
        if self.fail {
            bail!("Webhook responded with 400 Bad Request");
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((uri.to_string(), notification.clone()));
        }
        Ok(())
    }
}

pub fn action_context(event_name: &str) -> ActionContext {
    ActionContext {
        owner: "octo".to_string(),
        repo: "app".to_string(),
        run_id: 42,
        run_number: 7,
        workflow: "CI".to_string(),
        event_name: event_name.to_string(),
        git_ref: "refs/heads/main".to_string(),
        actor: "octocat".to_string(),
        job: "build".to_string(),
        server_url: "https://github.com".to_string(),
        api_url: None,
        payload: EventPayload::default(),
    }
}

pub fn job(name: &str, steps: Vec<JobStepRecord>) -> JobRecord {
    JobRecord { id: 1, name: name.to_string(), steps }
}

pub fn step(status: StepStatus, conclusion: Option<StepConclusion>) -> JobStepRecord {
    JobStepRecord { name: "step".to_string(), status, conclusion }
}
