pub mod actions;
pub mod context;
pub mod dispatch;
pub mod resolve;
#[cfg(test)]
mod testing;
pub mod webhook;

use std::future::Future;

use anyhow::{Context, Result, anyhow};
use http::StatusCode;
use octocrab::{GitHubError, Octocrab};
use serde::{Deserialize, Serialize};
use workflow_notify_core::models::JobStepRecord;

/// Read-only view of the Actions API needed to build a notification.
pub trait CiApi {
    fn get_workflow_run(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> impl Future<Output = Result<WorkflowRunRecord>> + Send;

    /// All jobs of the run, across every page.
    fn list_jobs_for_workflow_run(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> impl Future<Output = Result<Vec<JobRecord>>> + Send;
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct WorkflowRunRecord {
    pub id: u64,
    pub html_url: String,
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct JobRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub steps: Vec<JobStepRecord>,
}

#[derive(Deserialize)]
struct JobsPage {
    total_count: usize,
    jobs: Vec<JobRecord>,
}

/// Paging stops on an empty page or once `total_count` jobs have been collected.
fn is_last_page(page_len: usize, collected: usize, total_count: usize) -> bool {
    page_len == 0 || collected >= total_count
}

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

#[derive(Clone)]
pub struct GitHub {
    pub client: Octocrab,
}

impl GitHub {
    /// Build a client authenticated with `token`. `api_url` points at a GitHub
    /// Enterprise Server API root when set.
    pub fn new(token: &str, api_url: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(api_url) = api_url {
            builder = builder
                .base_uri(api_url)
                .with_context(|| format!("Invalid GitHub API URL '{api_url}'"))?;
        }
        let client = builder
            .personal_token(token.to_string())
            .build()
            .context("Failed to create GitHub client")?;
        Ok(Self { client })
    }
}

impl CiApi for GitHub {
    async fn get_workflow_run(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> Result<WorkflowRunRecord> {
        let route = format!("/repos/{owner}/{repo}/actions/runs/{run_id}");
        match self.client.get::<WorkflowRunRecord, _, _>(&route, None::<&()>).await {
            Ok(run) => {
                tracing::debug!("Fetched workflow run {} ({})", run.id, run.html_url);
                Ok(run)
            }
            Err(octocrab::Error::GitHub { source, .. })
                if matches!(*source, GitHubError { status_code: StatusCode::NOT_FOUND, .. }) =>
            {
                Err(anyhow!("Workflow run {run_id} not found in {owner}/{repo}"))
            }
            Err(e) => Err(e).with_context(|| format!("Failed to fetch workflow run {run_id}")),
        }
    }

    async fn list_jobs_for_workflow_run(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
    ) -> Result<Vec<JobRecord>> {
        let route = format!("/repos/{owner}/{repo}/actions/runs/{run_id}/jobs");
        let mut page = 1;
        let mut jobs = Vec::new();
        loop {
            let response: JobsPage = self
                .client
                .get(&route, Some(&PageParams { per_page: 100, page }))
                .await
                .with_context(|| format!("Failed to fetch jobs page {page} for run {run_id}"))?;
            let page_len = response.jobs.len();
            jobs.extend(response.jobs);
            if is_last_page(page_len, jobs.len(), response.total_count) {
                break;
            }
            page += 1;
        }
        tracing::debug!("Run {} (jobs {})", run_id, jobs.len());
        Ok(jobs)
    }
}
