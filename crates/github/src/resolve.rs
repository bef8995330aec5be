use workflow_notify_core::{
    error::{NotifyError, Result},
    models::{ResolvedStatus, RunContext},
    status::resolve_step_status,
};

use crate::{CiApi, JobRecord, context::ActionContext};

/// Fetch the run for a start notification.
pub async fn resolve_start<A: CiApi>(api: &A, ctx: &ActionContext) -> Result<RunContext> {
    let run =
        api.get_workflow_run(&ctx.owner, &ctx.repo, ctx.run_id).await.map_err(NotifyError::Api)?;
    Ok(ctx.run_context(run.html_url))
}

/// Fetch the run and its jobs, and resolve the status of `job_name`.
///
/// A job that can't be found resolves to [`ResolvedStatus::Failed`].
pub async fn resolve_finish<A: CiApi>(
    api: &A,
    ctx: &ActionContext,
    job_name: &str,
) -> Result<(RunContext, ResolvedStatus)> {
    let (run, jobs) = tokio::try_join!(
        api.get_workflow_run(&ctx.owner, &ctx.repo, ctx.run_id),
        api.list_jobs_for_workflow_run(&ctx.owner, &ctx.repo, ctx.run_id),
    )
    .map_err(NotifyError::Api)?;

    let status = match find_job(&jobs, job_name) {
        Ok(job) => {
            let status = resolve_step_status(&job.steps);
            tracing::info!("Job '{}' ({} steps) resolved to {}", job.name, job.steps.len(), status);
            status
        }
        Err(e) => {
            tracing::warn!("{} ({} jobs in run {}), reporting failure", e, jobs.len(), ctx.run_id);
            ResolvedStatus::Failed
        }
    };
    Ok((ctx.run_context(run.html_url), status))
}

pub fn find_job<'a>(jobs: &'a [JobRecord], name: &str) -> Result<&'a JobRecord> {
    jobs.iter()
        .find(|job| job.name == name)
        .ok_or_else(|| NotifyError::JobNotFound(name.to_string()))
}
