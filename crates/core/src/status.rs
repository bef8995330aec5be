//! Terminal status of a job, derived from its steps.
//!
//! Steps must be in execution order, which is how the jobs API returns them.

use crate::models::{JobStepRecord, ResolvedStatus, StepStatus};

/// First step, in execution order, whose conclusion stopped the job.
pub fn first_stopped_step(steps: &[JobStepRecord]) -> Option<&JobStepRecord> {
    steps.iter().find(|step| step.conclusion.is_some_and(|c| c.is_stopped()))
}

/// Last step that reached `completed`.
pub fn last_completed_step(steps: &[JobStepRecord]) -> Option<&JobStepRecord> {
    steps.iter().rev().find(|step| step.status == StepStatus::Completed)
}

/// Resolve the status of a job from its steps.
///
/// A stopped step wins over anything after it. Without one, the last completed
/// step decides. A job with neither is reported as failed.
pub fn resolve_step_status(steps: &[JobStepRecord]) -> ResolvedStatus {
    let Some(step) = first_stopped_step(steps).or_else(|| last_completed_step(steps)) else {
        tracing::debug!("No stopped or completed step among {} steps", steps.len());
        return ResolvedStatus::Failed;
    };
    tracing::debug!("Status decided by step '{}' ({:?})", step.name, step.conclusion);
    ResolvedStatus::from_conclusion(step.conclusion)
}
