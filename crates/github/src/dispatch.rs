use workflow_notify_core::{
    card::{Notification, compose},
    config::{Inputs, NotifyConfig},
    error::{NotifyError, Result},
    models::{Phase, ResolvedStatus},
};

use crate::{
    CiApi,
    context::ActionContext,
    resolve::{resolve_finish, resolve_start},
    webhook::WebhookSender,
};

/// Validated inputs and runner context for one notification.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub inputs: Inputs,
    pub context: ActionContext,
}

impl Invocation {
    pub fn load<I, E>(get_input: I, get_env: E, phase: Option<Phase>) -> Result<Self>
    where
        I: Fn(&str) -> Option<String>,
        E: Fn(&str) -> Option<String>,
    {
        let inputs = Inputs::from_source(get_input, phase)?;
        let context = ActionContext::from_source(get_env)?;
        Ok(Self { inputs, context })
    }

    /// Name of the job whose steps decide the finish status.
    pub fn job_name(&self) -> &str { self.inputs.job_name.as_deref().unwrap_or(&self.context.job) }
}

/// Load configuration, connect, and send one notification.
///
/// Configuration errors are returned before `connect` is called.
pub async fn run<I, E, A, W, F>(
    get_input: I,
    get_env: E,
    phase: Option<Phase>,
    config: &NotifyConfig,
    connect: F,
    webhook: &W,
) -> Result<Notification>
where
    I: Fn(&str) -> Option<String>,
    E: Fn(&str) -> Option<String>,
    A: CiApi,
    W: WebhookSender,
    F: FnOnce(&Invocation) -> Result<A>,
{
    let invocation = Invocation::load(get_input, get_env, phase)?;
    let api = connect(&invocation)?;
    dispatch(&invocation, config, &api, webhook).await
}

/// Resolve, compose and send.
pub async fn dispatch<A: CiApi, W: WebhookSender>(
    invocation: &Invocation,
    config: &NotifyConfig,
    api: &A,
    webhook: &W,
) -> Result<Notification> {
    let Invocation { inputs, context } = invocation;
    tracing::info!(
        "Sending {} notification for {} run {} (#{})",
        inputs.phase,
        context.owner_repo(),
        context.run_id,
        context.run_number
    );

    let (run_context, status) = match inputs.phase {
        Phase::Start => (resolve_start(api, context).await?, None),
        Phase::Finish => {
            let (run_context, status) = resolve_finish(api, context, invocation.job_name()).await?;
            if let Some(input) = inputs.status.as_deref()
                && ResolvedStatus::from_status_input(input) != status
            {
                tracing::warn!("Status input '{}' disagrees with job steps ({})", input, status);
            }
            (run_context, Some(status))
        }
    };

    let notification = compose(config, inputs.phase, &run_context, status, &inputs.meta());
    webhook
        .send(&inputs.webhook_uri, &notification)
        .await
        .map_err(NotifyError::Transport)?;
    tracing::info!("Notification sent: {}", notification.summary);
    Ok(notification)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use workflow_notify_core::{
        card::{FACT_BRANCH, FACT_PUBLISHED_SITE, FACT_PULL_REQUEST, FACT_RUN_DETAILS},
        models::{StepConclusion, StepStatus},
    };

    use super::*;
    use crate::testing::{FakeApi, RecordingWebhook, job, step};

    fn source(pairs: Vec<(&str, &str)>) -> impl Fn(&str) -> Option<String> + use<> {
        let map = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |name| map.get(name).cloned()
    }

    fn inputs(
        phase: &'static str,
        extra: &[(&'static str, &'static str)],
    ) -> Vec<(&'static str, &'static str)> {
        let mut pairs = vec![
            ("github-token", "ghs_secret"),
            ("webhook-uri", "https://example.webhook.office.com/hook"),
            ("type", phase),
            ("status", "success"),
            ("name", "Dev"),
            ("email", "dev@example.com"),
            ("message", "Release"),
        ];
        pairs.retain(|(k, _)| !extra.iter().any(|(e, _)| e == k));
        pairs.extend_from_slice(extra);
        pairs
    }

    fn env(event_name: &'static str) -> Vec<(&'static str, &'static str)> {
        vec![
            ("GITHUB_REPOSITORY", "octo/app"),
            ("GITHUB_RUN_ID", "42"),
            ("GITHUB_RUN_NUMBER", "7"),
            ("GITHUB_WORKFLOW", "CI"),
            ("GITHUB_EVENT_NAME", event_name),
            ("GITHUB_REF", "refs/heads/main"),
            ("GITHUB_ACTOR", "octocat"),
            ("GITHUB_JOB", "build"),
            ("GITHUB_SERVER_URL", "https://x"),
        ]
    }

    async fn notify(
        api: &FakeApi,
        webhook: &RecordingWebhook,
        inputs: Vec<(&str, &str)>,
        env: Vec<(&str, &str)>,
    ) -> Result<Notification> {
        let config = NotifyConfig::default();
        run(source(inputs), source(env), None, &config, |_| Ok(api.clone()), webhook).await
    }

    fn fact<'a>(notification: &'a Notification, name: &str) -> Option<&'a str> {
        notification.fact(name).map(|f| f.value.as_str())
    }

    #[tokio::test]
    async fn test_start_push() {
        let api = FakeApi::new(vec![]);
        let webhook = RecordingWebhook::default();
        let path = std::env::temp_dir()
            .join(format!("workflow-notify-dispatch-push-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"repository": {"full_name": "octo/app", "html_url": "https://x"}}"#,
        )
        .unwrap();
        let path_str = path.to_string_lossy().into_owned();
        let mut env = env("push");
        env.push(("GITHUB_EVENT_PATH", &path_str));
        let result = notify(&api, &webhook, inputs("start", &[]), env).await;
        std::fs::remove_file(&path).unwrap();

        let n = result.unwrap();
        assert_eq!(
            fact(&n, FACT_BRANCH),
            Some("[https://x/tree/refs/heads/main](https://x/tree/refs/heads/main)")
        );
        assert_eq!(
            fact(&n, FACT_RUN_DETAILS),
            Some("[https://github.com/octo/app/actions/runs/42](https://github.com/octo/app/actions/runs/42)")
        );
        assert_eq!(n.theme_color.as_str(), "888ABD");
        assert_eq!(api.job_calls(), 0);

        let sent = webhook.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "https://example.webhook.office.com/hook");
        assert_eq!(sent[0].1, n);
    }

    #[tokio::test]
    async fn test_start_without_event_payload() {
        let api = FakeApi::new(vec![]);
        let webhook = RecordingWebhook::default();
        let n = notify(&api, &webhook, inputs("start", &[]), env("push")).await.unwrap();
        assert_eq!(
            fact(&n, FACT_BRANCH),
            Some("[https://x/octo/app/tree/refs/heads/main](https://x/octo/app/tree/refs/heads/main)")
        );
        assert_eq!(n.activity_title, "Workflow CI #7 started by Dev on [octo/app](https://x/octo/app)");
    }

    #[tokio::test]
    async fn test_finish_published_site() {
        let api = FakeApi::new(vec![job("build", vec![
            step(StepStatus::Completed, Some(StepConclusion::Success)),
            step(StepStatus::Completed, Some(StepConclusion::Success)),
        ])]);
        let webhook = RecordingWebhook::default();
        let inputs =
            inputs("finish", &[("status", "failure"), ("publish-url", "https://site.example")]);
        let n = notify(&api, &webhook, inputs, env("push")).await.unwrap();
        assert_eq!(n.status, ResolvedStatus::Succeeded);
        assert_eq!(fact(&n, FACT_PUBLISHED_SITE), Some("[https://site.example](https://site.example)"));
        assert_eq!(fact(&n, FACT_RUN_DETAILS), None);
    }

    #[tokio::test]
    async fn test_finish_failed_step() {
        let api = FakeApi::new(vec![job("build", vec![
            step(StepStatus::Completed, Some(StepConclusion::Success)),
            step(StepStatus::InProgress, None),
            step(StepStatus::Completed, Some(StepConclusion::Failure)),
        ])]);
        let webhook = RecordingWebhook::default();
        let n = notify(&api, &webhook, inputs("finish", &[]), env("push")).await.unwrap();
        assert_eq!(n.status, ResolvedStatus::Failed);
        assert_eq!(n.theme_color, NotifyConfig::default().colors.failure);
    }

    #[tokio::test]
    async fn test_finish_pull_request() {
        let api = FakeApi::new(vec![job("build", vec![step(
            StepStatus::Completed,
            Some(StepConclusion::Success),
        )])]);
        let webhook = RecordingWebhook::default();
        let path = std::env::temp_dir()
            .join(format!("workflow-notify-dispatch-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"pull_request": {"html_url": "https://x/pull/9"}}"#).unwrap();
        let path_str = path.to_string_lossy().into_owned();
        let mut env = env("pull_request");
        env.push(("GITHUB_EVENT_PATH", &path_str));
        let result = notify(&api, &webhook, inputs("finish", &[]), env).await;
        std::fs::remove_file(&path).unwrap();

        let n = result.unwrap();
        assert_eq!(fact(&n, FACT_PULL_REQUEST), Some("[https://x/pull/9](https://x/pull/9)"));
        assert_eq!(fact(&n, FACT_BRANCH), None);
        assert!(fact(&n, FACT_RUN_DETAILS).is_some());
    }

    #[tokio::test]
    async fn test_job_name_input() {
        let api = FakeApi::new(vec![
            job("build", vec![step(StepStatus::Completed, Some(StepConclusion::Cancelled))]),
            job("Build (ubuntu)", vec![step(StepStatus::Completed, Some(StepConclusion::Success))]),
        ]);
        let webhook = RecordingWebhook::default();
        let inputs = inputs("finish", &[("job-name", "Build (ubuntu)")]);
        let n = notify(&api, &webhook, inputs, env("push")).await.unwrap();
        assert_eq!(n.status, ResolvedStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_missing_required_input_makes_no_calls() {
        for missing in ["github-token", "webhook-uri"] {
            let api = FakeApi::new(vec![]);
            let webhook = RecordingWebhook::default();
            let mut pairs = inputs("start", &[]);
            pairs.retain(|(k, _)| *k != missing);
            let result = notify(&api, &webhook, pairs, env("push")).await;
            assert!(matches!(result, Err(NotifyError::Config(_))), "{missing}");
            assert_eq!(api.run_calls() + api.job_calls(), 0);
            assert!(webhook.sent().is_empty());
        }
    }

    #[tokio::test]
    async fn test_api_failure_sends_nothing() {
        let api = FakeApi::failing();
        let webhook = RecordingWebhook::default();
        let result = notify(&api, &webhook, inputs("finish", &[]), env("push")).await;
        assert!(matches!(result, Err(NotifyError::Api(_))));
        assert!(webhook.sent().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let api = FakeApi::new(vec![]);
        let webhook = RecordingWebhook::failing();
        let result = notify(&api, &webhook, inputs("start", &[]), env("push")).await;
        assert!(matches!(result, Err(NotifyError::Transport(_))));
    }
}
