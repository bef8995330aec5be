use serde::Serialize;

use crate::{
    config::{NotifyConfig, ThemeColor},
    models::{NotificationMeta, Phase, ResolvedStatus, RunContext},
    util::{markdown_link, self_link, tree_url},
};

pub const FACT_ENVIRONMENT: &str = "Environment";
pub const FACT_BRANCH: &str = "Branch";
pub const FACT_PULL_REQUEST: &str = "Pull request";
pub const FACT_RUN_DETAILS: &str = "Workflow run details";
pub const FACT_PUBLISHED_SITE: &str = "Published site";

/// A row of the card.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Fact {
    pub name: String,
    pub value: String,
}

impl Fact {
    fn new(name: &str, value: String) -> Self { Self { name: name.to_string(), value } }
}

/// A composed notification, independent of the wire schema.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Notification {
    pub status: ResolvedStatus,
    pub theme_color: ThemeColor,
    pub summary: String,
    pub activity_title: String,
    pub activity_subtitle: String,
    pub facts: Vec<Fact>,
    pub markdown: bool,
}

impl Notification {
    pub fn fact(&self, name: &str) -> Option<&Fact> { self.facts.iter().find(|f| f.name == name) }

    pub fn to_card(&self) -> MessageCard<'_> {
        MessageCard {
            card_type: "MessageCard",
            context: "http://schema.org/extensions",
            theme_color: self.theme_color.as_str(),
            summary: &self.summary,
            sections: [Section {
                activity_title: &self.activity_title,
                activity_subtitle: &self.activity_subtitle,
                facts: &self.facts,
                markdown: self.markdown,
            }],
        }
    }
}

/// Wire form of a [`Notification`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCard<'a> {
    #[serde(rename = "@type")]
    card_type: &'static str,
    #[serde(rename = "@context")]
    context: &'static str,
    theme_color: &'a str,
    summary: &'a str,
    sections: [Section<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Section<'a> {
    activity_title: &'a str,
    activity_subtitle: &'a str,
    facts: &'a [Fact],
    markdown: bool,
}

/// Build the notification for a phase.
///
/// `status` is only read for [`Phase::Finish`]; a finish without one renders
/// as a failure.
pub fn compose(
    config: &NotifyConfig,
    phase: Phase,
    context: &RunContext,
    status: Option<ResolvedStatus>,
    meta: &NotificationMeta,
) -> Notification {
    let status = match phase {
        Phase::Start => ResolvedStatus::Started,
        Phase::Finish => match status {
            Some(ResolvedStatus::Started) | None => ResolvedStatus::Failed,
            Some(status) => status,
        },
    };
    let colors = &config.colors;
    let theme_color = match status {
        ResolvedStatus::Started => &colors.started,
        ResolvedStatus::Succeeded => &colors.success,
        ResolvedStatus::Cancelled => &colors.cancelled,
        ResolvedStatus::Failed => &colors.failure,
    };

    let repo = repository_link(context);
    let (activity_title, activity_subtitle) = match phase {
        Phase::Start => {
            let started_by = if meta.name.trim().is_empty() { &context.actor } else { &meta.name };
            let actor = config.actor_in_start_subtitle.then(|| meta.actor_label()).flatten();
            (
                format!(
                    "Workflow {} #{} started by {} on {}",
                    context.workflow_name, context.run_number, started_by, repo
                ),
                subtitle(&meta.message, actor),
            )
        }
        Phase::Finish => (
            format!(
                "Workflow {} #{} {} on {}",
                context.workflow_name,
                context.run_number,
                status.label(),
                repo
            ),
            subtitle(&meta.message, meta.actor_label()),
        ),
    };

    let mut facts = Vec::with_capacity(3);
    if config.include_env_fact
        && let Some(env) = meta.environment.as_deref().filter(|e| !e.trim().is_empty())
    {
        facts.push(Fact::new(FACT_ENVIRONMENT, env.to_string()));
    }
    if let Some(fact) = branch_or_pull_request_fact(context) {
        facts.push(fact);
    }
    match meta.publish_url.as_deref() {
        Some(url)
            if status == ResolvedStatus::Succeeded && config.include_publish_url_on_success =>
        {
            facts.push(Fact::new(FACT_PUBLISHED_SITE, self_link(url)));
        }
        _ => facts.push(Fact::new(FACT_RUN_DETAILS, self_link(&context.run_url))),
    }

    Notification {
        status,
        theme_color: theme_color.clone(),
        summary: format!("{} workflow {}", context.repository_full_name, status.label()),
        activity_title,
        activity_subtitle,
        facts,
        markdown: true,
    }
}

fn repository_link(context: &RunContext) -> String {
    match &context.repository_url {
        Some(url) => markdown_link(&context.repository_full_name, url),
        None => context.repository_full_name.clone(),
    }
}

fn subtitle(message: &str, actor: Option<String>) -> String {
    match actor {
        Some(actor) if message.is_empty() => format!("({actor})"),
        Some(actor) => format!("{message} ({actor})"),
        None => message.to_string(),
    }
}

/// "Pull request" for `pull_request` events, "Branch" otherwise. Dropped when
/// the link target is unknown.
fn branch_or_pull_request_fact(context: &RunContext) -> Option<Fact> {
    if context.is_pull_request() {
        let url = context.pull_request_url.as_deref()?;
        Some(Fact::new(FACT_PULL_REQUEST, self_link(url)))
    } else {
        let url = tree_url(context.repository_url.as_deref()?, &context.git_ref);
        Some(Fact::new(FACT_BRANCH, self_link(&url)))
    }
}
