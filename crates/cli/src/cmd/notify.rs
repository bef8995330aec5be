use anyhow::{Context, Result};
use argp::FromArgs;
use typed_path::Utf8NativePathBuf;
use workflow_notify_core::{
    card::Notification, config::NotifyConfig, error::NotifyError, models::Phase,
};
use workflow_notify_github::{
    GitHub,
    actions::{get_env, get_input},
    dispatch::{self, Invocation},
    webhook::{HttpWebhook, WebhookSender},
};

use crate::util::{native_path, parse_phase};

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// Send a start or finish notification for the current workflow run.
#[argp(subcommand, name = "notify")]
pub struct Args {
    #[argp(option, short = 'c', from_str_fn(native_path))]
    /// YAML file with card options (facts, colors)
    config: Option<Utf8NativePathBuf>,
    #[argp(option, short = 't', long = "type", arg_name = "phase", from_str_fn(parse_phase))]
    /// start or finish; overrides the `type` input
    phase: Option<Phase>,
    #[argp(switch)]
    /// print the card instead of posting it
    dry_run: bool,
}

/// Prints the MessageCard JSON to stdout.
struct PrintWebhook;

impl WebhookSender for PrintWebhook {
    async fn send(&self, _uri: &str, notification: &Notification) -> Result<()> {
        let json = serde_json::to_string_pretty(&notification.to_card())
            .context("Failed to serialize card")?;
        println!("{json}");
        Ok(())
    }
}

fn connect(invocation: &Invocation) -> Result<GitHub, NotifyError> {
    GitHub::new(&invocation.inputs.github_token, invocation.context.api_url.as_deref())
        .map_err(NotifyError::Api)
}

pub async fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => NotifyConfig::from_path(path.with_platform_encoding())?,
        None => NotifyConfig::default(),
    };
    let notification = if args.dry_run {
        dispatch::run(get_input, get_env, args.phase, &config, connect, &PrintWebhook).await?
    } else {
        let webhook = HttpWebhook::new();
        dispatch::run(get_input, get_env, args.phase, &config, connect, &webhook).await?
    };
    tracing::debug!("{} facts, color {}", notification.facts.len(), notification.theme_color);
    Ok(())
}
