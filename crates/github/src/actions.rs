//! GitHub Actions runner conventions: inputs and workflow commands.

/// Environment variable the runner uses for an action input.
pub fn input_env_name(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

/// Read an action input. Unset inputs are `None`.
pub fn get_input(name: &str) -> Option<String> { std::env::var(input_env_name(name)).ok() }

/// Read a runner environment variable, treating empty values as unset.
pub fn get_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Escape a workflow command payload.
pub fn escape_data(value: &str) -> String {
    value.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

pub fn error_command(message: &str) -> String { format!("::error::{}", escape_data(message)) }

/// Mark the current step as failed with `message`. The caller still has to exit
/// with a failing status.
pub fn set_failed(message: &str) { println!("{}", error_command(message)); }
