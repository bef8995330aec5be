use typed_path::Utf8NativePathBuf;
use workflow_notify_core::models::Phase;

// For argp::FromArgs
pub fn native_path(value: &str) -> Result<Utf8NativePathBuf, String> {
    Ok(Utf8NativePathBuf::from(value))
}

pub fn parse_phase(value: &str) -> Result<Phase, String> {
    value.parse().map_err(|_| {
        let variants = Phase::variants().iter().map(|p| p.as_str()).collect::<Vec<_>>();
        format!("invalid phase '{}', expected one of: {}", value, variants.join(", "))
    })
}
