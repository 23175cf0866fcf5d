use std::sync::Arc;

use crate::Alert;

pub(crate) fn to_text(a: Arc<Alert>) -> String {
    format!(
        "[{}] {}\n{} ({}) - {}\n{}",
        a.title(),
        a.status.emoji(),
        a.target,
        a.kind,
        a.time.to_rfc2822(),
        a.message,
    )
}

pub(crate) fn to_markdown(a: Arc<Alert>) -> String {
    format!(
        "**{}** {}\n\n- target: `{}` ({})\n- failures: {}\n- time: {}\n\n> {}",
        a.title(),
        a.status.emoji(),
        a.target,
        a.kind,
        a.failures,
        a.time.to_rfc2822(),
        a.message,
    )
}

pub(crate) fn to_json(a: Arc<Alert>) -> String {
    serde_json::to_string(a.as_ref()).unwrap_or_else(|err| {
        log::error!("[report / json] - failed to encode alert {}: {}", a.name, err);
        String::new()
    })
}
