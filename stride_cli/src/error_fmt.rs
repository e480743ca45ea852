//! Human-readable error descriptions and structured JSON error formatting.

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use stride_core::error::{BuildError, SampleError, StrideError};

    // Typed matches first
    if let Some(BuildError::InvalidConfig(msg)) = err.downcast_ref::<BuildError>() {
        return format!(
            "What happened: Invalid engine configuration ({msg}).\nLikely causes: Out-of-range values in the [engine], [connectivity] or [pace] sections.\nHow to fix: Edit the config file, then rerun. See etc/stride.toml for a sample."
        );
    }

    if let Some(se) = err.downcast_ref::<SampleError>() {
        return format!(
            "What happened: A location sample was rejected ({se}).\nLikely causes: Corrupt or hand-edited sample log.\nHow to fix: Fix or drop the offending row."
        );
    }

    if let Some(de) = err.downcast_ref::<StrideError>() {
        return match de {
            StrideError::Timeout => "What happened: The location provider timed out.\nLikely causes: No GPS signal or the provider stopped producing fixes.\nHow to fix: Check the provider and retry.".to_string(),
            StrideError::ProviderClosed => "What happened: The location provider closed unexpectedly.\nLikely causes: The producer exited or the input ended early.\nHow to fix: Re-run with --log-level=debug to see where the feed stopped.".to_string(),
            StrideError::State(msg) => format!(
                "What happened: {msg}.\nLikely causes: No fix with horizontal accuracy within engine.max_accuracy_m was available.\nHow to fix: Check the sample log accuracies or raise engine.max_accuracy_m."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from config and input files
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("sample csv must have headers") {
        return format!(
            "Invalid headers in sample CSV. Expected '{}'.",
            stride_config::samples::CSV_HEADERS.join(",")
        );
    }

    if lower.contains("invalid csv row") || lower.contains("invalid json line") {
        return format!(
            "What happened: The sample log could not be parsed ({msg}).\nLikely causes: Missing columns or non-numeric values.\nHow to fix: Fix the reported line and rerun."
        );
    }

    if lower.contains("sample log is empty") {
        return "What happened: The sample log has no samples.\nHow to fix: Record a run first or point --input at another file.".to_string();
    }

    if lower.contains("must be") && (lower.contains("engine.") || lower.contains("announce.") || lower.contains("ui.") || lower.contains("pace.") || lower.contains("connectivity.") || lower.contains("logging.")) {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file and try again."
        );
    }

    if lower.contains("history") {
        return format!(
            "What happened: The run history could not be read or written ({msg}).\nLikely causes: The file is not a history document, or the directory is not writable.\nHow to fix: Point --history/--file at another path or fix permissions."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 for configuration, 3 for input data, 4 for the provider, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    use stride_core::error::{BuildError, SampleError, StrideError};
    if err.downcast_ref::<BuildError>().is_some() {
        return 2;
    }
    if err.downcast_ref::<SampleError>().is_some() {
        return 3;
    }
    if let Some(de) = err.downcast_ref::<StrideError>() {
        return match de {
            StrideError::Config(_) => 2,
            StrideError::Sample(_) | StrideError::State(_) => 3,
            StrideError::Timeout | StrideError::ProviderClosed | StrideError::Provider(_) => 4,
            StrideError::Io(_) => 1,
        };
    }
    let lower = err.to_string().to_ascii_lowercase();
    if lower.contains("must be") {
        return 2;
    }
    if lower.contains("sample csv") || lower.contains("invalid csv row") || lower.contains("invalid json line") || lower.contains("sample log") {
        return 3;
    }
    1
}

/// Short machine-readable name for the failure class.
fn reason_name(err: &eyre::Report) -> &'static str {
    match exit_code_for_error(err) {
        2 => "Config",
        3 => "Input",
        4 => "Provider",
        _ => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
