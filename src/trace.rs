use tracing_subscriber::EnvFilter;

/// Install the global subscriber, logs go to stderr so stdout stays clean.
///
/// `levels` uses the `EnvFilter` directive syntax, e.g. `tgsync=debug,aws=info`.
pub fn init(color: bool, json: bool, levels: &str) {
    let filter = EnvFilter::try_new(levels).unwrap_or_else(|err| {
        eprintln!("invalid log level {levels:?}, {err}, fallback to info");
        EnvFilter::new("info")
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = if json {
        builder.json().flatten_event(true).try_init()
    } else {
        builder.with_ansi(color).try_init()
    };

    // tests may install a subscriber more than once
    if let Err(err) = result {
        eprintln!("install tracing subscriber failed, {err}");
    }
}

/// Directives derived from a plain level, covering our own crates only.
pub fn levels_for(level: &str) -> String {
    match level {
        "off" => "off".to_string(),
        level => [format!("tgsync={level}"), format!("aws={level}")].join(","),
    }
}

/// Pick the filter directives, `--log-level` wins over `$TGSYNC_LOG`.
pub fn resolve_levels(flag: Option<&str>, env: Option<String>) -> String {
    match (flag, env) {
        (Some(level), _) => levels_for(level),
        (None, Some(directives)) if !directives.trim().is_empty() => directives,
        _ => levels_for("info"),
    }
}
