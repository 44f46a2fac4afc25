use std::io::IsTerminal;

use tgsync::config::{Config, LogFormat, Options};
use tgsync::{driver, trace};
use tracing::{error, info, warn};

fn main() {
    let opts: Options = argh::from_env();

    if opts.version {
        println!("tgsync {}", tgsync::get_version());
        return;
    }

    // variables already set in the environment win over the file
    let dotenv = match &opts.env_file {
        Some(path) => dotenvy::from_path(path).map(|_| Some(path.clone())),
        None => match dotenvy::dotenv() {
            Ok(path) => Ok(Some(path)),
            Err(err) if err.not_found() => Ok(None),
            Err(err) => Err(err),
        },
    };

    let levels = trace::resolve_levels(
        opts.log_level.as_deref(),
        std::env::var("TGSYNC_LOG").ok(),
    );
    let color = std::io::stderr().is_terminal();
    trace::init(color, opts.log_format == LogFormat::Json, &levels);

    match dotenv {
        Ok(Some(path)) => info!(message = "loaded environment file", path = ?path),
        Ok(None) => {}
        Err(err) => {
            error!(message = "load environment file failed", %err);
            std::process::exit(exitcode::CONFIG);
        }
    }

    let config = match Config::resolve(&opts, |key| std::env::var(key).ok()) {
        Ok(config) => config,
        Err(err) => {
            error!(message = "invalid configuration", %err);
            std::process::exit(exitcode::CONFIG);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(message = "build tokio runtime failed", %err);
            std::process::exit(exitcode::OSERR);
        }
    };

    let code = runtime.block_on(async move {
        let client = aws::Client::new(&config.client_config());

        match driver::converge(&client, &config).await {
            Ok(report) => {
                if config.dry_run && !report.delta.is_empty() {
                    warn!(message = "dry run finished with pending changes");
                }

                info!(
                    message = "job complete",
                    registered = report.registered,
                    deregistered = report.deregistered,
                );

                exitcode::OK
            }
            Err(err) => {
                error!(message = "job failed", %err);
                err.exit_code()
            }
        }
    });

    std::process::exit(code)
}
