use std::path::PathBuf;
use std::time::Duration;

use argh::FromArgs;
use http::Uri;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} has no value, set --{flag} or {env}")]
    Missing {
        field: &'static str,
        flag: &'static str,
        env: &'static str,
    },

    #[error("invalid {field} {value:?}, {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    match value {
        "text" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        _ => Err(format!("unknown log format {value:?}, expect text or json")),
    }
}

/// Converge a destination target group to the members of a source target
/// group that live in one availability zone.
#[derive(Debug, FromArgs)]
pub struct Options {
    /// the AWS region, defaults to $AWS_REGION
    #[argh(option)]
    pub region: Option<String>,

    /// availability zone to mirror, defaults to $AWS_AVAILABILITY_ZONE
    #[argh(option, short = 'z')]
    pub availability_zone: Option<String>,

    /// source target group ARN, defaults to $AWS_SRC_TG_ARN
    #[argh(option, short = 's')]
    pub source: Option<String>,

    /// destination target group ARN, defaults to $AWS_DEST_TG_ARN
    #[argh(option, short = 'd')]
    pub destination: Option<String>,

    /// elastic load balancing endpoint, defaults to $AWS_ELBV2_ENDPOINT
    #[argh(option)]
    pub elbv2_endpoint: Option<String>,

    /// the EC2 endpoint, defaults to $AWS_EC2_ENDPOINT
    #[argh(option)]
    pub ec2_endpoint: Option<String>,

    /// timeout of each API request in seconds
    #[argh(option, default = "DEFAULT_TIMEOUT_SECS")]
    pub timeout: u64,

    /// compute and log the changes without applying them
    #[argh(switch)]
    pub dry_run: bool,

    /// load environment variables from this file instead of ./.env
    #[argh(option)]
    pub env_file: Option<PathBuf>,

    /// log level, defaults to $TGSYNC_LOG or info
    #[argh(option, short = 'l')]
    pub log_level: Option<String>,

    /// log format, text or json
    #[argh(option, default = "LogFormat::Text", from_str_fn(parse_log_format))]
    pub log_format: LogFormat,

    /// show version
    #[argh(switch, short = 'v')]
    pub version: bool,
}

/// Everything a run needs, resolved once at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub region: String,
    pub availability_zone: String,
    pub source: String,
    pub destination: String,
    pub elbv2_endpoint: Option<String>,
    pub ec2_endpoint: Option<String>,
    pub timeout: Duration,
    pub dry_run: bool,
}

fn required(
    flag_value: &Option<String>,
    env: &dyn Fn(&str) -> Option<String>,
    field: &'static str,
    flag: &'static str,
    env_key: &'static str,
) -> Result<String, ConfigError> {
    optional(flag_value, env, env_key).ok_or(ConfigError::Missing {
        field,
        flag,
        env: env_key,
    })
}

/// Values are trimmed, empty values count as unset.
fn optional(
    flag_value: &Option<String>,
    env: &dyn Fn(&str) -> Option<String>,
    env_key: &str,
) -> Option<String> {
    flag_value
        .clone()
        .or_else(|| env(env_key))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn endpoint(value: Option<String>, field: &'static str) -> Result<Option<String>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let uri = value.parse::<Uri>().map_err(|err| ConfigError::Invalid {
        field,
        value: value.clone(),
        reason: err.to_string(),
    })?;

    match uri.scheme_str() {
        Some("http") | Some("https") => Ok(Some(value)),
        _ => Err(ConfigError::Invalid {
            field,
            value,
            reason: "scheme must be http or https".into(),
        }),
    }
}

impl Config {
    /// Resolve the configuration from command line options, falling back to
    /// `env` for anything not given as a flag.
    pub fn resolve<E>(options: &Options, env: E) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let region = required(&options.region, &env, "region", "region", "AWS_REGION")?;
        let availability_zone = required(
            &options.availability_zone,
            &env,
            "availability zone",
            "availability-zone",
            "AWS_AVAILABILITY_ZONE",
        )?;
        let destination = required(
            &options.destination,
            &env,
            "destination target group",
            "destination",
            "AWS_DEST_TG_ARN",
        )?;
        let source = required(
            &options.source,
            &env,
            "source target group",
            "source",
            "AWS_SRC_TG_ARN",
        )?;

        let elbv2_endpoint = endpoint(
            optional(&options.elbv2_endpoint, &env, "AWS_ELBV2_ENDPOINT"),
            "elbv2 endpoint",
        )?;
        let ec2_endpoint = endpoint(
            optional(&options.ec2_endpoint, &env, "AWS_EC2_ENDPOINT"),
            "ec2 endpoint",
        )?;

        if options.timeout == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout",
                value: "0".into(),
                reason: "must be greater than zero".into(),
            });
        }

        Ok(Config {
            region,
            availability_zone,
            source,
            destination,
            elbv2_endpoint,
            ec2_endpoint,
            timeout: Duration::from_secs(options.timeout),
            dry_run: options.dry_run,
        })
    }

    pub fn client_config(&self) -> aws::Config {
        let mut config = aws::Config::new(self.region.clone());
        config.elbv2_endpoint = self.elbv2_endpoint.clone();
        config.ec2_endpoint = self.ec2_endpoint.clone();
        config.timeout = self.timeout;

        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn options(args: &[&str]) -> Options {
        Options::from_args(&["tgsync"], args).unwrap()
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();

        move |key: &str| vars.get(key).cloned()
    }

    const FULL_ENV: &[(&str, &str)] = &[
        ("AWS_REGION", "us-east-1"),
        ("AWS_AVAILABILITY_ZONE", "us-east-1a"),
        ("AWS_SRC_TG_ARN", "arn:src"),
        ("AWS_DEST_TG_ARN", "arn:dest"),
    ];

    #[test]
    fn from_env() {
        let config = Config::resolve(&options(&[]), env(FULL_ENV)).unwrap();

        assert_eq!(
            config,
            Config {
                region: "us-east-1".into(),
                availability_zone: "us-east-1a".into(),
                source: "arn:src".into(),
                destination: "arn:dest".into(),
                elbv2_endpoint: None,
                ec2_endpoint: None,
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                dry_run: false,
            }
        );
    }

    #[test]
    fn flags_win() {
        let config = Config::resolve(
            &options(&[
                "--region",
                "eu-west-1",
                "-z",
                "eu-west-1b",
                "--elbv2-endpoint",
                "http://127.0.0.1:4566",
                "--timeout",
                "5",
                "--dry-run",
            ]),
            env(FULL_ENV),
        )
        .unwrap();

        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.availability_zone, "eu-west-1b");
        assert_eq!(config.source, "arn:src");
        assert_eq!(config.elbv2_endpoint.as_deref(), Some("http://127.0.0.1:4566"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.dry_run);
    }

    #[test]
    fn missing() {
        for (unset, field) in [
            ("AWS_REGION", "region"),
            ("AWS_AVAILABILITY_ZONE", "availability zone"),
            ("AWS_DEST_TG_ARN", "destination target group"),
            ("AWS_SRC_TG_ARN", "source target group"),
        ] {
            let vars = FULL_ENV
                .iter()
                .filter(|(k, _)| *k != unset)
                .copied()
                .collect::<Vec<_>>();

            let err = Config::resolve(&options(&[]), env(&vars)).unwrap_err();
            match err {
                ConfigError::Missing { field: got, .. } => assert_eq!(got, field),
                err => panic!("unexpected error {err:?}"),
            }
        }
    }

    #[test]
    fn empty_is_missing() {
        let mut vars = FULL_ENV.to_vec();
        vars[0] = ("AWS_REGION", "  ");

        let err = Config::resolve(&options(&[]), env(&vars)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "region has no value, set --region or AWS_REGION"
        );
    }

    #[test]
    fn values_are_trimmed() {
        let mut vars = FULL_ENV.to_vec();
        vars[1] = ("AWS_AVAILABILITY_ZONE", "us-east-1a \n");
        vars.push(("AWS_EC2_ENDPOINT", " http://localhost:4566 "));

        let config = Config::resolve(&options(&["--source", " arn:flag "]), env(&vars)).unwrap();

        assert_eq!(config.availability_zone, "us-east-1a");
        assert_eq!(config.source, "arn:flag");
        assert_eq!(config.ec2_endpoint.as_deref(), Some("http://localhost:4566"));
    }

    #[test]
    fn invalid_endpoint() {
        let mut vars = FULL_ENV.to_vec();
        vars.push(("AWS_EC2_ENDPOINT", "localhost:4566"));

        let err = Config::resolve(&options(&[]), env(&vars)).unwrap_err();
        assert!(
            matches!(err, ConfigError::Invalid { field: "ec2 endpoint", .. }),
            "{err:?}"
        );
    }

    #[test]
    fn zero_timeout() {
        let err = Config::resolve(&options(&["--timeout", "0"]), env(FULL_ENV)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "timeout", .. }));
    }

    #[test]
    fn log_format() {
        assert_eq!(options(&[]).log_format, LogFormat::Text);
        assert_eq!(options(&["--log-format", "json"]).log_format, LogFormat::Json);
        assert!(Options::from_args(&["tgsync"], &["--log-format", "xml"]).is_err());
    }

    #[test]
    fn client_config() {
        let mut vars = FULL_ENV.to_vec();
        vars.push(("AWS_ELBV2_ENDPOINT", "http://localhost:4566"));

        let config = Config::resolve(&options(&[]), env(&vars)).unwrap();
        let client = config.client_config();

        assert_eq!(client.region, "us-east-1");
        assert_eq!(client.elbv2_endpoint.as_deref(), Some("http://localhost:4566"));
        assert_eq!(client.ec2_endpoint, None);
    }
}
