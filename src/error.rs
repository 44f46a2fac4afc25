use exitcode::ExitCode;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("malformed response, {what}")]
    MalformedResponse { what: String },

    #[error("{op} failed, {source}")]
    Remote {
        op: &'static str,
        #[source]
        source: aws::Error,
    },
}

impl Error {
    pub fn malformed(what: impl Into<String>) -> Self {
        Error::MalformedResponse { what: what.into() }
    }

    /// Classify a client error, a body that could not be decoded is a
    /// malformed response rather than a failed call.
    pub fn remote(op: &'static str, err: aws::Error) -> Self {
        if err.is_decode() {
            Error::MalformedResponse {
                what: format!("{op}: {err}"),
            }
        } else {
            Error::Remote { op, source: err }
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            Error::Config(_) => exitcode::CONFIG,
            Error::MalformedResponse { .. } => exitcode::DATAERR,
            Error::Remote { .. } => exitcode::UNAVAILABLE,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;

    #[test]
    fn exit_codes() {
        let err = Error::Config(ConfigError::Missing {
            field: "region",
            flag: "region",
            env: "AWS_REGION",
        });
        assert_eq!(err.exit_code(), exitcode::CONFIG);

        assert_eq!(Error::malformed("no id").exit_code(), exitcode::DATAERR);

        let err = Error::remote(
            "RegisterTargets",
            aws::Error::Api {
                status: StatusCode::FORBIDDEN,
                response: aws::ErrorResponse {
                    code: "AccessDenied".into(),
                    message: "denied".into(),
                },
            },
        );
        assert_eq!(err.exit_code(), exitcode::UNAVAILABLE);
        assert_eq!(
            err.to_string(),
            "RegisterTargets failed, api error, status: 403 Forbidden, code: AccessDenied, message: denied"
        );
    }
}
