use std::io;

use thiserror::Error;

/// Errors raised while framing http messages on a connection
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("failed to parse http message: {0}")]
    Parse(#[from] httparse::Error),

    #[error("http message head is missing the {0}")]
    MissingField(&'static str),

    #[error("failed to build http message: {0}")]
    Build(#[from] http::Error),

    #[error("invalid content-length header")]
    InvalidContentLength,

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<HttpError> for io::Error {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

/// Errors raised while reading the process configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name} value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Top level error of the `first_writer` process
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = Error::from(ConfigError::Invalid {
            name: "PORT",
            value: "eighty".to_owned(),
            reason: "invalid digit found in string".to_owned(),
        });
        assert_eq!(
            err.to_string(),
            "configuration error: invalid PORT value \"eighty\": invalid digit found in string"
        );
    }

    #[test]
    fn test_http_error_into_io() {
        let err: io::Error = HttpError::InvalidContentLength.into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(err.to_string(), "invalid content-length header");
    }
}
