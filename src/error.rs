#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("user not found")]
    Username,

    #[error("platform not found: {0}")]
    Platform(String),

    #[error("upstream markup changed: {0}")]
    BrokenChanges(String),

    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    EnvVar(#[from] EnvVarError),

    #[error("invalid value for {var}: {message}")]
    Config { var: String, message: String },

    #[error("JSON serialization error: {0}")]
    JSON(#[from] JSONError),
}

impl Error {
    pub fn config(var: &str, message: impl std::fmt::Display) -> Self {
        Self::Config {
            var: var.into(),
            message: message.to_string(),
        }
    }

    /// Message carried in the `details` field of a failure body.
    pub fn details(&self) -> String {
        match self {
            Error::Username => "Invalid username".into(),
            Error::Platform(_) => "Invalid Platform".into(),
            Error::BrokenChanges(_) => "API broken due to site changes".into(),
            other => other.to_string(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
#[error("{source} ({var})")]
pub struct EnvVarError {
    var: String,
    #[source]
    source: std::env::VarError,
}

impl EnvVarError {
    pub fn new(var: &str, source: std::env::VarError) -> Self {
        Self {
            var: var.into(),
            source,
        }
    }
}

#[derive(thiserror::Error, Debug)]
#[error("{source} ({context})")]
pub struct JSONError {
    context: &'static str,
    #[source]
    source: serde_json::Error,
}

impl JSONError {
    pub fn new(context: &'static str, source: serde_json::Error) -> Self {
        Self { context, source }
    }
}

#[cfg(test)]
mod test {
    use super::Error;

    #[test]
    fn test_details_messages() {
        assert_eq!(Error::Username.details(), "Invalid username");
        assert_eq!(
            Error::Platform("hackerrank".into()).details(),
            "Invalid Platform"
        );
        assert_eq!(
            Error::BrokenChanges("rank cell".into()).details(),
            "API broken due to site changes"
        );
        assert_eq!(
            Error::config("PROFILES_TIMEOUT_SECS", "not a number").details(),
            "invalid value for PROFILES_TIMEOUT_SECS: not a number"
        );
    }
}
