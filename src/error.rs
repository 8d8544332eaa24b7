use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConcordanceError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConcordanceError {
    #[error("survival data is broken: {message}")]
    InvalidInput { message: String },

    #[error("bad parameter: {parameter} = {value}")]
    InvalidConfiguration { parameter: String, value: String },

    #[error("not enough data: {message}")]
    InsufficientData { message: String },

    #[error("all {num_samples} bootstrap resamples had no comparable pairs")]
    StatisticalDegeneracy { num_samples: usize },

    #[error("couldn't read config: {message}")]
    Config { message: String },
}

impl ConcordanceError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    pub fn invalid_configuration(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidConfiguration {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::InsufficientData { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}

impl From<toml::de::Error> for ConcordanceError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}
