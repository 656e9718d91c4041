use thiserror::Error;
use toolbelt_proto::ErrorResponse;

/// Broad class of a failure, used by the HTTP layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    MethodNotAllowed,
    PayloadTooLarge,
    Internal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Invalid input. Please provide num1 and num2 as numbers.")]
    InvalidCalculation,

    #[error("Invalid request format.")]
    InvalidAbbreviationRequest,

    #[error("{label} abbreviation \"{code}\" not found.")]
    AbbreviationNotFound {
        label: &'static str,
        code: String,
        available: Vec<String>,
    },

    #[error("Invalid input parameters.")]
    InvalidGeneratorInput,

    #[error("{subject} length must be at least {min} characters.")]
    LengthTooShort { subject: &'static str, min: usize },

    #[error("{subject} length must be at most {max} characters.")]
    LengthTooLong { subject: &'static str, max: usize },

    #[error("Prefix is longer than desired length.")]
    PrefixTooLong,

    #[error("At least one character type must be selected.")]
    EmptyCharacterPool,

    #[error("Not found.")]
    RouteNotFound,

    #[error("Method not allowed.")]
    MethodNotAllowed,

    #[error("Request body too large.")]
    BodyTooLarge,

    #[error("Internal server error.")]
    Internal(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::AbbreviationNotFound { .. } | ApiError::RouteNotFound => ErrorKind::NotFound,
            ApiError::MethodNotAllowed => ErrorKind::MethodNotAllowed,
            ApiError::BodyTooLarge => ErrorKind::PayloadTooLarge,
            ApiError::Internal(_) => ErrorKind::Internal,
            _ => ErrorKind::BadRequest,
        }
    }

    /// Builds the JSON failure envelope. Internal details never leave the process.
    pub fn to_response(&self) -> ErrorResponse {
        let response = ErrorResponse::new(self.to_string());
        match self {
            ApiError::AbbreviationNotFound { available, .. } => {
                response.with_available(available.clone())
            }
            _ => response,
        }
    }
}
