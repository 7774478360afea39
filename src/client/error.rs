use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single API call.
///
/// Cloneable so one refresh failure can be handed to every request waiting on it.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("request failed with status {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// How a failure is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Server,
    Network,
    Timeout,
    Other,
}

impl ClientError {
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Status { status, .. } => match *status {
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::Validation,
                StatusCode::UNAUTHORIZED => ErrorKind::Unauthorized,
                StatusCode::FORBIDDEN => ErrorKind::Forbidden,
                StatusCode::NOT_FOUND => ErrorKind::NotFound,
                StatusCode::CONFLICT => ErrorKind::Conflict,
                s if s.is_server_error() => ErrorKind::Server,
                _ => ErrorKind::Other,
            },
            Self::Network(_) => ErrorKind::Network,
            Self::Timeout => ErrorKind::Timeout,
            Self::Decode(_) | Self::InvalidRequest(_) => ErrorKind::Other,
        }
    }

    /// Short heading for a toast or dialog.
    #[must_use]
    pub fn title(&self) -> &'static str {
        if self.status() == Some(StatusCode::UNPROCESSABLE_ENTITY) {
            return "Validation Failed";
        }
        match self.kind() {
            ErrorKind::Validation => "Validation Error",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Access Denied",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::Server => "Server Error",
            ErrorKind::Network => "Network Error",
            ErrorKind::Timeout => "Request Timeout",
            ErrorKind::Other => "Request Failed",
        }
    }

    /// Human-readable explanation. Prefers the server's message where one is shown to users.
    #[must_use]
    pub fn user_message(&self) -> String {
        let server_message = match self {
            Self::Status { message, .. } if !message.is_empty() => Some(message.clone()),
            _ => None,
        };

        match (self.kind(), self.status()) {
            (_, Some(StatusCode::UNPROCESSABLE_ENTITY)) => {
                server_message.unwrap_or_else(|| "The data provided could not be processed".to_string())
            }
            (ErrorKind::Validation, _) => {
                server_message.unwrap_or_else(|| "Please check your input and try again".to_string())
            }
            (ErrorKind::Unauthorized, _) => "Please log in to continue".to_string(),
            (ErrorKind::Forbidden, _) => "You do not have permission to perform this action".to_string(),
            (ErrorKind::NotFound, _) => {
                server_message.unwrap_or_else(|| "The requested resource was not found".to_string())
            }
            (ErrorKind::Conflict, _) => server_message.unwrap_or_else(|| "This item already exists".to_string()),
            (ErrorKind::Server, _) => "Something went wrong on our end. Please try again later".to_string(),
            (ErrorKind::Network, _) => "Unable to connect to the server. Please check your connection".to_string(),
            (ErrorKind::Timeout, _) => "The request took too long. Please try again".to_string(),
            (ErrorKind::Other, _) => server_message.unwrap_or_else(|| self.to_string()),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else if e.is_builder() {
            Self::InvalidRequest(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16, message: &str) -> ClientError {
        ClientError::Status { status: StatusCode::from_u16(code).unwrap(), message: message.to_string() }
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(status(400, "").kind(), ErrorKind::Validation);
        assert_eq!(status(422, "").kind(), ErrorKind::Validation);
        assert_eq!(status(401, "").kind(), ErrorKind::Unauthorized);
        assert_eq!(status(403, "").kind(), ErrorKind::Forbidden);
        assert_eq!(status(404, "").kind(), ErrorKind::NotFound);
        assert_eq!(status(409, "").kind(), ErrorKind::Conflict);
        assert_eq!(status(503, "").kind(), ErrorKind::Server);
        assert_eq!(status(418, "").kind(), ErrorKind::Other);
        assert_eq!(ClientError::Timeout.kind(), ErrorKind::Timeout);
        assert_eq!(ClientError::Network("refused".to_string()).kind(), ErrorKind::Network);
    }

    #[test]
    fn test_titles() {
        assert_eq!(status(400, "").title(), "Validation Error");
        assert_eq!(status(422, "").title(), "Validation Failed");
        assert_eq!(status(403, "").title(), "Access Denied");
        assert_eq!(status(500, "").title(), "Server Error");
        assert_eq!(ClientError::Timeout.title(), "Request Timeout");
        assert_eq!(ClientError::Network(String::new()).title(), "Network Error");
    }

    #[test]
    fn test_server_message_is_preferred_where_shown() {
        assert_eq!(status(404, "Route not found").user_message(), "Route not found");
        assert_eq!(status(404, "").user_message(), "The requested resource was not found");
        assert_eq!(status(409, "Unique constraint failed: airports_code_key").user_message(), "Unique constraint failed: airports_code_key");
        assert_eq!(status(500, "stack trace").user_message(), "Something went wrong on our end. Please try again later");
        assert_eq!(status(401, "Unauthorized").user_message(), "Please log in to continue");
    }
}
