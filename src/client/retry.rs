use crate::client::ApiRequest;
use crate::client::error::ClientError;
use std::fmt;
use std::time::Duration;

/// What to change about a request before it is sent again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMutation {
    /// Resend unchanged.
    None,
    /// Obtain a fresh access token and resend with it.
    RefreshAuthorization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Fail,
    Retry { delay: Duration, mutation: RequestMutation },
}

/// Decides whether a failed request is worth another attempt.
///
/// A request is retried at most once regardless of the policy.
pub trait RetryPolicy: Send + Sync + fmt::Debug {
    fn decide(&self, request: &ApiRequest, error: &ClientError) -> RetryDecision;
}

/// Refreshes the access token when an authenticated request comes back 401.
#[derive(Debug, Default, Clone, Copy)]
pub struct RefreshOnUnauthorized;

impl RetryPolicy for RefreshOnUnauthorized {
    fn decide(&self, request: &ApiRequest, error: &ClientError) -> RetryDecision {
        if request.is_retried() || !request.is_refreshable() || !error.is_unauthorized() {
            return RetryDecision::Fail;
        }
        RetryDecision::Retry { delay: Duration::ZERO, mutation: RequestMutation::RefreshAuthorization }
    }
}
