//! Errors raised by the external collaborators.

use thiserror::Error;

/// Failure talking to the model, speech, recipe, video or encyclopedia APIs.
///
/// Never fatal: the dispatcher turns every variant into an apology.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{service} sent an unexpected payload: {reason}")]
    Malformed {
        service: &'static str,
        reason: String,
    },

    #[error("{service} is not configured: missing {variable}")]
    MissingCredentials {
        service: &'static str,
        variable: &'static str,
    },
}

impl ServiceError {
    pub fn http(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self::Http { service, source }
    }

    pub fn malformed(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            service,
            reason: reason.into(),
        }
    }

    /// Turn a non-success response into [`ServiceError::Status`].
    pub async fn check(
        service: &'static str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, Self> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Self::Status {
            service,
            status,
            body,
        })
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
