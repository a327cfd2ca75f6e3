use async_trait::async_trait;
use axum::http::HeaderMap;
use rolegate_core::{AppError, AppResult, SubjectId};

/// Header carrying the subject id resolved by an upstream gateway.
pub const SUBJECT_ID_HEADER: &str = "x-subject-id";

/// Resolves the subject behind a request. Credential verification happens
/// upstream; implementations only map request data to a subject id.
#[async_trait]
pub trait SubjectAuthenticator: Send + Sync {
    /// Returns `None` when the request carries no subject.
    async fn authenticate(&self, headers: &HeaderMap) -> AppResult<Option<SubjectId>>;
}

/// Trusts the subject id forwarded in [`SUBJECT_ID_HEADER`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderSubjectAuthenticator;

#[async_trait]
impl SubjectAuthenticator for HeaderSubjectAuthenticator {
    async fn authenticate(&self, headers: &HeaderMap) -> AppResult<Option<SubjectId>> {
        let Some(value) = headers.get(SUBJECT_ID_HEADER) else {
            return Ok(None);
        };

        value
            .to_str()
            .ok()
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|value| *value > 0)
            .map(|value| Some(SubjectId::from_i64(value)))
            .ok_or_else(|| AppError::Unauthorized(format!("invalid {SUBJECT_ID_HEADER} header")))
    }
}

/// Development stand-in resolving every request to one fixed subject.
#[derive(Debug, Clone, Copy)]
pub struct StaticSubjectAuthenticator {
    subject_id: SubjectId,
}

impl StaticSubjectAuthenticator {
    pub fn new(subject_id: SubjectId) -> Self {
        Self { subject_id }
    }
}

#[async_trait]
impl SubjectAuthenticator for StaticSubjectAuthenticator {
    async fn authenticate(&self, _headers: &HeaderMap) -> AppResult<Option<SubjectId>> {
        Ok(Some(self.subject_id))
    }
}

/// Request extension holding the resolved subject id, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentSubject(pub Option<SubjectId>);
