use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::borrow::Cow;

/// Errors as the client sees them.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Unauthorized: {0}")]
    Unauthorized(Cow<'static, str>),
    #[error("Forbidden: {0}")]
    Forbidden(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Conflict: {0}")]
    Conflict(Cow<'static, str>),
    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(Cow<'static, str>),
    #[error("Internal Server Error")]
    InternalServer,
}

#[derive(serde::Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: Cow<'static, str>,
}

impl Error {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Forbidden(msg.into())
    }

    fn code(&self) -> &'static str {
        match self {
            Error::BadRequest(_) => "bad_request",
            Error::Unauthorized(_) => "unauthorized",
            Error::Forbidden(_) => "permission_denied",
            Error::NotFound(_) => "not_found",
            Error::Conflict(_) => "conflict",
            Error::PayloadTooLarge(_) => "quota_exceeded",
            Error::InternalServer => "internal",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match *self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::InternalServer => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            Error::NotFound(msg)
            | Error::Conflict(msg)
            | Error::Unauthorized(msg)
            | Error::BadRequest(msg)
            | Error::Forbidden(msg)
            | Error::PayloadTooLarge(msg) => msg.clone(),
            // Details stay in the server log.
            Error::InternalServer => "Internal Server Error".into(),
        };

        HttpResponse::build(self.status_code()).json(ErrorBody { code: self.code(), message })
    }
}

/// Which upload ceiling was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaScope {
    File { limit: i64 },
    Account { limit: i64, used: i64 },
}

#[derive(thiserror::Error, Debug)]
pub enum SystemError {
    #[error("JWT Error")]
    JwtError(#[from] jsonwebtoken::errors::Error),
    #[error("Database Error : {0}")]
    DatabaseError(Cow<'static, str>),
    #[error("Artifact IO Error: {0}")]
    ArtifactIo(#[from] std::io::Error),
    #[error("Upstream Fetch Error: {0}")]
    UpstreamFetch(Cow<'static, str>),
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Forbidden: {0}")]
    Forbidden(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Database Conflict: {0:?}")]
    Conflict(Option<DbErrorMeta>),
    #[error("Quota Exceeded: {0:?}")]
    QuotaExceeded(QuotaScope),
    #[error("File already shared with this friend")]
    AlreadyShared,
    #[error("Can only share files with friends")]
    NotFriends,
    #[error("Internal System Error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug)]
pub struct DbErrorMeta {
    pub constraint: Option<String>,
}

fn conflict_message(meta: &Option<DbErrorMeta>) -> Cow<'static, str> {
    let constraint = meta.as_ref().and_then(|m| m.constraint.as_deref());

    match constraint {
        Some("uq_file_shares_friend") => "File already shared with this friend".into(),
        Some("file_shares_share_token_key") => "Share link could not be created, try again".into(),
        Some("files_filename_key") => "Upload collided with an existing artifact, try again".into(),
        _ => "Duplicate value".into(),
    }
}

fn quota_message(scope: QuotaScope) -> Cow<'static, str> {
    const MIB: i64 = 1024 * 1024;
    match scope {
        QuotaScope::File { limit } => {
            format!("File size exceeds the {} MB limit", limit / MIB).into()
        }
        QuotaScope::Account { limit, used } => {
            format!("Storage limit exceeded ({} MB, {} bytes in use)", limit / MIB, used).into()
        }
    }
}

impl From<SystemError> for Error {
    fn from(value: SystemError) -> Self {
        match value {
            SystemError::BadRequest(msg) => Error::BadRequest(msg),
            SystemError::Forbidden(msg) => Error::Forbidden(msg),
            SystemError::NotFound(msg) => Error::NotFound(msg),
            SystemError::Conflict(meta) => Error::Conflict(conflict_message(&meta)),
            SystemError::QuotaExceeded(scope) => Error::PayloadTooLarge(quota_message(scope)),
            SystemError::AlreadyShared => Error::Conflict(SystemError::AlreadyShared.to_string().into()),
            SystemError::NotFriends => Error::Forbidden(SystemError::NotFriends.to_string().into()),
            SystemError::JwtError(_) => Error::Unauthorized("Token Invalid or Expired".into()),
            _ => {
                log::error!("Internal Server Error: {:?}", value);
                Error::InternalServer
            }
        }
    }
}

impl From<sqlx::Error> for SystemError {
    fn from(err: sqlx::Error) -> Self {
        let sqlx::Error::Database(db_err) = &err else {
            log::error!("{:?}", err);
            return SystemError::InternalError(Box::new(err));
        };

        match db_err.code().as_deref() {
            Some("23505") => {
                log::debug!("Unique violation: {}", db_err.message());
                SystemError::Conflict(Some(DbErrorMeta {
                    constraint: db_err.constraint().map(|s| s.to_string()),
                }))
            }
            // A grant or upload that points at an account the account service
            // no longer has.
            Some("23503") => SystemError::NotFound("Referenced user or file does not exist".into()),
            _ => {
                log::error!("Unhandled DB error: {:?}", db_err);
                SystemError::DatabaseError(db_err.message().to_string().into())
            }
        }
    }
}

impl SystemError {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Forbidden(msg.into())
    }
}
