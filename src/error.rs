use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use reqwest::Error as HttpError;
use rocket::{http::Status, response::Responder};
use thiserror::Error;

use crate::model::{
    survey::{RowError, VoteError},
    user::VoterError,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Vote(#[from] VoteError),
    #[error(transparent)]
    Row(#[from] RowError),
    #[error(transparent)]
    Voter(#[from] VoterError),
    #[error("Spreadsheet API responded {status}: {message}")]
    Sheets { status: u16, message: String },
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::Status(Status::NotFound, format!("Not found: {}", what.into()))
    }

    pub fn bad_request(why: impl Into<String>) -> Self {
        Self::Status(Status::BadRequest, format!("Bad request: {}", why.into()))
    }

    pub fn unauthorized(why: impl Into<String>) -> Self {
        Self::Status(Status::Unauthorized, format!("Unauthorized: {}", why.into()))
    }

    /// The HTTP status this error is reported as.
    pub fn status(&self) -> Status {
        match self {
            Self::Http(err) if err.is_timeout() => Status::GatewayTimeout,
            Self::Http(_) => Status::BadGateway,
            Self::Jwt(err) => match err.kind() {
                JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
                    Status::Unauthorized
                }
                _ => Status::BadRequest,
            },
            Self::Vote(VoteError::IndexOutOfRange { .. }) => Status::NotFound,
            // The sheet itself is malformed; nothing the client can fix.
            Self::Row(_) => Status::InternalServerError,
            Self::Voter(_) => Status::BadRequest,
            Self::Sheets { status: 401, .. } => Status::Unauthorized,
            Self::Sheets { status: 403, .. } => Status::Forbidden,
            Self::Sheets { status: 404, .. } => Status::NotFound,
            Self::Sheets { .. } => Status::BadGateway,
            Self::Status(status, _) => *status,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        if status.code >= 500 {
            error!("{self}");
        } else {
            warn!("{self}");
        }
        Err(status)
    }
}
