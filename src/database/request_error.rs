use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::{json, Json};
use rocket::Request;
use thiserror::Error;

/// Everything that can go wrong while serving an API request.
///
/// Validation failures are client errors and name the offending field;
/// storage faults surface the underlying message as a server error.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid value for field: {field}")]
    InvalidField { field: &'static str },

    #[error("{0}")]
    Storage(#[from] sqlx::Error),
}

impl RequestError {
    fn status(&self) -> Status {
        match self {
            Self::MissingField { .. } | Self::InvalidField { .. } => Status::BadRequest,
            Self::Storage(_) => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for RequestError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).respond_to(request)
    }
}

pub type RequestResult<T> = std::result::Result<T, RequestError>;
