use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use hypertext::{Rendered, maud, prelude::*};

use crate::{error::Error, widgets::alert::ErrorAlert};

pub fn see_other_ok(r: Redirect) -> StandardResponse {
    Ok(SuccessResponse::SeeOther(r))
}

pub fn err_not_found() -> StandardResponse {
    Err(FailureResponse::NotFound(()))
}

pub fn bad_request(html: Rendered<String>) -> StandardResponse {
    Err(FailureResponse::BadRequest(html))
}

pub fn forbidden(html: Rendered<String>) -> StandardResponse {
    Err(FailureResponse::Forbidden(html))
}

pub fn success(html: Rendered<String>) -> StandardResponse {
    Ok(SuccessResponse::Success(html))
}

pub type StandardResponse = Result<SuccessResponse, FailureResponse>;

pub enum SuccessResponse {
    Success(Rendered<String>),
    SeeOther(Redirect),
}

impl IntoResponse for SuccessResponse {
    fn into_response(self) -> Response {
        match self {
            SuccessResponse::Success(html) => {
                Html(html.into_inner()).into_response()
            }
            SuccessResponse::SeeOther(redirect) => redirect.into_response(),
        }
    }
}

#[derive(Debug)]
pub enum FailureResponse {
    BadRequest(Rendered<String>),
    NotFound(()),
    Unauthorized(()),
    Forbidden(Rendered<String>),
    ServerError(()),
}

impl IntoResponse for FailureResponse {
    fn into_response(self) -> Response {
        match self {
            FailureResponse::BadRequest(html) => {
                (StatusCode::BAD_REQUEST, Html(html.into_inner()))
                    .into_response()
            }
            FailureResponse::NotFound(()) => {
                (StatusCode::NOT_FOUND, "Not found").into_response()
            }
            FailureResponse::Unauthorized(()) => {
                (StatusCode::FORBIDDEN, "Forbidden").into_response()
            }
            FailureResponse::Forbidden(html) => {
                (StatusCode::FORBIDDEN, Html(html.into_inner()))
                    .into_response()
            }
            FailureResponse::ServerError(()) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                    .into_response()
            }
        }
    }
}

impl From<Error> for FailureResponse {
    fn from(err: Error) -> Self {
        match err {
            Error::Unauthorized => FailureResponse::Unauthorized(()),
            Error::NotFound => FailureResponse::NotFound(()),
            Error::Persistence(e) => {
                tracing::error!("database error: {e}");
                FailureResponse::ServerError(())
            }
            e => FailureResponse::BadRequest(
                maud! {
                    ErrorAlert msg=(e.to_string());
                }
                .render(),
            ),
        }
    }
}

impl From<diesel::result::Error> for FailureResponse {
    fn from(err: diesel::result::Error) -> Self {
        Error::from(err).into()
    }
}
