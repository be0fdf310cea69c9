use crate::errors::{ResultResp, ServerError};
use astra::{Body, Response, ResponseBuilder};
use serde::Serialize;
use serde_json::json;
use tracing::error;

/// Serializes `value` as a JSON response body.
pub fn json_response<T: Serialize>(status: u16, value: &T) -> ResultResp {
    let body = serde_json::to_string(value)
        .map_err(|e| ServerError::DbError(format!("JSON encoding failed: {e}")))?;

    let resp = ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "application/json; charset=utf-8")
        .body(Body::from(body))
        .unwrap();

    Ok(resp)
}

/// Converts a ServerError into a JSON error response. Store-level detail
/// goes to the log, never onto the wire.
pub fn error_to_response(err: ServerError) -> Response {
    let (status, message) = match &err {
        ServerError::NotFound => (404, "Not Found".to_string()),
        ServerError::BadRequest(msg) => (400, msg.clone()),
        ServerError::DbError(msg) => {
            error!(error = %msg, "request failed");
            (500, "Internal Server Error".to_string())
        }
        ServerError::InternalError => (500, "Internal Server Error".to_string()),
    };

    let body = json!({ "success": false, "message": message }).to_string();

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "application/json; charset=utf-8")
        .body(Body::from(body))
        .unwrap()
}
