use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::json;
use shared::http::{json_response, make_error_response};

/// JSON response, or a bare 500 if `value` cannot be serialized.
pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Response<Bytes> {
    json_response(status, value).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize response");
        make_error_response(StatusCode::INTERNAL_SERVER_ERROR)
    })
}

/// A response marker, sent as a JSON string.
pub fn marker(status: StatusCode, marker: &'static str) -> Response<Bytes> {
    json(status, &marker)
}

pub fn error(status: StatusCode, message: impl Into<String>) -> Response<Bytes> {
    json(status, &json!({ "error": message.into() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::SUCCESS;

    #[test]
    fn test_marker_is_json_string() {
        let response = marker(StatusCode::OK, SUCCESS);
        assert_eq!(response.body().as_ref(), b"\"Success\"");
    }

    #[test]
    fn test_error_body() {
        let response = error(StatusCode::INTERNAL_SERVER_ERROR, "file not allowed: x.json");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.body().as_ref(),
            br#"{"error":"file not allowed: x.json"}"#
        );
    }
}
