use actix_web::http::StatusCode;
use actix_web::{HttpResponse, error, web};

/// Body of every error response.
#[derive(Debug, serde::Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
    #[serde(rename = "errorType", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<&'a str>,
}

/// Build a JSON error response.
/// # Arguments
/// * `status` - The HTTP status to respond with.
/// * `message` - Human readable description of the failure.
/// * `error_type` - Optional machine readable failure category.
/// # Returns
/// An HttpResponse with an `{error, errorType?}` body.
pub fn json_error(status: StatusCode, message: &str, error_type: Option<&str>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody {
        error: message,
        error_type,
    })
}

/// JSON extractor configuration answering unreadable bodies with a 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::warn!(error = %err, "Rejected an unreadable JSON body");
        let response = json_error(StatusCode::BAD_REQUEST, "Invalid request body.", None);
        error::InternalError::from_response(err, response).into()
    })
}
