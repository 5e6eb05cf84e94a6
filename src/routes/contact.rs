use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};

use crate::notifier::Notifier;
use crate::pipeline::{ContactError, ContactRequest, submit_contact};
use crate::store::RecordStore;
use crate::utils::json_error;

impl ResponseError for ContactError {
    fn status_code(&self) -> StatusCode {
        match self {
            ContactError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ContactError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ContactError::ValidationError(message) => message.as_str(),
            ContactError::StoreError(_) => {
                "Unable to save your request right now. Please try again later."
            }
        };
        json_error(self.status_code(), message, None)
    }
}

#[tracing::instrument(name = "Submit contact form", skip(store, notifier, body))]
pub async fn submit_contact_form(
    store: web::Data<dyn RecordStore>,
    notifier: web::Data<Notifier>,
    body: web::Json<ContactRequest>,
) -> Result<HttpResponse, ContactError> {
    let outcome = submit_contact(store.get_ref(), &notifier, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(outcome.to_response()))
}
