use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};

use crate::notifier::Notifier;
use crate::pipeline::{NewsletterError, NewsletterOutcome, NewsletterRequest, subscribe};
use crate::store::RecordStore;
use crate::utils::json_error;

impl ResponseError for NewsletterError {
    fn status_code(&self) -> StatusCode {
        match self {
            NewsletterError::ValidationError(_) => StatusCode::BAD_REQUEST,
            NewsletterError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            NewsletterError::ValidationError(message) => message.as_str(),
            NewsletterError::StoreError(_) => "Unable to subscribe right now. Please try again later.",
        };
        json_error(self.status_code(), message, None)
    }
}

/// `201 Created` for a new subscriber, `200 OK` when already subscribed.
#[tracing::instrument(name = "Subscribe to the newsletter", skip(store, notifier, body))]
pub async fn subscribe_to_newsletter(
    store: web::Data<dyn RecordStore>,
    notifier: web::Data<Notifier>,
    body: web::Json<NewsletterRequest>,
) -> Result<HttpResponse, NewsletterError> {
    let outcome = subscribe(store.get_ref(), &notifier, body.into_inner()).await?;
    let response = match &outcome {
        NewsletterOutcome::Subscribed { .. } => HttpResponse::Created().json(outcome.to_response()),
        NewsletterOutcome::AlreadySubscribed => HttpResponse::Ok().json(outcome.to_response()),
    };
    Ok(response)
}
