use std::io;

use actix_web::http::StatusCode;
use actix_web::http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, USER_AGENT};
use actix_web::web::Bytes;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use tokio::io::AsyncReadExt;

use crate::domain::CatalogueAsset;
use crate::notifier::{DispatchErrorKind, Notifier};
use crate::pipeline::{CATALOGUE_SENT, CatalogueError, CatalogueRequest, send_catalogue};
use crate::utils::json_error;

const CHUNK_SIZE: usize = 64 * 1024;

impl ResponseError for CatalogueError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            None => StatusCode::BAD_REQUEST,
            Some(DispatchErrorKind::ConfigurationMissing) => StatusCode::SERVICE_UNAVAILABLE,
            Some(DispatchErrorKind::AttachmentMissing) => StatusCode::NOT_FOUND,
            Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        json_error(self.status_code(), &self.user_message(), self.error_type())
    }
}

#[tracing::instrument(name = "Email the catalogue", skip(notifier, catalogue, body))]
pub async fn email_catalogue(
    notifier: web::Data<Notifier>,
    catalogue: web::Data<CatalogueAsset>,
    body: web::Json<CatalogueRequest>,
) -> Result<HttpResponse, CatalogueError> {
    send_catalogue(&notifier, &catalogue, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": CATALOGUE_SENT,
    })))
}

/// Stream the catalogue PDF as a download.
#[tracing::instrument(
    name = "Download the catalogue",
    skip(catalogue, request),
    fields(client_ip = tracing::field::Empty, user_agent = tracing::field::Empty)
)]
pub async fn download_catalogue(
    catalogue: web::Data<CatalogueAsset>,
    request: HttpRequest,
) -> HttpResponse {
    let span = tracing::Span::current();
    let connection_info = request.connection_info().clone();
    if let Some(ip) = connection_info.realip_remote_addr() {
        span.record("client_ip", ip);
    }
    if let Some(agent) = request.headers().get(USER_AGENT).and_then(|v| v.to_str().ok()) {
        span.record("user_agent", agent.chars().take(100).collect::<String>().as_str());
    }

    match catalogue.size().await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::error!(path = %catalogue.path.display(), "Catalogue file not found");
            return json_error(StatusCode::NOT_FOUND, "Catalogue file not found", None);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to inspect the catalogue file");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to download catalogue", None);
        }
    }
    let file = match tokio::fs::File::open(&catalogue.path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::error!(error = %e, "Failed to open the catalogue file");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to download catalogue", None);
        }
    };
    tracing::info!("Catalogue download started");

    // Headers are already sent once streaming starts, so a read error can
    // only end the connection.
    let body = futures::stream::try_unfold(file, |mut file| async move {
        let mut buffer = vec![0; CHUNK_SIZE];
        let read = file.read(&mut buffer).await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed while streaming the catalogue");
        })?;
        if read == 0 {
            tracing::info!("Catalogue download completed");
            return Ok::<_, io::Error>(None);
        }
        buffer.truncate(read);
        Ok(Some((Bytes::from(buffer), file)))
    });

    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", catalogue.download_filename),
        ))
        .insert_header((CACHE_CONTROL, "no-cache"))
        .streaming(body)
}
