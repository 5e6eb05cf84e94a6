use std::io;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing_actix_web::TracingLogger;

use crate::configuration::{DatabaseSettings, EmailClientSettings, Settings};
use crate::domain::CatalogueAsset;
use crate::email_client::{MailTransport, SmtpEmailClient};
use crate::notifier::{EmailRenderer, Notifier};
use crate::routes::{
    download_catalogue, email_catalogue, health_check, send_test_catalogue_email,
    send_test_contact_confirmation, submit_contact_form, subscribe_to_newsletter,
    verify_mail_transport,
};
use crate::store::{PgRecordStore, RecordStore};
use crate::telemetry::mask_email;
use crate::utils::json_config;

// Application struct representing the running application.
pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Build the application, sending mail over SMTP when credentials are configured.
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let transport = build_mail_transport(&configuration.email_client)?;
        Self::build_with_mail_transport(configuration, transport).await
    }

    /// Build the application around an explicit mail transport.
    /// `None` behaves like a deployment without mail credentials.
    pub async fn build_with_mail_transport(
        configuration: Settings,
        transport: Option<Arc<dyn MailTransport>>,
    ) -> Result<Self, anyhow::Error> {
        let email_settings = &configuration.email_client;
        if transport.is_some() {
            tracing::info!(
                smtp_host = %email_settings.host,
                smtp_port = email_settings.port,
                notification_email = %mask_email(&email_settings.notification_email),
                "Mail transport configured, email notifications are enabled"
            );
        } else {
            tracing::warn!(
                "SMTP configuration is missing or incomplete. Emails will not be sent until \
                 SMTP credentials are configured; contact and newsletter submissions are still stored."
            );
        }

        if let Some(transport) = transport.clone() {
            tokio::spawn(async move {
                check_mail_transport(transport.as_ref()).await;
            });
        }

        let notification_recipient = email_settings
            .notification_recipient()
            .map_err(anyhow::Error::msg)
            .context("Invalid notification email address")?;
        let notifier = Notifier::new(
            transport,
            EmailRenderer::new(
                &configuration.application.base_url,
                &email_settings.notification_email,
            ),
            email_settings.sender_name.clone(),
            notification_recipient,
        );

        let connection_pool = get_connection_pool(&configuration.database);
        let store: Arc<dyn RecordStore> = Arc::new(PgRecordStore::new(connection_pool));
        let catalogue = CatalogueAsset::from_settings(&configuration.catalogue);
        let diagnostics = configuration
            .application
            .diagnostics_enabled
            .then(|| email_settings.clone());

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind to {}", address))?;
        let port = listener.local_addr()?.port();
        let server = run(listener, store, notifier, catalogue, diagnostics)?;

        Ok(Self { port, server })
    }

    /// Get the port that the application is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> Result<(), io::Error> {
        self.server.await
    }
}

/// SMTP transport, or `None` when credentials are absent.
fn build_mail_transport(
    settings: &EmailClientSettings,
) -> Result<Option<Arc<dyn MailTransport>>, anyhow::Error> {
    let Some(credentials) = settings.credentials() else {
        return Ok(None);
    };
    let sender = settings
        .sender()
        .map_err(anyhow::Error::msg)
        .context("Invalid sender email address")?;
    let client = SmtpEmailClient::new(
        &settings.host,
        settings.port,
        sender,
        credentials,
        settings.timeout(),
    )?;
    Ok(Some(Arc::new(client)))
}

/// Open a connection to the mail server and log whether it accepts us.
/// Startup does not wait on this.
pub async fn check_mail_transport(transport: &dyn MailTransport) -> bool {
    match transport.verify_connection().await {
        Ok(()) => {
            tracing::info!("SMTP server ready, emails can be sent");
            true
        }
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "SMTP connection failed, check the SMTP credentials"
            );
            false
        }
    }
}

/// Run the HTTP server.
/// # Arguments
/// * `listener` - A TcpListener for incoming connections.
/// * `store` - Where submissions and subscribers are persisted.
/// * `notifier` - Sends the transactional emails.
/// * `catalogue` - The downloadable catalogue PDF.
/// * `diagnostics` - Mail settings to expose on the diagnostic routes, `None` to disable them.
/// # Returns
/// A Result containing the Server or an io::Error.
pub fn run(
    listener: TcpListener,
    store: Arc<dyn RecordStore>,
    notifier: Notifier,
    catalogue: CatalogueAsset,
    diagnostics: Option<EmailClientSettings>,
) -> Result<Server, io::Error> {
    let store: web::Data<dyn RecordStore> = web::Data::from(store);
    let notifier = web::Data::new(notifier);
    let catalogue = web::Data::new(catalogue);
    let diagnostics = diagnostics.map(web::Data::new);
    let server = HttpServer::new(move || {
        let diagnostics = diagnostics.clone();
        App::new()
            // Middleware logger
            .wrap(TracingLogger::default())
            .app_data(json_config())
            .route("/health", web::get().to(health_check))
            .route("/api/catalogue/download", web::get().to(download_catalogue))
            .route("/api/catalogue/email", web::post().to(email_catalogue))
            .route("/api/contact", web::post().to(submit_contact_form))
            .route("/api/newsletter", web::post().to(subscribe_to_newsletter))
            .configure(move |cfg| {
                if let Some(settings) = diagnostics {
                    cfg.app_data(settings)
                        .route("/api/test-email", web::get().to(verify_mail_transport))
                        .route(
                            "/api/test-contact-confirmation",
                            web::post().to(send_test_contact_confirmation),
                        )
                        .route(
                            "/api/test-catalogue-email",
                            web::post().to(send_test_catalogue_email),
                        );
                }
            })
            // Get a pointer copy and attach it to the application state
            .app_data(store.clone())
            .app_data(notifier.clone())
            .app_data(catalogue.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Get a connection pool to the database.
/// # Arguments
/// * `configuration` - A reference to the database settings.
/// # Returns
/// A `PgPool` instance.
pub fn get_connection_pool(configuration: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(configuration.with_db())
}
