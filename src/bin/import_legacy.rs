//! Usage: `import-legacy [DATA_DIRECTORY]` (defaults to `data`).

use std::path::PathBuf;

use anyhow::Context;
use archikmor_backend::configuration::get_configuration;
use archikmor_backend::legacy_import::import_directory;
use archikmor_backend::startup::get_connection_pool;
use archikmor_backend::store::PgRecordStore;
use archikmor_backend::telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("import-legacy".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let directory = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    let configuration = get_configuration()?;
    let pool = get_connection_pool(&configuration.database);
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate the database")?;

    let store = PgRecordStore::new(pool);
    let summary = import_directory(&store, &directory).await?;
    tracing::info!(
        contact_submissions_migrated = summary.contact_submissions.migrated,
        contact_submissions_skipped = summary.contact_submissions.skipped,
        newsletter_subscribers_migrated = summary.newsletter_subscribers.migrated,
        newsletter_subscribers_skipped = summary.newsletter_subscribers.skipped,
        "Legacy import complete"
    );
    Ok(())
}
