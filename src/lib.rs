pub mod configuration;
pub mod domain;
pub mod email_client;
pub mod legacy_import;
pub mod notifier;
pub mod pipeline;
pub mod routes;
pub mod startup;
pub mod store;
pub mod telemetry;
pub mod utils;
