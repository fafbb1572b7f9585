//! Entry point for the simple prediction service.

use std::process::ExitCode;

use api::config::{Config, ServiceVariant};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::from_env(ServiceVariant::Simple);
    api::server::init_tracing(&config);

    match api::server::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "simple service stopped");
            ExitCode::FAILURE
        }
    }
}
