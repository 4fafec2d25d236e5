use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::infrastructure::bootstrap;
use crate::infrastructure::config::ConfigService;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = ConfigService::load().map_err(|err| {
        error!(error = %err, "Failed to load configuration");
        err
    })?;
    let context = bootstrap::setup(config)?;

    let address = format!(
        "http://{}:{}",
        context.config.server.host, context.config.server.port
    );

    actix_web::rt::System::new().block_on(async move {
        let server = crate::interfaces::http::start_server(
            context.config.clone(),
            context.sessions.clone(),
            context.logs.clone(),
        )?;
        info!(address = %address, "Review page available");
        server.await
    })?;

    info!("Server stopped");
    Ok(())
}
