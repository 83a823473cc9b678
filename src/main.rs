/// Hostel Complaint Management System
///
/// Serves the student and admin portals over HTTP, backed by a local SQLite file.
use hostel_complaints::{
    config::{LogFormat, LoggingConfig, ServerConfig},
    context::AppContext,
    error::AppResult,
    server,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration first so the log format can follow it
    let config = ServerConfig::from_env()?;

    init_tracing(&config.logging);

    print_banner(&config);

    let ctx = AppContext::new(config).await?;

    server::serve(ctx).await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn print_banner(config: &ServerConfig) {
    println!(
        r#"
  _   _           _       _
 | | | | ___  ___| |_ ___| |
 | |_| |/ _ \/ __| __/ _ \ |
 |  _  | (_) \__ \ ||  __/ |
 |_| |_|\___/|___/\__\___|_|

        {} v{}
        {}
        "#,
        config.branding.system_name,
        config.service.version,
        config.branding.college_name,
    );
}
