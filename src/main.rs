use invoice_dashboard::{create_pool, db, router, AppConfig, AppState};
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // local timestamps, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_level(true)
        .init();

    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    if config.database.run_migrations {
        db::run_migrations(&pool).await?;
    }

    let app = router(AppState::new(pool, &config));

    let addr = config.bind_addr();
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/invoices/preview                  - live totals for unsaved items");
    info!("  GET  /api/companies/:id/invoices[/sent|/received|/export]");
    info!("  GET  /api/companies/:id/contacts[/vendors|/clients]");
    info!("  GET  /api/users[/:id[/companies]]");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
