use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use api::MIGRATOR;
use api::config::{CountryCodes, ServerConfig};
use api::repositories::{EmployeeRepository, SessionRepository};
use api::routes;
use api::state::AppState;
use common::database::{self, DatabaseConfig, init_pool};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting employees API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity before taking traffic
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool, &MIGRATOR).await?;

    let country_codes = CountryCodes::load()?;

    let app_state = AppState {
        employee_repository: EmployeeRepository::new(pool.clone()),
        session_repository: SessionRepository::new(pool),
        country_codes,
    };

    info!("Employees API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let server_config = ServerConfig::from_env();
    let listener = TcpListener::bind(server_config.bind_address()).await?;
    info!(
        "Employees API service listening on {}",
        server_config.bind_address()
    );

    axum::serve(listener, app).await?;

    Ok(())
}
