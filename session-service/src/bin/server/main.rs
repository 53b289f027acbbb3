use std::sync::Arc;

use auth::Authenticator;
use auth::PasswordHasher;
use session_service::config::Config;
use session_service::config::DatabaseBackend;
use session_service::domain::user::ports::UserServicePort;
use session_service::domain::user::service::UserService;
use session_service::inbound::http::router::create_router;
use session_service::inbound::http::transport;
use session_service::outbound::repositories::InMemoryUserRepository;
use session_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // A missing .env is fine; real deployments set the environment directly
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_service=debug,auth=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "session-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        backend = ?config.database.backend,
        http_port = config.server.http_port,
        issuer = %config.jwt.issuer,
        ttl_minutes = config.jwt.ttl_minutes,
        transport = ?config.session.transport,
        "Configuration loaded"
    );

    let password_hasher = PasswordHasher::with_cost(config.password.cost())?;
    let authenticator = Arc::new(
        Authenticator::new(
            config.jwt.secret_bytes(),
            config.jwt.issuer.clone(),
            config.jwt.ttl()?,
        )
        .with_password_hasher(password_hasher),
    );

    let user_service: Arc<dyn UserServicePort> = match config.database.backend {
        DatabaseBackend::Postgres => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(&config.database.url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
            Arc::new(UserService::new(user_repository, Arc::clone(&authenticator)))
        }
        DatabaseBackend::Memory => {
            tracing::warn!("Using in-memory user storage; users are lost on restart");
            let user_repository = Arc::new(InMemoryUserRepository::new());
            Arc::new(UserService::new(user_repository, Arc::clone(&authenticator)))
        }
    };

    let session_transport = transport::from_config(&config.session);

    let http_address = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, authenticator, session_transport);

    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exited successfully");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
