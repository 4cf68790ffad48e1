mod config;
mod domain;
mod infrastructure;
mod presentation;
mod telemetry;
mod usecase;

use axum::Router;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    config::Config,
    domain::{
        repositories::user_repository::UserRepository, services::password_service::PasswordHasher,
    },
    infrastructure::{
        argon2_password_hasher::Argon2PasswordHasher, schema::ensure_schema,
        user_repository::SeaOrmUserRepository,
    },
    presentation::handlers::{
        auth_handler::create_auth_router, health_handler::create_health_router,
    },
    usecase::register_user_usecase::RegisterUserUsecase,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    telemetry::init(config.log_format)?;

    // Fail on bad hash settings before touching the database
    let password_hasher = Argon2PasswordHasher::with_cost(config.argon2)?;

    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(config.sql_logging);

    let db = Database::connect(opt).await?;
    ensure_schema(&db).await?;

    let user_repository = SeaOrmUserRepository::new(db.clone());
    let register_user_usecase = RegisterUserUsecase::new(user_repository, password_hasher);

    let app = create_app(register_user_usecase, db.clone(), config.debug_errors);

    let listener = TcpListener::bind(config.bind_address).await?;
    info!(address = %config.bind_address, "listening");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await?;
    info!("shutdown complete");
    Ok(())
}

fn create_app<R, P>(
    register_service: RegisterUserUsecase<R, P>,
    db: DatabaseConnection,
    debug_errors: bool,
) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    P: PasswordHasher,
{
    Router::new()
        .merge(create_health_router(db))
        .nest("/auth", create_auth_router(register_service, debug_errors))
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("gracefully shutting down");
}
