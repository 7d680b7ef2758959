use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use taskhub_api::cookies::CookieConfig;
use taskhub_api::{router, AppState};
use taskhub_core::services::{AuthService, SessionManager, SessionTtl};
use taskhub_infrastructure::{create_pool, PgUserRepository, RedisSessionStore};
use taskhub_security::JwtService;
use taskhub_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize telemetry
    taskhub_shared::telemetry::init_telemetry();

    info!("Taskhub server starting...");

    // Load configuration (includes the JWT-secret sanity check)
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Connect to the identity store
    let pool = create_pool(&config.database.url, config.database.max_connections).await?;
    info!("Database connection established");

    // Connect to the session store
    let session_store = RedisSessionStore::connect(&config.redis.url).await?;
    info!("Session store connection established");

    // Wire services
    let jwt = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));
    let session_manager = Arc::new(SessionManager::new(
        Arc::new(session_store),
        SessionTtl {
            short: config.session.ttl_short,
            long: config.session.ttl_long,
        },
    ));
    let auth_service = Arc::new(AuthService::new(
        Arc::new(PgUserRepository::new(pool)),
        session_manager.clone(),
        jwt.clone(),
    ));

    let state = AppState {
        auth_service,
        session_manager,
        jwt,
        cookies: CookieConfig {
            secure: config.is_production(),
            access_max_age: config.jwt.access_token_expiry,
            ttl_short: config.session.ttl_short,
            ttl_long: config.session.ttl_long,
        },
    };

    // Build router; cookies require a credentialed CORS policy with an
    // explicit origin, never a wildcard.
    let app = router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(config.app.allowed_origin.parse::<HeaderValue>()?)
                .allow_credentials(true)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-csrf-token")]),
        )
        .layer(TraceLayer::new_for_http());

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
