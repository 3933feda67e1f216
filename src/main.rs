use std::net::SocketAddr;

use recruitment_tracker::{
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    routes, telemetry, AppState,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    telemetry::init(&config.log_level, config.log_format)?;
    let server_address = config.server_address()?;
    let jwt_secret = config.jwt_secret()?.to_string();

    let app_state = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.database_max_connections).await?;
            run_migrations(&pool).await?;
            AppState::postgres(pool, jwt_secret)
        }
        None => {
            warn!("DATABASE_URL is not set; records live in memory and are lost on exit");
            AppState::in_memory(jwt_secret)
        }
    };

    let app = routes::router(app_state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
