use crate::{
    api::{account, admin, stats, submit},
    auth::TokenAuth,
    Error, Result, Settings,
};
use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use futures_util::TryFutureExt;
use sqlx::postgres::PgPool;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub async fn api_server(
    settings: &Settings,
    pool: PgPool,
    shutdown: triggered::Listener,
) -> Result {
    let token_auth = TokenAuth::new(&settings.token_secret, settings.token_lifetime);

    // build our application with some routes
    let app = Router::new()
        .route("/", get(health))
        // accounts
        .route("/register", post(account::register))
        .route("/login", post(account::login))
        .route("/admin/login", post(account::admin_login))
        // telemetry submission
        .route("/submit_data", post(submit::submit_data))
        // user-scoped stats
        .route("/stats/operator", get(stats::operator_stats))
        .route("/stats/network_type", get(stats::network_type_stats))
        .route(
            "/stats/signal_power_per_network",
            get(stats::signal_power_per_network),
        )
        .route(
            "/stats/signal_power_per_device",
            get(stats::signal_power_per_device),
        )
        .route("/stats/sinr_per_network", get(stats::sinr_per_network))
        // admin summaries
        .route("/admin/operator_summary", get(admin::operator_summary))
        .route(
            "/admin/network_type_summary",
            get(admin::network_type_summary),
        )
        .route(
            "/admin/signal_power_summary",
            get(admin::signal_power_summary),
        )
        .route("/admin/sinr_summary", get(admin::sinr_summary))
        .route(
            "/admin/device_activity_trend",
            get(admin::device_activity_trend),
        )
        // admin device presence
        .route(
            "/admin/connected_devices_count",
            get(admin::connected_devices_count),
        )
        .route(
            "/admin/previously_connected_devices",
            get(admin::previously_connected_devices),
        )
        .route(
            "/admin/currently_connected_devices",
            get(admin::currently_connected_devices),
        )
        .route("/admin/device_statistics", get(admin::device_statistics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(Extension(pool))
        .layer(Extension(token_auth));
    tracing::info!("api listening on {}", settings.listen);

    axum::Server::bind(&settings.listen)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("stopping server")
        })
        .map_err(Error::from)
        .await
}

async fn health() -> &'static str {
    "cell analyzer backend is running"
}
