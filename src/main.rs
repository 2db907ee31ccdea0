use std::net::SocketAddr;

use axum::http::{header, HeaderName, HeaderValue, Method};
use gesture_backend::config::Config;
use gesture_backend::logging::{init_tracing, LogConfig};
use gesture_backend::routes::build_router;
use gesture_backend::state::AppState;
use tokio::sync::broadcast;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

const CSP_HEADER: &str = "default-src 'self'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'; connect-src 'self'; img-src 'self' data: blob:; media-src 'self' blob:; frame-ancestors 'none'; base-uri 'self'";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    init_tracing(&LogConfig::from(&config));
    tracing::info!(
        pointer_backend = %config.pointer_backend,
        warning_ear_threshold = config.warning.ear_threshold,
        warning_consec_frames = config.warning.consec_frames,
        "Starting gesture-backend"
    );

    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(&config, shutdown_tx.clone());

    let app = build_router(state)
        .layer(build_cors_layer(&config))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("content-security-policy"),
            HeaderValue::from_static(CSP_HEADER),
        ));

    let addr = SocketAddr::new(config.host, config.port);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind TCP listener");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "Listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx.clone()))
        .await
    {
        tracing::error!(error = %e, "HTTP server crashed");
    }

    tracing::info!("Shutdown complete");
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_methods([Method::GET, Method::POST]);

    if config.cors_origin.trim() == "*" {
        return base.allow_origin(Any);
    }

    match config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => base.allow_origin(origin),
        Err(e) => {
            // 同源页面不受影响，只是跨域请求会被浏览器拒绝
            tracing::error!(
                origin = %config.cors_origin,
                error = %e,
                "Invalid CORS_ORIGIN, cross-origin requests disabled"
            );
            base
        }
    }
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting for ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
    // SSE 与 MJPEG 流收到后结束，否则优雅退出会一直等待
    let _ = shutdown_tx.send(());
}
