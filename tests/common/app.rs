use axum::Router;
use tokio::sync::broadcast;

use gesture_backend::config::{Config, FrameConfig, PointerBackend};
use gesture_backend::routes::build_router;
use gesture_backend::state::AppState;
use gesture_core::{ActionDispatcher, RecordingSink, WarningConfig};

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    /// Every pointer action the session dispatched
    pub sink: RecordingSink,
    pub shutdown_tx: broadcast::Sender<()>,
}

pub fn test_config() -> Config {
    // 直接构造 Config，避免使用 set_var 造成多线程测试环境变量竞态
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 5000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        cors_origin: "http://localhost:5000".to_string(),
        max_sse_connections: 4,
        max_video_connections: 2,
        frame: FrameConfig {
            jpeg_quality: 70,
            default_width: 640,
            default_height: 480,
        },
        pointer_backend: PointerBackend::Noop,
        warning: WarningConfig {
            ear_threshold: 0.25,
            consec_frames: 3,
        },
    }
}

pub async fn spawn_with_config(config: Config) -> TestApp {
    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let sink = RecordingSink::new();
    let dispatcher = ActionDispatcher::new(Box::new(sink.clone()));

    let state = AppState::with_dispatcher(&config, dispatcher, shutdown_tx.clone());
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        sink,
        shutdown_tx,
    }
}

pub async fn spawn_test_server() -> TestApp {
    spawn_with_config(test_config()).await
}
