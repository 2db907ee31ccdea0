use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use axum::body::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};

use gesture_core::{ActionDispatcher, Session, SessionEvent};

use crate::config::Config;
use crate::pointer;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// 长连接占用的一个名额，drop 时归还
pub struct ConnectionSlot(Arc<AtomicUsize>);

impl ConnectionSlot {
    /// 计数未达上限时占用一个名额，否则返回 `None`
    pub fn try_acquire(counter: &Arc<AtomicUsize>, max: usize) -> Option<Self> {
        let current = counter.fetch_add(1, Ordering::SeqCst);
        if current >= max {
            counter.fetch_sub(1, Ordering::SeqCst);
            return None;
        }
        Some(Self(Arc::clone(counter)))
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct AppState {
    session: Arc<Mutex<Session>>,
    events_tx: broadcast::Sender<SessionEvent>,
    frames_tx: Arc<watch::Sender<Option<Bytes>>>,
    sse_connections: Arc<AtomicUsize>,
    video_connections: Arc<AtomicUsize>,
    config: Arc<Config>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
    started_at_utc: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: &Config, shutdown_tx: broadcast::Sender<()>) -> Self {
        let dispatcher = pointer::build_dispatcher(config.pointer_backend);
        Self::with_dispatcher(config, dispatcher, shutdown_tx)
    }

    /// Same as [`AppState::new`] but with an explicit pointer dispatcher.
    pub fn with_dispatcher(
        config: &Config,
        dispatcher: ActionDispatcher,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (frames_tx, _) = watch::channel(None);

        Self {
            session: Arc::new(Mutex::new(Session::new(dispatcher, config.warning))),
            events_tx,
            frames_tx: Arc::new(frames_tx),
            sse_connections: Arc::new(AtomicUsize::new(0)),
            video_connections: Arc::new(AtomicUsize::new(0)),
            config: Arc::new(config.clone()),
            shutdown_tx,
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
        }
    }

    /// Locks the session, recovering from a poisoned lock.
    pub fn session(&self) -> MutexGuard<'_, Session> {
        match self.session.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("Session lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    pub fn publish(&self, event: SessionEvent) {
        // 没有订阅者时 send 返回错误，属于正常情况
        let _ = self.events_tx.send(event);
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    pub fn publish_frame(&self, jpeg: Bytes) {
        self.frames_tx.send_replace(Some(jpeg));
    }

    pub fn subscribe_frames(&self) -> watch::Receiver<Option<Bytes>> {
        self.frames_tx.subscribe()
    }

    pub fn sse_connections(&self) -> &Arc<AtomicUsize> {
        &self.sse_connections
    }

    pub fn video_connections(&self) -> &Arc<AtomicUsize> {
        &self.video_connections
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn shutdown_tx(&self) -> &broadcast::Sender<()> {
        &self.shutdown_tx
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at_utc
    }
}
