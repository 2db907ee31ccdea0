use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::{extract::State, Router};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;

use gesture_core::SessionEvent;

use crate::response::AppError;
use crate::state::{AppState, ConnectionSlot};

pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(sse_handler))
}

fn to_event(event: &SessionEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Event::default().event(event.name()).data(json)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize session event");
            None
        }
    }
}

pub async fn sse_handler(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let max_sse = state.config().max_sse_connections;
    let Some(slot) = ConnectionSlot::try_acquire(state.sse_connections(), max_sse) else {
        return Err(AppError::too_many_requests("Too many SSE connections"));
    };

    // 先订阅再读模式，避免两者之间的事件丢失；连接即推送当前模式（包括 idle）
    let mut events_rx = state.subscribe_events();
    let mut shutdown_rx = state.shutdown_rx();
    let initial = SessionEvent::ModeUpdate {
        mode: state.session().mode(),
    };

    let stream = async_stream::stream! {
        let _slot = slot;

        if let Some(event) = to_event(&initial) {
            yield Ok(event);
        }

        loop {
            tokio::select! {
                received = events_rx.recv() => {
                    match received {
                        Ok(event) => {
                            if let Some(event) = to_event(&event) {
                                yield Ok(event);
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "SSE client lagged, events dropped");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
                _ = shutdown_rx.recv() => {
                    break;
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    ))
}
