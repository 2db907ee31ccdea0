use gesture_core::{ActionDispatcher, LogSink, NoopSink, PointerSink};

use crate::config::PointerBackend;

/// Picks the pointer sink named by `POINTER_BACKEND`. Falls back to logging
/// when the OS backend is not compiled in or cannot be opened.
pub fn build_sink(backend: PointerBackend) -> Box<dyn PointerSink> {
    match backend {
        PointerBackend::Noop => Box::new(NoopSink),
        PointerBackend::Log => Box::new(LogSink),
        PointerBackend::Os => os_sink(),
    }
}

pub fn build_dispatcher(backend: PointerBackend) -> ActionDispatcher {
    tracing::info!(backend = %backend, "Pointer backend selected");
    ActionDispatcher::new(build_sink(backend))
}

#[cfg(feature = "os-input")]
fn os_sink() -> Box<dyn PointerSink> {
    match os::EnigoSink::spawn() {
        Ok(sink) => Box::new(sink),
        Err(e) => {
            tracing::warn!(error = %e, "OS pointer backend unavailable, falling back to log");
            Box::new(LogSink)
        }
    }
}

#[cfg(not(feature = "os-input"))]
fn os_sink() -> Box<dyn PointerSink> {
    tracing::warn!("Built without the os-input feature, falling back to log pointer backend");
    Box::new(LogSink)
}

#[cfg(feature = "os-input")]
mod os {
    use std::sync::mpsc;
    use std::thread;

    use enigo::{Axis, Button, Coordinate, Direction, Enigo, Mouse, Settings};
    use gesture_core::{DispatchError, MouseButton, PointerAction, PointerSink};

    /// Enigo lives on its own thread; some platforms do not allow moving it
    /// between threads.
    pub struct EnigoSink {
        tx: mpsc::Sender<PointerAction>,
    }

    impl EnigoSink {
        pub fn spawn() -> Result<Self, DispatchError> {
            let (tx, rx) = mpsc::channel::<PointerAction>();
            let (ready_tx, ready_rx) = mpsc::channel::<Result<(), DispatchError>>();

            thread::Builder::new()
                .name("pointer-injector".into())
                .spawn(move || {
                    let mut enigo = match Enigo::new(&Settings::default()) {
                        Ok(enigo) => {
                            let _ = ready_tx.send(Ok(()));
                            enigo
                        }
                        Err(e) => {
                            let _ = ready_tx.send(Err(DispatchError::Unavailable(format!("{e:?}"))));
                            return;
                        }
                    };
                    while let Ok(action) = rx.recv() {
                        if let Err(e) = inject(&mut enigo, action) {
                            tracing::warn!(error = %e, ?action, "Pointer injection failed");
                        }
                    }
                })
                .map_err(|e| DispatchError::Unavailable(e.to_string()))?;

            ready_rx
                .recv()
                .map_err(|e| DispatchError::Unavailable(e.to_string()))??;
            Ok(Self { tx })
        }
    }

    fn inject(enigo: &mut Enigo, action: PointerAction) -> Result<(), DispatchError> {
        let result = match action {
            PointerAction::MoveBy { dx, dy } => enigo.move_mouse(dx, dy, Coordinate::Rel),
            // enigo 的正值向下滚动
            PointerAction::Scroll { amount } => enigo.scroll(-amount, Axis::Vertical),
            PointerAction::Click { button } => {
                let button = match button {
                    MouseButton::Left => Button::Left,
                    MouseButton::Right => Button::Right,
                };
                enigo.button(button, Direction::Click)
            }
        };
        result.map_err(|e| DispatchError::Injection(format!("{e:?}")))
    }

    impl PointerSink for EnigoSink {
        fn perform(&mut self, action: PointerAction) -> Result<(), DispatchError> {
            self.tx
                .send(action)
                .map_err(|_| DispatchError::Unavailable("pointer thread exited".into()))
        }
    }
}
