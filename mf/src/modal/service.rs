//! ModalService - single-slot request broker between callers and the dialog UI
//!
//! A caller opens the modal and awaits the returned [`ModalRequest`]. The UI
//! observes open/closed transitions through [`ModalService::subscribe`] and
//! ends the session with [`ModalService::close`]. Only one session is ever
//! pending: opening while another session waits rejects the older waiter
//! with [`ModalError::AlreadyOpen`] and hands the slot to the new caller.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use parking_lot::ReentrantMutex;
use tokio::sync::oneshot;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use super::error::{ModalError, ModalResult};
use super::listeners::{Listener, ListenerSet, Subscription, lock};

/// The waiter currently owning the slot
struct PendingSession<T> {
    id: Uuid,
    reply_tx: oneshot::Sender<ModalResult<T>>,
}

/// Single session slot
struct Session<T> {
    pending: Option<PendingSession<T>>,
    is_open: bool,
    /// Bumped on every open/close; a delivery for an older generation is stale
    generation: u64,
}

impl<T> Default for Session<T> {
    fn default() -> Self {
        Self {
            pending: None,
            is_open: false,
            generation: 0,
        }
    }
}

/// Single-instance modal orchestrator, generic over the result payload
///
/// Share it between the caller side and the UI side with an `Arc`.
///
/// Each `open`/`close` flips the state and notifies listeners as one step:
/// callers on other threads wait until the delivery finishes, so listeners
/// always end on the state `is_open()` reports. Listeners run on the
/// calling thread and may call back into the service; a listener must not
/// block on another thread that uses this service.
pub struct ModalService<T> {
    session: Mutex<Session<T>>,
    listeners: Arc<Mutex<ListenerSet>>,
    /// Held across a state flip and its delivery
    delivery: ReentrantMutex<()>,
}

impl<T> Default for ModalService<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ModalService<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalService")
            .field("is_open", &self.is_open())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<T> ModalService<T> {
    /// Create a closed service with no listeners
    pub fn new() -> Self {
        debug!("ModalService::new: called");
        Self {
            session: Mutex::new(Session::default()),
            listeners: Arc::new(Mutex::new(ListenerSet::default())),
            delivery: ReentrantMutex::new(()),
        }
    }

    /// Start a new session and return a future of its outcome
    ///
    /// Listeners are notified with `true` before this returns. If a session
    /// was already pending, its waiter resolves to `Err(ModalError::AlreadyOpen)`.
    pub fn open(&self) -> ModalRequest<T> {
        let session_id = Uuid::now_v7();
        debug!(%session_id, "ModalService::open: called");
        let (reply_tx, reply_rx) = oneshot::channel();

        let _delivery = self.delivery.lock();
        let generation = {
            let mut session = lock(&self.session);
            if let Some(stale) = session.pending.take() {
                warn!(stale_session = %stale.id, %session_id, "ModalService::open: rejecting previous waiter");
                if stale.reply_tx.send(Err(ModalError::AlreadyOpen)).is_err() {
                    debug!(stale_session = %stale.id, "ModalService::open: previous waiter already gone");
                }
            }
            session.pending = Some(PendingSession { id: session_id, reply_tx });
            session.is_open = true;
            session.generation += 1;
            session.generation
        };

        info!(%session_id, "Modal opened");
        self.notify(true, generation);
        ModalRequest {
            session_id,
            rx: reply_rx,
        }
    }

    /// End the current session with `result` (`None` = dismissed)
    ///
    /// Always leaves the service closed and notifies listeners with `false`,
    /// even when no session was pending.
    pub fn close(&self, result: Option<T>) {
        debug!(has_result = result.is_some(), "ModalService::close: called");
        let _delivery = self.delivery.lock();
        let (settled, generation) = {
            let mut session = lock(&self.session);
            session.is_open = false;
            session.generation += 1;
            (session.pending.take(), session.generation)
        };

        match settled {
            Some(pending) => {
                info!(session_id = %pending.id, submitted = result.is_some(), "Modal closed");
                if pending.reply_tx.send(Ok(result)).is_err() {
                    warn!(session_id = %pending.id, "ModalService::close: waiter dropped, result discarded");
                }
            }
            None => {
                debug!("ModalService::close: no pending session");
            }
        }

        self.notify(false, generation);
    }

    /// Whether a session is currently open
    pub fn is_open(&self) -> bool {
        let open = lock(&self.session).is_open;
        trace!(open, "ModalService::is_open");
        open
    }

    /// Register a listener for open/closed transitions
    ///
    /// The listener is not called with the current state at registration time.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.subscribe_shared(Arc::new(listener))
    }

    /// Register an already shared listener
    ///
    /// Subscribing the same `Arc` twice keeps a single registration; either
    /// returned subscription removes it.
    pub fn subscribe_shared(&self, listener: Listener) -> Subscription {
        let id = lock(&self.listeners).insert(listener);
        debug!(id, "ModalService::subscribe: registered listener");
        Subscription::new(id, Arc::downgrade(&self.listeners))
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Deliver `open` to every listener, unless a listener re-entered the
    /// service and a newer state has already been delivered
    fn notify(&self, open: bool, generation: u64) {
        let listeners = lock(&self.listeners).snapshot();
        debug!(open, generation, count = listeners.len(), "ModalService::notify");
        for listener in listeners {
            if lock(&self.session).generation != generation {
                debug!(open, generation, "ModalService::notify: superseded by a nested transition");
                return;
            }
            listener(open);
        }
    }
}

/// Future of one modal session's outcome
///
/// Resolves exactly once: `Ok(Some(_))` on submit, `Ok(None)` on dismissal,
/// `Err(ModalError::AlreadyOpen)` when a later `open()` took the slot.
#[must_use = "dropping a modal request discards the session's result"]
pub struct ModalRequest<T> {
    session_id: Uuid,
    rx: oneshot::Receiver<ModalResult<T>>,
}

impl<T> ModalRequest<T> {
    /// Id of the session this request waits on
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}

impl<T> fmt::Debug for ModalRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalRequest").field("session_id", &self.session_id).finish()
    }
}

impl<T> Future for ModalRequest<T> {
    type Output = ModalResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(ModalError::Abandoned)))
    }
}
