//! Keyed event dispatcher.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use tokio::sync::Mutex;
use tokio_util::task::TaskTracker;
use tracing::{debug, trace, warn};

use grantflow_core::{SessionId, UserInputEvent};

use crate::error::{DispatchError, DispatchResult};
use crate::handler::{EventHandler, HandlerKey, HandlerToken};
use crate::ingress::IngressHandle;
use crate::task::ScheduledTask;

/// Default quiet window for value edits.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Smallest accepted quiet window.
const MIN_DEBOUNCE_WINDOW: Duration = Duration::from_millis(1);

struct RegisteredHandler {
    id: u64,
    handler: Arc<dyn EventHandler>,
}

struct PendingEdit {
    id: u64,
    task: ScheduledTask,
}

struct DispatcherInner {
    /// Handlers per key, in registration order.
    handlers: DashMap<HandlerKey, Vec<RegisteredHandler>>,
    /// One lane per key; holding it means the key's handler chain is running.
    lanes: DashMap<HandlerKey, Arc<Mutex<()>>>,
    /// The pending debounced edit per key.
    pending: DashMap<HandlerKey, PendingEdit>,
    /// Every in-flight dispatch and debounce timer.
    tracker: TaskTracker,
    next_id: AtomicU64,
    ingress_issued: AtomicBool,
    debounce_window: Duration,
}

impl DispatcherInner {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn lane(&self, key: &HandlerKey) -> Arc<Mutex<()>> {
        Arc::clone(
            self.lanes
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    fn snapshot(&self, key: &HandlerKey) -> Vec<Arc<dyn EventHandler>> {
        self.handlers
            .get(key)
            .map(|list| list.iter().map(|h| Arc::clone(&h.handler)).collect())
            .unwrap_or_default()
    }

    /// Drop a key's lane once nothing is registered under it and nobody holds it.
    fn prune_lane(&self, key: &HandlerKey) {
        if !self.handlers.contains_key(key) {
            self.lanes
                .remove_if(key, |_, lane| Arc::strong_count(lane) == 1);
        }
    }

    /// Run every handler registered under `key`, one after another.
    async fn run_handlers(&self, key: &HandlerKey, event: &UserInputEvent) {
        // The lane is created under the handlers entry, so a concurrent
        // deregister cannot slip in between the check and the insert.
        let lane = {
            let Some(_registered) = self.handlers.get(key) else {
                return;
            };
            self.lane(key)
        };
        self.run_chain(&lane, key, event).await;
        drop(lane);

        // A deregister that ran while the chain held the lane could not prune it.
        self.prune_lane(key);
    }

    async fn run_chain(&self, lane: &Mutex<()>, key: &HandlerKey, event: &UserInputEvent) {
        let _running = lane.lock().await;

        // Taken under the lane so handlers removed while we queued never run.
        let handlers = self.snapshot(key);
        if handlers.is_empty() {
            trace!(key = %key, "handlers gone before execution");
            return;
        }

        for (position, handler) in handlers.iter().enumerate() {
            match AssertUnwindSafe(handler.handle(event)).catch_unwind().await {
                Ok(Ok(())) => {},
                Ok(Err(e)) => {
                    warn!(key = %key, position, error = %e, "event handler failed");
                },
                Err(_) => {
                    warn!(key = %key, position, "event handler panicked");
                },
            }
        }
    }
}

/// Registry and executor for confirmation-session event handlers.
///
/// Cloning is cheap and every clone shares the same registry, timers and
/// ingress state. One dispatcher is meant to serve every concurrent session;
/// session IDs keep their handlers apart.
#[derive(Clone)]
pub struct EventDispatcher {
    inner: Arc<DispatcherInner>,
}

impl EventDispatcher {
    /// Create a dispatcher with the default 500ms debounce window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_debounce_window(DEFAULT_DEBOUNCE_WINDOW)
    }

    /// Create a dispatcher with a custom debounce window (at least 1ms).
    #[must_use]
    pub fn with_debounce_window(window: Duration) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                handlers: DashMap::new(),
                lanes: DashMap::new(),
                pending: DashMap::new(),
                tracker: TaskTracker::new(),
                next_id: AtomicU64::new(1),
                ingress_issued: AtomicBool::new(false),
                debounce_window: window.max(MIN_DEBOUNCE_WINDOW),
            }),
        }
    }

    /// The quiet window applied to value edits.
    #[must_use]
    pub fn debounce_window(&self) -> Duration {
        self.inner.debounce_window
    }

    /// Register a handler. Handlers sharing a key run in registration order.
    pub fn register(&self, key: HandlerKey, handler: Arc<dyn EventHandler>) -> HandlerToken {
        let id = self.inner.next_id();
        trace!(key = %key, id, "registering handler");
        self.inner
            .handlers
            .entry(key.clone())
            .or_default()
            .push(RegisteredHandler { id, handler });
        HandlerToken { key, id }
    }

    /// Remove one registration. Unknown or already-removed tokens are ignored.
    pub fn deregister(&self, token: &HandlerToken) {
        let removed = if let Some(mut list) = self.inner.handlers.get_mut(&token.key) {
            let before = list.len();
            list.retain(|h| h.id != token.id);
            before != list.len()
        } else {
            false
        };

        if removed {
            trace!(key = %token.key, id = token.id, "deregistered handler");
            self.inner
                .handlers
                .remove_if(&token.key, |_, list| list.is_empty());
            self.inner.prune_lane(&token.key);
        }
    }

    /// Remove every handler of a session and cancel its pending edits.
    pub fn deregister_session(&self, session_id: &SessionId) {
        self.inner.handlers.retain(|key, _| key.session_id != *session_id);
        self.inner.pending.retain(|key, pending| {
            if key.session_id == *session_id {
                pending.task.cancel();
                false
            } else {
                true
            }
        });
        self.inner
            .lanes
            .retain(|key, lane| key.session_id != *session_id || Arc::strong_count(lane) > 1);
        debug!(session_id = %session_id, "deregistered session handlers");
    }

    /// Number of handlers registered under `key`.
    #[must_use]
    pub fn handler_count(&self, key: &HandlerKey) -> usize {
        self.inner.handlers.get(key).map_or(0, |list| list.len())
    }

    #[cfg(test)]
    pub(crate) fn lane_count(&self) -> usize {
        self.inner.lanes.len()
    }

    /// Number of value edits waiting for their quiet window to elapse.
    #[must_use]
    pub fn pending_debounce_count(&self) -> usize {
        self.inner.pending.len()
    }

    /// Deliver an event raised in `session_id` to the handlers of its key.
    ///
    /// Completes immediately when nothing is registered for the key. Value
    /// edits are scheduled behind the debounce window and this returns as
    /// soon as they are scheduled; everything else returns once the key's
    /// handler chain has run.
    pub async fn dispatch(&self, session_id: &SessionId, event: UserInputEvent) {
        let key = HandlerKey::for_event(session_id, &event);
        if !self.inner.handlers.contains_key(&key) {
            trace!(key = %key, "no handlers for event");
            return;
        }

        if event.kind.is_value_edit() {
            self.schedule_edit(key, event);
            return;
        }

        let inner = Arc::clone(&self.inner);
        self.inner
            .tracker
            .track_future(async move { inner.run_handlers(&key, &event).await })
            .await;
    }

    fn schedule_edit(&self, key: HandlerKey, event: UserInputEvent) {
        let id = self.inner.next_id();
        let weak: Weak<DispatcherInner> = Arc::downgrade(&self.inner);
        let task_key = key.clone();

        let work = async move {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.pending.remove_if(&task_key, |_, pending| pending.id == id);
            inner.run_handlers(&task_key, &event).await;
        };

        // Scheduled under the entry lock so a fast timer cannot remove itself
        // before its entry exists.
        match self.inner.pending.entry(key.clone()) {
            Entry::Occupied(mut slot) => {
                let task =
                    ScheduledTask::schedule(&self.inner.tracker, self.inner.debounce_window, work);
                let superseded = slot.insert(PendingEdit { id, task });
                superseded.task.cancel();
                debug!(key = %key, "superseded pending edit");
            },
            Entry::Vacant(slot) => {
                let task =
                    ScheduledTask::schedule(&self.inner.tracker, self.inner.debounce_window, work);
                slot.insert(PendingEdit { id, task });
                trace!(key = %key, "scheduled edit");
            },
        }
    }

    /// Wait until every in-flight dispatch and pending edit has completed.
    ///
    /// Intended for shutdown and tests.
    pub async fn drain_pending(&self) {
        self.inner.tracker.close();
        self.inner.tracker.wait().await;
        self.inner.tracker.reopen();
    }

    /// Issue the dispatcher's single ingress handle.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::IngressAlreadyIssued`] on every call after
    /// the first.
    pub fn ingress(&self) -> DispatchResult<IngressHandle> {
        if self.inner.ingress_issued.swap(true, Ordering::AcqRel) {
            return Err(DispatchError::IngressAlreadyIssued);
        }
        Ok(IngressHandle::new(self.clone()))
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("keys", &self.inner.handlers.len())
            .field("pending_edits", &self.inner.pending.len())
            .field("debounce_window", &self.inner.debounce_window)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HandlerError, handler_fn};
    use grantflow_core::{EventKind, InputValue};
    use std::sync::Mutex as StdMutex;

    type Log = Arc<StdMutex<Vec<String>>>;

    fn new_log() -> Log {
        Arc::new(StdMutex::new(Vec::new()))
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    fn recording(log: &Log, label: &'static str) -> Arc<dyn EventHandler> {
        let log = Arc::clone(log);
        handler_fn(move |event: UserInputEvent| {
            let log = Arc::clone(&log);
            async move {
                let value = match event.value {
                    Some(InputValue::Text(s)) => s,
                    Some(InputValue::Bool(b)) => b.to_string(),
                    None => String::new(),
                };
                log.lock().unwrap().push(format!("{label}:{value}"));
                Ok(())
            }
        })
    }

    fn slow(log: &Log, label: &'static str, millis: u64) -> Arc<dyn EventHandler> {
        let log = Arc::clone(log);
        handler_fn(move |_event| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(format!("start:{label}"));
                tokio::time::sleep(Duration::from_millis(millis)).await;
                log.lock().unwrap().push(format!("end:{label}"));
                Ok(())
            }
        })
    }

    struct Panicking;

    #[async_trait::async_trait]
    impl EventHandler for Panicking {
        async fn handle(&self, _event: &UserInputEvent) -> crate::handler::HandlerResult {
            panic!("handler bug");
        }
    }

    fn click_key(element: &str, session: &SessionId) -> HandlerKey {
        HandlerKey::new(element, EventKind::ButtonClick, session.clone())
    }

    fn edit_key(element: &str, session: &SessionId) -> HandlerKey {
        HandlerKey::new(element, EventKind::InputChange, session.clone())
    }

    #[tokio::test]
    async fn test_dispatch_without_handlers_completes() {
        let dispatcher = EventDispatcher::new();
        let session = SessionId::new();
        dispatcher
            .dispatch(&session, UserInputEvent::button_click("nothing"))
            .await;
        dispatcher
            .dispatch(&session, UserInputEvent::input_change("nothing", "1"))
            .await;
        assert_eq!(dispatcher.pending_debounce_count(), 0);
    }

    #[tokio::test]
    async fn test_handlers_run_in_registration_order() {
        let dispatcher = EventDispatcher::new();
        let session = SessionId::new();
        let log = new_log();

        dispatcher.register(click_key("grant", &session), recording(&log, "first"));
        dispatcher.register(click_key("grant", &session), recording(&log, "second"));
        dispatcher.register(click_key("grant", &session), recording(&log, "third"));

        dispatcher
            .dispatch(&session, UserInputEvent::button_click("grant"))
            .await;

        assert_eq!(entries(&log), vec!["first:", "second:", "third:"]);
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_stop_siblings() {
        let dispatcher = EventDispatcher::new();
        let session = SessionId::new();
        let log = new_log();

        dispatcher.register(
            click_key("grant", &session),
            handler_fn(|_| async { Err(HandlerError::msg("boom")) }),
        );
        dispatcher.register(click_key("grant", &session), recording(&log, "after-error"));
        dispatcher.register(click_key("grant", &session), Arc::new(Panicking));
        dispatcher.register(click_key("grant", &session), recording(&log, "after-panic"));

        dispatcher
            .dispatch(&session, UserInputEvent::button_click("grant"))
            .await;

        assert_eq!(entries(&log), vec!["after-error:", "after-panic:"]);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let dispatcher = EventDispatcher::new();
        let session_a = SessionId::new();
        let session_b = SessionId::new();
        let log = new_log();

        dispatcher.register(click_key("grant", &session_a), recording(&log, "a"));

        dispatcher
            .dispatch(&session_b, UserInputEvent::button_click("grant"))
            .await;
        assert!(entries(&log).is_empty());

        dispatcher
            .dispatch(&session_a, UserInputEvent::button_click("grant"))
            .await;
        assert_eq!(entries(&log), vec!["a:"]);
    }

    #[tokio::test]
    async fn test_event_kind_is_part_of_key() {
        let dispatcher = EventDispatcher::new();
        let session = SessionId::new();
        let log = new_log();

        dispatcher.register(click_key("amount", &session), recording(&log, "click"));
        dispatcher
            .dispatch(&session, UserInputEvent::form_submit("amount"))
            .await;
        assert!(entries(&log).is_empty());
    }

    #[tokio::test]
    async fn test_deregister_is_idempotent() {
        let dispatcher = EventDispatcher::new();
        let session = SessionId::new();
        let log = new_log();

        let key = click_key("grant", &session);
        let token = dispatcher.register(key.clone(), recording(&log, "gone"));
        dispatcher.register(key.clone(), recording(&log, "kept"));

        dispatcher.deregister(&token);
        dispatcher.deregister(&token);
        assert_eq!(dispatcher.handler_count(&key), 1);

        dispatcher
            .dispatch(&session, UserInputEvent::button_click("grant"))
            .await;
        assert_eq!(entries(&log), vec!["kept:"]);
    }

    #[tokio::test]
    async fn test_lane_released_when_handler_deregisters_itself() {
        let dispatcher = EventDispatcher::new();
        let session = SessionId::new();
        let log = new_log();
        let key = click_key("grant", &session);
        let slot: Arc<std::sync::OnceLock<HandlerToken>> = Arc::new(std::sync::OnceLock::new());

        let handler = {
            let dispatcher = dispatcher.clone();
            let slot = Arc::clone(&slot);
            let log = Arc::clone(&log);
            handler_fn(move |_event| {
                let dispatcher = dispatcher.clone();
                let slot = Arc::clone(&slot);
                let log = Arc::clone(&log);
                async move {
                    if let Some(token) = slot.get() {
                        dispatcher.deregister(token);
                    }
                    log.lock().unwrap().push("once".to_owned());
                    Ok(())
                }
            })
        };
        slot.set(dispatcher.register(key.clone(), handler)).unwrap();

        dispatcher
            .dispatch(&session, UserInputEvent::button_click("grant"))
            .await;
        dispatcher
            .dispatch(&session, UserInputEvent::button_click("grant"))
            .await;

        assert_eq!(entries(&log), vec!["once"]);
        assert_eq!(dispatcher.handler_count(&key), 0);
        assert_eq!(dispatcher.lane_count(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_to_unregistered_key_creates_no_lane() {
        let dispatcher = EventDispatcher::new();
        let session = SessionId::new();
        let log = new_log();

        let token = dispatcher.register(click_key("grant", &session), recording(&log, "grant"));
        dispatcher.deregister(&token);
        dispatcher
            .dispatch(&session, UserInputEvent::button_click("grant"))
            .await;

        assert!(entries(&log).is_empty());
        assert_eq!(dispatcher.lane_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_edits_runs_once_with_last_value() {
        let dispatcher = EventDispatcher::new();
        let session = SessionId::new();
        let log = new_log();

        dispatcher.register(edit_key("amount", &session), recording(&log, "amount"));

        for value in ["1", "12", "123", "1234", "12345"] {
            dispatcher
                .dispatch(&session, UserInputEvent::input_change("amount", value))
                .await;
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(entries(&log).is_empty());
        assert_eq!(dispatcher.pending_debounce_count(), 1);

        dispatcher.drain_pending().await;
        assert_eq!(entries(&log), vec!["amount:12345"]);
        assert_eq!(dispatcher.pending_debounce_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_outside_window_each_run() {
        let dispatcher = EventDispatcher::with_debounce_window(Duration::from_millis(200));
        let session = SessionId::new();
        let log = new_log();

        dispatcher.register(edit_key("amount", &session), recording(&log, "amount"));

        dispatcher
            .dispatch(&session, UserInputEvent::input_change("amount", "1"))
            .await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        dispatcher
            .dispatch(&session, UserInputEvent::input_change("amount", "2"))
            .await;
        dispatcher.drain_pending().await;

        assert_eq!(entries(&log), vec!["amount:1", "amount:2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_on_different_keys_debounce_independently() {
        let dispatcher = EventDispatcher::new();
        let session = SessionId::new();
        let log = new_log();

        dispatcher.register(edit_key("amount", &session), recording(&log, "amount"));
        dispatcher.register(
            HandlerKey::new("recurring", EventKind::CheckboxChange, session.clone()),
            recording(&log, "recurring"),
        );

        dispatcher
            .dispatch(&session, UserInputEvent::input_change("amount", "5"))
            .await;
        dispatcher
            .dispatch(&session, UserInputEvent::checkbox_change("recurring", true))
            .await;
        assert_eq!(dispatcher.pending_debounce_count(), 2);

        dispatcher.drain_pending().await;
        let mut seen = entries(&log);
        seen.sort();
        assert_eq!(seen, vec!["amount:5", "recurring:true"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_button_clicks_bypass_debounce() {
        let dispatcher = EventDispatcher::new();
        let session = SessionId::new();
        let log = new_log();

        dispatcher.register(click_key("grant", &session), recording(&log, "grant"));
        dispatcher
            .dispatch(&session, UserInputEvent::button_click("grant"))
            .await;
        dispatcher
            .dispatch(&session, UserInputEvent::button_click("grant"))
            .await;

        assert_eq!(entries(&log), vec!["grant:", "grant:"]);
        assert_eq!(dispatcher.pending_debounce_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_key_dispatches_never_overlap() {
        let dispatcher = EventDispatcher::new();
        let session = SessionId::new();
        let log = new_log();

        dispatcher.register(click_key("grant", &session), slow(&log, "h1", 100));
        dispatcher.register(click_key("grant", &session), slow(&log, "h2", 50));

        let d1 = dispatcher.clone();
        let s1 = session.clone();
        let first = tokio::spawn(async move {
            d1.dispatch(&s1, UserInputEvent::button_click("grant")).await;
        });
        let d2 = dispatcher.clone();
        let s2 = session.clone();
        let second = tokio::spawn(async move {
            d2.dispatch(&s2, UserInputEvent::button_click("grant")).await;
        });
        first.await.unwrap();
        second.await.unwrap();

        let log = entries(&log);
        assert_eq!(log.len(), 8);
        // Every start is immediately followed by its own end.
        for pair in log.chunks(2) {
            assert_eq!(pair[0].replace("start:", ""), pair[1].replace("end:", ""));
        }
        // Each chain runs h1 then h2 before the next chain begins.
        assert_eq!(&log[0..4], ["start:h1", "end:h1", "start:h2", "end:h2"]);
        assert_eq!(&log[4..8], ["start:h1", "end:h1", "start:h2", "end:h2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_keys_dispatch_concurrently() {
        let dispatcher = EventDispatcher::new();
        let session = SessionId::new();
        let log = new_log();

        dispatcher.register(click_key("slow", &session), slow(&log, "slow", 1_000));
        dispatcher.register(click_key("fast", &session), recording(&log, "fast"));

        let d = dispatcher.clone();
        let s = session.clone();
        let slow_dispatch = tokio::spawn(async move {
            d.dispatch(&s, UserInputEvent::button_click("slow")).await;
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        dispatcher
            .dispatch(&session, UserInputEvent::button_click("fast"))
            .await;
        assert_eq!(entries(&log), vec!["start:slow", "fast:"]);

        slow_dispatch.await.unwrap();
        assert_eq!(entries(&log), vec!["start:slow", "fast:", "end:slow"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deregister_session_cancels_pending_edits() {
        let dispatcher = EventDispatcher::new();
        let session = SessionId::new();
        let other = SessionId::new();
        let log = new_log();

        dispatcher.register(edit_key("amount", &session), recording(&log, "mine"));
        dispatcher.register(edit_key("amount", &other), recording(&log, "other"));

        dispatcher
            .dispatch(&session, UserInputEvent::input_change("amount", "1"))
            .await;
        dispatcher
            .dispatch(&other, UserInputEvent::input_change("amount", "2"))
            .await;

        dispatcher.deregister_session(&session);
        assert_eq!(dispatcher.handler_count(&edit_key("amount", &session)), 0);
        assert_eq!(dispatcher.pending_debounce_count(), 1);

        dispatcher.drain_pending().await;
        assert_eq!(entries(&log), vec!["other:2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_edit_skipped_after_deregister() {
        let dispatcher = EventDispatcher::new();
        let session = SessionId::new();
        let log = new_log();

        let token = dispatcher.register(edit_key("amount", &session), recording(&log, "amount"));
        dispatcher
            .dispatch(&session, UserInputEvent::input_change("amount", "9"))
            .await;
        dispatcher.deregister(&token);

        dispatcher.drain_pending().await;
        assert!(entries(&log).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_waits_for_in_flight_dispatch() {
        let dispatcher = EventDispatcher::new();
        let session = SessionId::new();
        let log = new_log();

        dispatcher.register(click_key("grant", &session), slow(&log, "grant", 250));

        let d = dispatcher.clone();
        let s = session.clone();
        let handle = tokio::spawn(async move {
            d.dispatch(&s, UserInputEvent::button_click("grant")).await;
        });
        tokio::time::sleep(Duration::from_millis(1)).await;

        dispatcher.drain_pending().await;
        assert_eq!(entries(&log), vec!["start:grant", "end:grant"]);
        handle.await.unwrap();
    }

    #[test]
    fn test_ingress_issued_once() {
        let dispatcher = EventDispatcher::new();
        assert!(dispatcher.ingress().is_ok());
        assert!(matches!(
            dispatcher.ingress(),
            Err(DispatchError::IngressAlreadyIssued)
        ));
        // Clones share the issuance state.
        assert!(dispatcher.clone().ingress().is_err());
        // A separate dispatcher has its own.
        assert!(EventDispatcher::new().ingress().is_ok());
    }

    #[test]
    fn test_debounce_window_floor() {
        let dispatcher = EventDispatcher::with_debounce_window(Duration::ZERO);
        assert_eq!(dispatcher.debounce_window(), MIN_DEBOUNCE_WINDOW);
        assert_eq!(EventDispatcher::new().debounce_window(), DEFAULT_DEBOUNCE_WINDOW);
    }
}
