//! The host's entry point into the dispatcher.

use tokio::sync::mpsc;
use tracing::{debug, trace};

use grantflow_core::HostNotification;

use crate::dispatcher::EventDispatcher;

/// Delivers host notifications to an [`EventDispatcher`].
///
/// Exactly one exists per dispatcher; see [`EventDispatcher::ingress`].
/// Notifications are processed one at a time in arrival order.
#[derive(Debug)]
pub struct IngressHandle {
    dispatcher: EventDispatcher,
}

impl IngressHandle {
    pub(crate) fn new(dispatcher: EventDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Deliver one notification.
    pub async fn notify(&self, notification: HostNotification) {
        trace!(
            session_id = %notification.session_id,
            element_id = %notification.event.element_id,
            kind = %notification.event.kind,
            "host notification"
        );
        self.dispatcher
            .dispatch(&notification.session_id, notification.event)
            .await;
    }

    /// Deliver notifications from `rx` until every sender is dropped.
    pub async fn run(self, mut rx: mpsc::Receiver<HostNotification>) {
        debug!("ingress loop started");
        while let Some(notification) = rx.recv().await {
            self.notify(notification).await;
        }
        debug!("ingress loop stopped");
    }
}
