//! Grantflow Events - Event dispatch for confirmation sessions.
//!
//! This crate provides:
//! - [`ScheduledTask`], a cancellable delayed unit of work
//! - [`EventDispatcher`], a registry of handlers keyed by
//!   (element, event kind, session) that executes them when the host
//!   reports input
//! - [`IngressHandle`], the single entry point adapting host notifications
//!   into dispatches
//!
//! # Execution model
//!
//! - Handlers sharing a key run strictly one after another, in registration
//!   order. Different keys dispatch concurrently.
//! - Value edits (text input, checkbox toggles) are debounced: a new edit on
//!   the same key cancels the pending one and restarts the quiet window, so
//!   only the last value of a burst is ever handled.
//! - A handler that fails or panics is logged and skipped; it never fails
//!   the dispatch or stops its siblings.
//!
//! # Example
//!
//! ```rust
//! use grantflow_core::{EventKind, SessionId, UserInputEvent};
//! use grantflow_events::{EventDispatcher, HandlerKey, handler_fn};
//!
//! # async fn example() {
//! let dispatcher = EventDispatcher::new();
//! let session = SessionId::new();
//!
//! let token = dispatcher.register(
//!     HandlerKey::new("grant-button", EventKind::ButtonClick, session.clone()),
//!     handler_fn(|event| async move {
//!         tracing::info!(element = %event.element_id, "pressed");
//!         Ok(())
//!     }),
//! );
//!
//! dispatcher
//!     .dispatch(&session, UserInputEvent::button_click("grant-button"))
//!     .await;
//! dispatcher.deregister(&token);
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod dispatcher;
mod error;
mod handler;
mod ingress;
mod task;

pub use dispatcher::{DEFAULT_DEBOUNCE_WINDOW, EventDispatcher};
pub use error::{DispatchError, DispatchResult};
pub use handler::{
    EventHandler, FnHandler, HandlerError, HandlerKey, HandlerResult, HandlerToken, handler_fn,
};
pub use ingress::IngressHandle;
pub use task::ScheduledTask;
