//! Prelude module - commonly used types for convenient import.
//!
//! Use `use grantflow_events::prelude::*;` to import all essential types.

// Dispatcher
pub use crate::{DEFAULT_DEBOUNCE_WINDOW, EventDispatcher, IngressHandle};

// Handlers
pub use crate::{EventHandler, HandlerError, HandlerKey, HandlerResult, HandlerToken, handler_fn};

// Errors
pub use crate::{DispatchError, DispatchResult};
