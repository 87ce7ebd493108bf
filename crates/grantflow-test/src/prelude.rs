//! Prelude module - commonly used test utilities.
//!
//! Use `use grantflow_test::prelude::*;` to import all essential types.

pub use crate::{
    MockAccountProvider, MockHost, RecordingSigner, TokenStreamHandler, TokenStreamProbe,
    init_test_logging, token_stream_request,
};
