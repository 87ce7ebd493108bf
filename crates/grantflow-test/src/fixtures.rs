//! Test fixtures for common types.

use grantflow_core::{
    ChainId, PermissionPayload, PermissionRequest, RawPermissionRequest, Rule, SignerIdentity,
    SessionId,
};

use crate::token_stream::TOKEN_STREAM;

/// Chain used by fixture requests.
pub const TEST_CHAIN: ChainId = ChainId(11_155_111);
/// Grantee address used by fixture requests.
pub const TEST_GRANTEE: &str = "0x00000000000000000000000000000000000000bb";
/// Envelope expiry of fixture requests.
pub const TEST_EXPIRY: u64 = 2_000_000_000;
/// Justification attached to fixture requests.
pub const TEST_JUSTIFICATION: &str = "Pay for the streaming subscription";

/// Install a test-writer tracing subscriber. Safe to call from every test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Create a test session ID.
#[must_use]
pub fn test_session_id() -> SessionId {
    SessionId::new()
}

/// A token stream request of 10 tokens per second, 100 up front, capped at
/// 10 000.
#[must_use]
pub fn token_stream_request(adjustable: bool) -> RawPermissionRequest {
    token_stream_request_with(
        serde_json::json!({
            "amountPerSecond": 10,
            "initialAmount": 100,
            "maxAmount": 10_000,
            "startTime": 1_800_000_000u64,
        }),
        adjustable,
    )
}

/// A token stream request carrying arbitrary permission data.
#[must_use]
pub fn token_stream_request_with(data: serde_json::Value, adjustable: bool) -> RawPermissionRequest {
    PermissionRequest {
        chain_id: TEST_CHAIN,
        signer: SignerIdentity::account(TEST_GRANTEE),
        expiry: TEST_EXPIRY,
        permission: PermissionPayload {
            permission_type: TOKEN_STREAM.to_string(),
            data,
            justification: Some(TEST_JUSTIFICATION.to_string()),
        },
        rules: Vec::new(),
        is_adjustment_allowed: adjustable,
    }
}

/// A token stream request whose justification needs the expand toggle.
#[must_use]
pub fn long_justification_request() -> RawPermissionRequest {
    let mut request = token_stream_request(true);
    request.permission.justification = Some("Streaming access to the analytics feed. ".repeat(8));
    request
}

/// A token stream request with an expiry rule earlier than the envelope.
#[must_use]
pub fn token_stream_request_expiring(rule_expiry: u64) -> RawPermissionRequest {
    let mut request = token_stream_request(false);
    request.rules.push(Rule::expiry(rule_expiry));
    request
}
