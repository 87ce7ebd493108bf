//! Reference "token-stream" permission type.
//!
//! Fixture business rules for exercising the confirmation flow: a stream of
//! `amountPerSecond` tokens with an optional up-front `initialAmount`, capped
//! at an optional `maxAmount`. The three amounts are editable text fields.
//! A [`TokenStreamProbe`] shared with the test observes every collaborator
//! call and can hold back context resolution.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Semaphore;

use grantflow_approval::{
    ApprovalError, ApprovalResult, PermissionHandler, Restriction, RestrictionBuilder,
};
use grantflow_core::{
    ElementId, EventKind, InputValue, PermissionRequest, RawPermissionRequest, UiElement,
};

/// Permission type tag.
pub const TOKEN_STREAM: &str = "token-stream";
/// Amount-per-second field.
pub const AMOUNT_PER_SECOND: &str = "amount-per-second";
/// Initial amount field.
pub const INITIAL_AMOUNT: &str = "initial-amount";
/// Maximum amount field.
pub const MAX_AMOUNT: &str = "max-amount";

/// Start time used when the request leaves it unset.
pub const DEFAULT_START_TIME: u64 = 1_700_000_000;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Token stream permission data as requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStreamPermission {
    /// Tokens per second.
    pub amount_per_second: u64,
    /// Tokens released up front.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_amount: Option<u64>,
    /// Total cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<u64>,
    /// Unix timestamp the stream starts at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u64>,
}

/// Token stream permission data with every optional field defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedTokenStream {
    /// Tokens per second.
    pub amount_per_second: u64,
    /// Tokens released up front.
    pub initial_amount: u64,
    /// Total cap.
    pub max_amount: u64,
    /// Unix timestamp the stream starts at.
    pub start_time: u64,
}

impl From<TokenStreamPermission> for PopulatedTokenStream {
    fn from(permission: TokenStreamPermission) -> Self {
        Self {
            amount_per_second: permission.amount_per_second,
            initial_amount: permission.initial_amount.unwrap_or(0),
            max_amount: permission.max_amount.unwrap_or(u64::MAX),
            start_time: permission.start_time.unwrap_or(DEFAULT_START_TIME),
        }
    }
}

/// Display projection of a token stream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStreamContext {
    /// Amount-per-second field text.
    pub amount_per_second: String,
    /// Initial amount field text (empty when unset).
    pub initial_amount: String,
    /// Maximum amount field text (empty when unset).
    pub max_amount: String,
    /// Start time carried through unchanged.
    pub start_time: Option<u64>,
    /// Grantor balance at resolution time.
    pub balance: u64,
    /// Whether fields accept edits.
    pub editable: bool,
}

/// Field-level validation output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStreamMetadata {
    /// Error message per field ID.
    pub errors: BTreeMap<String, String>,
}

/// Observation and control shared between a test and its handler.
#[derive(Debug)]
pub struct TokenStreamProbe {
    gate: Option<Semaphore>,
    contexts_built: AtomicUsize,
    finalized: AtomicUsize,
    validated_amounts: Mutex<Vec<String>>,
    log: Mutex<Vec<String>>,
}

impl TokenStreamProbe {
    fn shared(gate: Option<Semaphore>) -> Arc<Self> {
        Arc::new(Self {
            gate,
            contexts_built: AtomicUsize::new(0),
            finalized: AtomicUsize::new(0),
            validated_amounts: Mutex::new(Vec::new()),
            log: Mutex::new(Vec::new()),
        })
    }

    /// Let a held-back context resolution proceed.
    pub fn release_context(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    /// Number of contexts built.
    #[must_use]
    pub fn contexts_built(&self) -> usize {
        self.contexts_built.load(Ordering::SeqCst)
    }

    /// Number of permissions finalized.
    #[must_use]
    pub fn finalized(&self) -> usize {
        self.finalized.load(Ordering::SeqCst)
    }

    /// The amount-per-second text of every context metadata was derived for.
    #[must_use]
    pub fn validated_amounts(&self) -> Vec<String> {
        lock(&self.validated_amounts).clone()
    }

    /// `begin:<field values>` / `end:<field values>` entries, one pair per
    /// metadata derivation.
    #[must_use]
    pub fn log(&self) -> Vec<String> {
        lock(&self.log).clone()
    }

    fn record(&self, entry: String) {
        lock(&self.log).push(entry);
    }
}

/// The token stream [`PermissionHandler`].
#[derive(Debug)]
pub struct TokenStreamHandler {
    probe: Arc<TokenStreamProbe>,
    balance: u64,
    metadata_delay: Option<Duration>,
}

impl TokenStreamHandler {
    /// Create a handler that resolves contexts immediately.
    #[must_use]
    pub fn new() -> Self {
        Self {
            probe: TokenStreamProbe::shared(None),
            balance: 1_000_000,
            metadata_delay: None,
        }
    }

    /// Hold every context resolution until
    /// [`TokenStreamProbe::release_context`] is called.
    #[must_use]
    pub fn with_context_gate(mut self) -> Self {
        self.probe = TokenStreamProbe::shared(Some(Semaphore::new(0)));
        self
    }

    /// Make every metadata derivation take `delay`.
    #[must_use]
    pub fn with_metadata_delay(mut self, delay: Duration) -> Self {
        self.metadata_delay = Some(delay);
        self
    }

    /// Grantor balance reported in contexts.
    #[must_use]
    pub fn with_balance(mut self, balance: u64) -> Self {
        self.balance = balance;
        self
    }

    /// The probe observing this handler.
    #[must_use]
    pub fn probe(&self) -> Arc<TokenStreamProbe> {
        Arc::clone(&self.probe)
    }

    fn amount_field(
        context: &TokenStreamContext,
        metadata: &TokenStreamMetadata,
        id: &str,
        label: &str,
        value: &str,
    ) -> UiElement {
        UiElement::field(id, label, value)
            .with_error(metadata.errors.get(id).cloned())
            .read_only(!context.editable)
    }
}

impl Default for TokenStreamHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_optional(text: &str) -> Result<Option<u64>, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse()
        .map(Some)
        .map_err(|_| format!("'{text}' is not a whole number"))
}

fn optional_text(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn context_permission(context: &TokenStreamContext) -> ApprovalResult<TokenStreamPermission> {
    let amount_per_second = context
        .amount_per_second
        .trim()
        .parse()
        .map_err(|_| ApprovalError::Validation("amount per second is not a number".to_string()))?;
    Ok(TokenStreamPermission {
        amount_per_second,
        initial_amount: parse_optional(&context.initial_amount).map_err(ApprovalError::Validation)?,
        max_amount: parse_optional(&context.max_amount).map_err(ApprovalError::Validation)?,
        start_time: context.start_time,
    })
}

#[async_trait]
impl PermissionHandler for TokenStreamHandler {
    type Permission = TokenStreamPermission;
    type Populated = PopulatedTokenStream;
    type Context = TokenStreamContext;
    type Metadata = TokenStreamMetadata;

    fn permission_type(&self) -> &str {
        TOKEN_STREAM
    }

    fn validate(
        &self,
        request: &RawPermissionRequest,
    ) -> ApprovalResult<PermissionRequest<TokenStreamPermission>> {
        let validated = request.clone().try_map_data(|data| {
            serde_json::from_value::<TokenStreamPermission>(data)
                .map_err(|e| ApprovalError::Validation(e.to_string()))
        })?;

        let permission = &validated.permission.data;
        if permission.amount_per_second == 0 {
            return Err(ApprovalError::Validation(
                "amountPerSecond must be positive".to_string(),
            ));
        }
        if let (Some(initial), Some(max)) = (permission.initial_amount, permission.max_amount) {
            if initial > max {
                return Err(ApprovalError::Validation(
                    "initialAmount exceeds maxAmount".to_string(),
                ));
            }
        }
        Ok(validated)
    }

    async fn build_context(
        &self,
        request: &PermissionRequest<TokenStreamPermission>,
    ) -> ApprovalResult<TokenStreamContext> {
        if let Some(gate) = &self.probe.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| ApprovalError::Collaborator(e.to_string()))?;
            permit.forget();
        }
        self.probe.contexts_built.fetch_add(1, Ordering::SeqCst);

        let permission = &request.permission.data;
        Ok(TokenStreamContext {
            amount_per_second: permission.amount_per_second.to_string(),
            initial_amount: optional_text(permission.initial_amount),
            max_amount: optional_text(permission.max_amount),
            start_time: permission.start_time,
            balance: self.balance,
            editable: request.is_adjustment_allowed,
        })
    }

    async fn derive_metadata(
        &self,
        context: &TokenStreamContext,
    ) -> ApprovalResult<TokenStreamMetadata> {
        let label = format!(
            "{}/{}/{}",
            context.amount_per_second, context.initial_amount, context.max_amount
        );
        self.probe.record(format!("begin:{label}"));
        lock(&self.probe.validated_amounts).push(context.amount_per_second.clone());
        if let Some(delay) = self.metadata_delay {
            tokio::time::sleep(delay).await;
        }

        let mut errors = BTreeMap::new();
        match context.amount_per_second.trim().parse::<u64>() {
            Ok(0) => {
                errors.insert(AMOUNT_PER_SECOND.to_string(), "Must be positive".to_string());
            },
            Ok(_) => {},
            Err(_) => {
                errors.insert(AMOUNT_PER_SECOND.to_string(), "Enter a whole number".to_string());
            },
        }
        let initial = parse_optional(&context.initial_amount);
        let max = parse_optional(&context.max_amount);
        if let Err(e) = &initial {
            errors.insert(INITIAL_AMOUNT.to_string(), e.clone());
        }
        if let Err(e) = &max {
            errors.insert(MAX_AMOUNT.to_string(), e.clone());
        }
        if let (Ok(Some(initial)), Ok(Some(max))) = (&initial, &max) {
            if initial > max {
                errors.insert(
                    INITIAL_AMOUNT.to_string(),
                    "Cannot exceed the maximum amount".to_string(),
                );
            }
        }
        if let Ok(Some(initial)) = initial {
            if initial > context.balance {
                errors.insert(INITIAL_AMOUNT.to_string(), "Insufficient balance".to_string());
            }
        }

        self.probe.record(format!("end:{label}"));
        Ok(TokenStreamMetadata { errors })
    }

    fn render_content(
        &self,
        context: &TokenStreamContext,
        metadata: &TokenStreamMetadata,
    ) -> UiElement {
        UiElement::container(vec![
            UiElement::section(
                "Stream",
                vec![
                    Self::amount_field(
                        context,
                        metadata,
                        AMOUNT_PER_SECOND,
                        "Amount per second",
                        &context.amount_per_second,
                    ),
                    Self::amount_field(
                        context,
                        metadata,
                        INITIAL_AMOUNT,
                        "Initial amount",
                        &context.initial_amount,
                    ),
                    Self::amount_field(
                        context,
                        metadata,
                        MAX_AMOUNT,
                        "Maximum amount",
                        &context.max_amount,
                    ),
                ],
            ),
            UiElement::text(format!("Balance: {}", context.balance)),
        ])
    }

    fn render_skeleton(&self) -> UiElement {
        UiElement::container(vec![UiElement::section(
            "Stream",
            vec![UiElement::Skeleton, UiElement::Skeleton, UiElement::Skeleton],
        )])
    }

    fn editable_fields(
        &self,
        _request: &PermissionRequest<TokenStreamPermission>,
    ) -> Vec<(ElementId, EventKind)> {
        [AMOUNT_PER_SECOND, INITIAL_AMOUNT, MAX_AMOUNT]
            .into_iter()
            .map(|id| (ElementId::from(id), EventKind::InputChange))
            .collect()
    }

    fn apply_edit(
        &self,
        context: &TokenStreamContext,
        element_id: &ElementId,
        value: &InputValue,
    ) -> ApprovalResult<TokenStreamContext> {
        let text = value
            .as_text()
            .ok_or_else(|| ApprovalError::Validation(format!("{element_id} expects text")))?
            .to_string();

        let mut next = context.clone();
        match element_id.as_str() {
            AMOUNT_PER_SECOND => next.amount_per_second = text,
            INITIAL_AMOUNT => next.initial_amount = text,
            MAX_AMOUNT => next.max_amount = text,
            other => {
                return Err(ApprovalError::Collaborator(format!(
                    "token stream has no field '{other}'"
                )));
            },
        }
        Ok(next)
    }

    async fn resolve_request(
        &self,
        context: &TokenStreamContext,
        original: &PermissionRequest<TokenStreamPermission>,
    ) -> ApprovalResult<PermissionRequest<TokenStreamPermission>> {
        Ok(original.clone().with_data(context_permission(context)?))
    }

    async fn finalize(
        &self,
        permission: TokenStreamPermission,
    ) -> ApprovalResult<PopulatedTokenStream> {
        self.probe.finalized.fetch_add(1, Ordering::SeqCst);
        Ok(permission.into())
    }

    async fn append_restrictions(
        &self,
        populated: &PopulatedTokenStream,
        builder: RestrictionBuilder,
    ) -> ApprovalResult<RestrictionBuilder> {
        let mut terms = Vec::with_capacity(32);
        terms.extend_from_slice(&populated.initial_amount.to_be_bytes());
        terms.extend_from_slice(&populated.max_amount.to_be_bytes());
        terms.extend_from_slice(&populated.amount_per_second.to_be_bytes());
        terms.extend_from_slice(&populated.start_time.to_be_bytes());
        builder.with(Restriction::new("stream", terms))
    }

    fn grant_disabled(&self, metadata: &TokenStreamMetadata) -> bool {
        !metadata.errors.is_empty()
    }
}
