//! Collaborator interfaces consumed by the orchestrator.
//!
//! Everything that depends on what a permission *means* (amount math,
//! period conversion, field layout, per-type validation messages) lives
//! behind [`PermissionHandler`]. Grantor identity lives behind
//! [`AccountProvider`], signing behind
//! [`AuthorizationSigner`](crate::authorization::AuthorizationSigner).

use async_trait::async_trait;
use serde::Serialize;

use grantflow_core::{
    ChainId, ElementId, EventKind, InputValue, PermissionRequest, RawPermissionRequest, UiElement,
};

use crate::error::ApprovalResult;
use crate::restriction::RestrictionBuilder;

/// Grantor account details.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountInfo {
    /// Grantor address on the requested chain.
    pub address: String,
    /// Deployment metadata passed through to the response.
    pub metadata: serde_json::Value,
}

/// Supplies grantor identity and deployment metadata.
#[async_trait]
pub trait AccountProvider: Send + Sync {
    /// Look up the grantor account for `chain_id`.
    async fn account(&self, chain_id: ChainId) -> ApprovalResult<AccountInfo>;
}

/// Business rules of one permission type.
///
/// `Context` is replaced wholesale on every edit; the orchestrator never
/// hands out a mutable reference to it. `Metadata` must be a pure function
/// of the `Context` it was derived from. Field validation problems belong
/// in `Metadata`, not in errors: an `Err` from any method here is fatal to
/// the request (or, for [`PermissionHandler::apply_edit`], to that edit).
#[async_trait]
pub trait PermissionHandler: Send + Sync + 'static {
    /// Permission data after validation. Optional fields may be unset.
    type Permission: Clone + Serialize + Send + Sync + 'static;
    /// Permission data with every optional field defaulted.
    type Populated: Serialize + Send + Sync + 'static;
    /// Display-oriented projection of the request.
    type Context: Send + Sync + 'static;
    /// Validation output derived from a context.
    type Metadata: Send + Sync + 'static;

    /// The permission type tag this handler accepts.
    fn permission_type(&self) -> &str;

    /// Check a raw request and convert its permission data. No I/O.
    fn validate(
        &self,
        request: &RawPermissionRequest,
    ) -> ApprovalResult<PermissionRequest<Self::Permission>>;

    /// Build the initial context. Recoverable problems are encoded in the
    /// context for [`PermissionHandler::derive_metadata`] to flag.
    async fn build_context(
        &self,
        request: &PermissionRequest<Self::Permission>,
    ) -> ApprovalResult<Self::Context>;

    /// Derive metadata from a context.
    async fn derive_metadata(&self, context: &Self::Context) -> ApprovalResult<Self::Metadata>;

    /// Render the full confirmation content.
    fn render_content(&self, context: &Self::Context, metadata: &Self::Metadata) -> UiElement;

    /// Render the placeholder shown while the context resolves.
    fn render_skeleton(&self) -> UiElement;

    /// Elements whose input is routed to [`PermissionHandler::apply_edit`].
    fn editable_fields(
        &self,
        request: &PermissionRequest<Self::Permission>,
    ) -> Vec<(ElementId, EventKind)>;

    /// Compute the context that results from editing one element.
    fn apply_edit(
        &self,
        context: &Self::Context,
        element_id: &ElementId,
        value: &InputValue,
    ) -> ApprovalResult<Self::Context>;

    /// Convert the final context back into a request.
    async fn resolve_request(
        &self,
        context: &Self::Context,
        original: &PermissionRequest<Self::Permission>,
    ) -> ApprovalResult<PermissionRequest<Self::Permission>>;

    /// Default every optional field. Must be idempotent.
    async fn finalize(&self, permission: Self::Permission) -> ApprovalResult<Self::Populated>;

    /// Append the type-specific restrictions.
    async fn append_restrictions(
        &self,
        populated: &Self::Populated,
        builder: RestrictionBuilder,
    ) -> ApprovalResult<RestrictionBuilder>;

    /// Whether `metadata` blocks granting.
    fn grant_disabled(&self, _metadata: &Self::Metadata) -> bool {
        false
    }
}
