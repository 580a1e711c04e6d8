//! Wallet provider and ledger contract boundary.
//!
//! The wallet provider is the host-injected component that owns account
//! identity and transaction signing; the ledger contract is an opaque
//! remote object reached through it. Both are trait seams so the client
//! core never touches a concrete transport.

use async_trait::async_trait;
use cv_abi::InterfaceDescriptor;
use cv_api_types::{AccountAddress, ContractAddress, Fingerprint, RecordEntry};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Method names the constructed handle must expose before it is published.
const CALLABLE_SURFACE: [&str; 4] = ["store", "get", "listForOwner", "verify"];

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no wallet provider detected in this environment")]
    NoProvider,
    #[error("wallet authorization denied: {0}")]
    AuthorizationDenied(String),
    #[error("contract handle construction failed: {0}")]
    HandleConstruction(String),
}

#[derive(Debug, Error)]
pub enum LedgerCallError {
    /// The provider (or the user behind it) refused to sign or forward
    /// the call.
    #[error("ledger call {method} rejected by provider: {reason}")]
    Rejected { method: String, reason: String },
    /// The call never reached the ledger.
    #[error("ledger transport failure on {method}: {reason}")]
    Transport { method: String, reason: String },
    /// The ledger executed the call and reported failure, or returned a
    /// payload the client could not decode.
    #[error("ledger call {method} failed: {reason}")]
    Call { method: String, reason: String },
}

/// Wallet connection plus the authorized account identity. Valid until the
/// provider revokes access, which is only discovered on the next call.
#[derive(Debug, Clone)]
pub struct ProviderSession {
    pub account: AccountAddress,
}

/// Where the contract lives and what it answers to. Immutable once
/// validated for the lifetime of the session.
#[derive(Debug, Clone)]
pub struct ContractCoordinates {
    pub address: ContractAddress,
    pub descriptor: InterfaceDescriptor,
}

impl ContractCoordinates {
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.address.0.trim().is_empty() || self.address.is_sentinel() {
            return Err(ProviderError::HandleConstruction(
                "contract address is unset or the zero sentinel".to_owned(),
            ));
        }
        if self.descriptor.is_empty() {
            return Err(ProviderError::HandleConstruction(
                "interface descriptor is empty".to_owned(),
            ));
        }
        Ok(())
    }
}

/// The opaque remote contract. `call` is read-only; `send` mutates ledger
/// state and is signed as `from`.
#[async_trait]
pub trait LedgerContract: Send + Sync {
    async fn call(&self, method: &str, args: &[Value]) -> Result<Value, LedgerCallError>;
    async fn send(
        &self,
        method: &str,
        args: &[Value],
        from: &AccountAddress,
    ) -> Result<Value, LedgerCallError>;
    fn has_method(&self, name: &str) -> bool;
}

/// Host wallet boundary: capability query, one interactive authorization
/// request, and contract handle construction.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn detect(&self) -> bool;

    /// May suspend indefinitely pending user approval in the host UI; the
    /// binder imposes no timeout of its own.
    async fn request_accounts(&self) -> Result<Vec<AccountAddress>, ProviderError>;

    fn contract_handle(
        &self,
        coordinates: &ContractCoordinates,
        session: &ProviderSession,
    ) -> Result<Arc<dyn LedgerContract>, ProviderError>;
}

/// Resolve the active session identity from the provider. The first
/// authorized account becomes the session identity.
pub async fn bind(provider: &dyn WalletProvider) -> Result<ProviderSession, ProviderError> {
    if !provider.detect() {
        return Err(ProviderError::NoProvider);
    }

    let accounts = provider.request_accounts().await?;
    let account = accounts
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::AuthorizationDenied("no accounts authorized".to_owned()))?;

    Ok(ProviderSession { account })
}

/// The bound, callable contract proxy. Owns nothing beyond coordinates,
/// session, and the provider-built contract object.
pub struct ContractHandle {
    coordinates: ContractCoordinates,
    session: ProviderSession,
    contract: Arc<dyn LedgerContract>,
}

impl fmt::Debug for ContractHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractHandle")
            .field("coordinates", &self.coordinates)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl ContractHandle {
    /// Validate coordinates, build the contract object through the
    /// provider, and check it exposes the callable surface.
    pub fn construct(
        provider: &dyn WalletProvider,
        coordinates: ContractCoordinates,
        session: ProviderSession,
    ) -> Result<Self, ProviderError> {
        coordinates.validate()?;

        let contract = provider.contract_handle(&coordinates, &session)?;
        for method in CALLABLE_SURFACE {
            if !contract.has_method(method) {
                return Err(ProviderError::HandleConstruction(format!(
                    "constructed handle does not expose {method}"
                )));
            }
        }

        Ok(Self {
            coordinates,
            session,
            contract,
        })
    }

    pub fn coordinates(&self) -> &ContractCoordinates {
        &self.coordinates
    }

    pub fn session(&self) -> &ProviderSession {
        &self.session
    }

    pub async fn list_for_owner(
        &self,
        owner: &AccountAddress,
    ) -> Result<Vec<Fingerprint>, LedgerCallError> {
        let result = self
            .contract
            .call("listForOwner", &[Value::String(owner.0.clone())])
            .await?;
        serde_json::from_value(result).map_err(|err| LedgerCallError::Call {
            method: "listForOwner".to_owned(),
            reason: format!("undecodable fingerprint list: {err}"),
        })
    }

    pub async fn get_record(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<RecordEntry, LedgerCallError> {
        let result = self
            .contract
            .call("get", &[Value::String(fingerprint.0.clone())])
            .await?;
        serde_json::from_value(result).map_err(|err| LedgerCallError::Call {
            method: "get".to_owned(),
            reason: format!("undecodable record: {err}"),
        })
    }

    /// Signed verification attributed to the session identity.
    pub async fn verify(&self, fingerprint: &Fingerprint) -> Result<(), LedgerCallError> {
        self.contract
            .send(
                "verify",
                &[Value::String(fingerprint.0.clone())],
                &self.session.account,
            )
            .await?;
        Ok(())
    }
}
