//! Bounded-retry ledger client bootstrap.
//!
//! One attempt runs fetch → parse → bind → construct strictly in order.
//! Failures alert the user and schedule exactly one delayed retry; the
//! attempt counter is monotone for the process lifetime and, once it hits
//! the ceiling, only a full restart brings the client back.

use crate::alert::AlertSink;
use crate::backend::{BackendClient, BackendError};
use cv_abi::AbiError;
use cv_api_types::{AlertSeverity, ContractAddress};
use cv_provider::{
    ContractCoordinates, ContractHandle, ProviderError, ProviderSession, WalletProvider, bind,
};
use std::sync::{Arc, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub const MAX_INIT_ATTEMPTS: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapPhase {
    Idle,
    /// Re-entrancy guard: an attempt is running right now.
    InProgress,
    Ready,
    PermanentlyFailed,
}

/// Explicit, injectable bootstrap state (attempt counter + phase) owned by
/// a single coordinator instead of ambient globals.
#[derive(Debug)]
struct BootstrapState {
    phase: BootstrapPhase,
    attempts: u32,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("ledger client initialization permanently failed after {0} attempts")]
    PermanentlyFailed(u32),
    #[error("a bootstrap attempt is already in progress")]
    InProgress,
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Abi(#[from] AbiError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Clone, Copy)]
pub struct BootstrapConfig {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_INIT_ATTEMPTS,
            retry_delay: RETRY_DELAY,
        }
    }
}

pub struct LedgerBootstrap {
    /// Back-reference for the background tasks this coordinator spawns.
    weak_self: Weak<Self>,
    backend: BackendClient,
    provider: Arc<dyn WalletProvider>,
    alerts: Arc<dyn AlertSink>,
    config: BootstrapConfig,
    state: Mutex<BootstrapState>,
    /// Written exactly once, on reaching `Ready`.
    handle: RwLock<Option<Arc<ContractHandle>>>,
    /// The one pending auto-retry, held abortable so a later successful
    /// manual trigger cancels it instead of racing it.
    pending_retry: Mutex<Option<JoinHandle<()>>>,
}

impl LedgerBootstrap {
    pub fn new(
        backend: BackendClient,
        provider: Arc<dyn WalletProvider>,
        alerts: Arc<dyn AlertSink>,
    ) -> Arc<Self> {
        Self::with_config(backend, provider, alerts, BootstrapConfig::default())
    }

    pub fn with_config(
        backend: BackendClient,
        provider: Arc<dyn WalletProvider>,
        alerts: Arc<dyn AlertSink>,
        config: BootstrapConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            weak_self: weak_self.clone(),
            backend,
            provider,
            alerts,
            config,
            state: Mutex::new(BootstrapState {
                phase: BootstrapPhase::Idle,
                attempts: 0,
            }),
            handle: RwLock::new(None),
            pending_retry: Mutex::new(None),
        })
    }

    /// The published handle, if bootstrap has ever reached `Ready`.
    pub async fn handle(&self) -> Option<Arc<ContractHandle>> {
        self.handle.read().await.clone()
    }

    pub fn provider_detected(&self) -> bool {
        self.provider.detect()
    }

    pub async fn phase(&self) -> BootstrapPhase {
        self.state.lock().await.phase
    }

    pub async fn attempts(&self) -> u32 {
        self.state.lock().await.attempts
    }

    /// Fire-and-forget bootstrap trigger for callers that must not block.
    pub fn trigger(&self) {
        let Some(this) = self.weak_self.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            if let Err(err) = this.ensure_ready().await {
                warn!("background bootstrap attempt failed: {err}");
            }
        });
    }

    /// Run one bootstrap attempt (or short-circuit if already `Ready`).
    ///
    /// On a retryable failure this returns the error for the current call
    /// and leaves one delayed re-attempt scheduled in the background.
    pub async fn ensure_ready(&self) -> Result<Arc<ContractHandle>, BootstrapError> {
        // Reaching Ready is checked first: a retry firing after success is
        // a no-op success, never a replay of side effects.
        if let Some(handle) = self.handle.read().await.clone() {
            return Ok(handle);
        }

        {
            let mut state = self.state.lock().await;
            match state.phase {
                BootstrapPhase::InProgress => return Err(BootstrapError::InProgress),
                BootstrapPhase::PermanentlyFailed => {
                    self.alerts.alert(
                        AlertSeverity::Danger,
                        "ledger client initialization failed; reload the page to retry",
                    );
                    return Err(BootstrapError::PermanentlyFailed(state.attempts));
                }
                BootstrapPhase::Idle | BootstrapPhase::Ready => {}
            }

            if state.attempts >= self.config.max_attempts {
                state.phase = BootstrapPhase::PermanentlyFailed;
                self.alerts.alert(
                    AlertSeverity::Danger,
                    "ledger client initialization failed; reload the page to retry",
                );
                return Err(BootstrapError::PermanentlyFailed(state.attempts));
            }

            state.attempts += 1;
            state.phase = BootstrapPhase::InProgress;
            info!(
                "bootstrap attempt {}/{}",
                state.attempts, self.config.max_attempts
            );
        }

        match self.run_attempt().await {
            Ok(handle) => {
                *self.handle.write().await = Some(Arc::clone(&handle));
                self.state.lock().await.phase = BootstrapPhase::Ready;
                self.cancel_pending_retry().await;
                self.alerts
                    .alert(AlertSeverity::Success, "ledger connection established");
                Ok(handle)
            }
            Err(err) => {
                self.state.lock().await.phase = BootstrapPhase::Idle;
                self.handle_failure(&err).await;
                Err(err)
            }
        }
    }

    /// One attempt, steps strictly sequential: FetchingDescriptor →
    /// ParsingDescriptor → BindingProvider → ConstructingHandle.
    async fn run_attempt(&self) -> Result<Arc<ContractHandle>, BootstrapError> {
        let info = self.backend.contract_info().await?;
        info!("fetched contract coordinates for {}", info.address);

        let parsed = cv_abi::parse(info.abi)?;
        if !parsed.missing.is_empty() {
            warn!(
                "interface descriptor is missing required methods: {:?}",
                parsed.missing
            );
            self.alerts.alert(
                AlertSeverity::Warning,
                &format!(
                    "contract interface is missing required methods: {}",
                    parsed.missing.join(", ")
                ),
            );
        }

        let session = bind(self.provider.as_ref()).await?;
        info!("wallet session authorized for {}", session.account.0);

        let handle = self.construct_handle(info.address, parsed.descriptor, session)?;
        Ok(Arc::new(handle))
    }

    fn construct_handle(
        &self,
        address: String,
        descriptor: cv_abi::InterfaceDescriptor,
        session: ProviderSession,
    ) -> Result<ContractHandle, BootstrapError> {
        let coordinates = ContractCoordinates {
            address: ContractAddress(address),
            descriptor,
        };
        Ok(ContractHandle::construct(
            self.provider.as_ref(),
            coordinates,
            session,
        )?)
    }

    async fn handle_failure(&self, err: &BootstrapError) {
        match err {
            BootstrapError::Provider(ProviderError::NoProvider) => {
                // Nothing will change without user action, so no auto-retry.
                self.alerts.alert(
                    AlertSeverity::Warning,
                    "no wallet provider detected; install a wallet extension",
                );
            }
            BootstrapError::Provider(provider_err) => {
                self.alerts.alert(
                    AlertSeverity::Warning,
                    &format!("wallet connection failed: {provider_err}"),
                );
                self.schedule_retry().await;
            }
            other => {
                self.alerts
                    .alert(AlertSeverity::Danger, &format!("initialization failed: {other}"));
                self.schedule_retry().await;
            }
        }
    }

    /// Schedule exactly one delayed re-attempt, replacing any still-pending
    /// one.
    async fn schedule_retry(&self) {
        let Some(this) = self.weak_self.upgrade() else {
            return;
        };

        let mut pending = self.pending_retry.lock().await;
        if let Some(existing) = pending.take() {
            existing.abort();
        }

        let delay = self.config.retry_delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Clear our own slot before re-entering so a follow-up failure
            // can schedule the next retry without aborting this task.
            this.pending_retry.lock().await.take();
            // Re-enter through the detached trigger: awaiting ensure_ready
            // here would nest this task's future inside the one it spawns.
            this.trigger();
        }));
    }

    async fn cancel_pending_retry(&self) {
        if let Some(task) = self.pending_retry.lock().await.take() {
            task.abort();
        }
    }

    pub async fn has_pending_retry(&self) -> bool {
        self.pending_retry.lock().await.is_some()
    }
}
