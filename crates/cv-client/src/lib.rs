//! Resilient ledger-client core: metadata backend client, bounded-retry
//! bootstrap, and the record gateway consumed by the view layer.

pub mod alert;
pub mod backend;
pub mod bootstrap;
pub mod gateway;

pub use alert::{AlertSink, TracingAlertSink};
pub use backend::{BackendClient, BackendError, ContractInfo};
pub use bootstrap::{
    BootstrapConfig, BootstrapError, BootstrapPhase, LedgerBootstrap, MAX_INIT_ATTEMPTS,
    RETRY_DELAY,
};
pub use gateway::{GatewayError, RecordGateway};
