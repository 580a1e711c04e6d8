//! User-visible alert channel.
//!
//! The core never renders banners itself; it hands classified messages to
//! whatever sink the embedding layer registered.

use cv_api_types::AlertSeverity;

pub trait AlertSink: Send + Sync {
    fn alert(&self, severity: AlertSeverity, message: &str);
}

/// Default sink: routes banners into the log stream.
#[derive(Debug, Default)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn alert(&self, severity: AlertSeverity, message: &str) {
        match severity {
            AlertSeverity::Success => tracing::info!(target: "cv_alerts", "{message}"),
            AlertSeverity::Warning => tracing::warn!(target: "cv_alerts", "{message}"),
            AlertSeverity::Danger => tracing::error!(target: "cv_alerts", "{message}"),
        }
    }
}
