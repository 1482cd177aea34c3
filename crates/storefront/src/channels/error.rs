//! Delivery error taxonomy shared by every channel sender.

use super::Channel;
use serde::Serialize;
use std::fmt::Display;
use thiserror::Error;

/// Why a transient failure happened. All of these are worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransientKind {
    Timeout,
    ConnectionReset,
    DnsFailure,
    ConnectionRefused,
    Unreachable,
    RateLimited,
    ServerError,
}

impl Display for TransientKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransientKind::Timeout => "timeout",
            TransientKind::ConnectionReset => "connection reset",
            TransientKind::DnsFailure => "dns failure",
            TransientKind::ConnectionRefused => "connection refused",
            TransientKind::Unreachable => "unreachable",
            TransientKind::RateLimited => "rate limited",
            TransientKind::ServerError => "server error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("No {0} destination for recipient")]
    MissingDestination(Channel),

    #[error("Provider rejected credentials: {0}")]
    ProviderAuth(String),

    #[error("Transient provider failure ({kind}): {detail}")]
    ProviderTransient { kind: TransientKind, detail: String },

    #[error("Provider rejected message: {0}")]
    ProviderRejected(String),

    #[error("Unexpected delivery failure: {0}")]
    Unknown(String),
}

/// Coarse error class recorded on each notification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    MissingDestination,
    ProviderAuth,
    ProviderTransient,
    ProviderRejected,
    Unknown,
}

impl DeliveryError {
    pub fn transient(kind: TransientKind, detail: impl Into<String>) -> Self {
        DeliveryError::ProviderTransient {
            kind,
            detail: detail.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, DeliveryError::ProviderTransient { .. })
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            DeliveryError::MissingDestination(_) => ErrorClass::MissingDestination,
            DeliveryError::ProviderAuth(_) => ErrorClass::ProviderAuth,
            DeliveryError::ProviderTransient { .. } => ErrorClass::ProviderTransient,
            DeliveryError::ProviderRejected(_) => ErrorClass::ProviderRejected,
            DeliveryError::Unknown(_) => ErrorClass::Unknown,
        }
    }

    /// Classify a non-success HTTP status from a provider.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = format!("HTTP {status}: {}", truncate(body, 200));
        match status {
            401 | 403 => DeliveryError::ProviderAuth(detail),
            408 => DeliveryError::transient(TransientKind::Timeout, detail),
            429 => DeliveryError::transient(TransientKind::RateLimited, detail),
            500..=599 => DeliveryError::transient(TransientKind::ServerError, detail),
            400..=499 => DeliveryError::ProviderRejected(detail),
            _ => DeliveryError::Unknown(detail),
        }
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return DeliveryError::transient(TransientKind::Timeout, err.to_string());
        }
        if let Some(status) = err.status() {
            return DeliveryError::from_status(status.as_u16(), &err.to_string());
        }
        if let Some(kind) = transient_kind_in_chain(&err) {
            return DeliveryError::transient(kind, err.to_string());
        }
        if err.is_connect() {
            return DeliveryError::transient(TransientKind::ConnectionRefused, err.to_string());
        }
        DeliveryError::Unknown(err.to_string())
    }
}

/// Walk the source chain looking for an I/O error or a resolver failure.
fn transient_kind_in_chain(err: &(dyn std::error::Error + 'static)) -> Option<TransientKind> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if let Some(kind) = classify_io(io) {
                return Some(kind);
            }
        }
        let text = e.to_string().to_lowercase();
        if text.contains("dns") || text.contains("failed to lookup address") {
            return Some(TransientKind::DnsFailure);
        }
        current = e.source();
    }
    None
}

/// Map I/O error kinds onto the retryable classes.
pub fn classify_io(err: &std::io::Error) -> Option<TransientKind> {
    use std::io::ErrorKind::*;
    match err.kind() {
        TimedOut => Some(TransientKind::Timeout),
        ConnectionReset | ConnectionAborted | BrokenPipe => Some(TransientKind::ConnectionReset),
        ConnectionRefused => Some(TransientKind::ConnectionRefused),
        HostUnreachable | NetworkUnreachable => Some(TransientKind::Unreachable),
        _ => None,
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
