// Narrow observer interface for an optional UI or log surface. The agent
// behaves identically with or without observers attached.

use chrono::{DateTime, Utc};

use crate::agent::phase::LifecyclePhase;
use crate::error::AgentError;
use crate::trigger::Feature;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    /// No client found yet; the supervisor keeps retrying.
    WaitingForClient,
    /// Connected and subscribed to the event stream.
    Connected { credential_generation: u64 },
    /// The connection dropped; draft state is preserved for the reconnect.
    Disconnected,
    /// Repeated 401s; the client likely needs a restart.
    CannotAuthenticate,
    PhaseChanged(LifecyclePhase),
    NewSession { session_id: u64 },
}

#[derive(Debug, Clone)]
pub struct DispatchRecord {
    pub feature: Feature,
    pub url: String,
    pub at: DateTime<Utc>,
}

pub trait AgentObserver: Send + Sync {
    fn on_state_change(&self, _change: &StateChange) {}
    fn on_dispatch(&self, _record: &DispatchRecord) {}
    fn on_error(&self, _error: &AgentError) {}
}

/// Observer that drops everything; the default when none is injected.
#[derive(Debug, Default)]
pub struct NullObserver;

impl AgentObserver for NullObserver {}

/// Observer that mirrors agent activity into the tracing log, used by the
/// CLI binary.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl AgentObserver for TracingObserver {
    fn on_state_change(&self, change: &StateChange) {
        match change {
            StateChange::WaitingForClient => tracing::info!("waiting for the League client"),
            StateChange::Connected {
                credential_generation,
            } => tracing::info!(credential_generation, "connected to the client"),
            StateChange::Disconnected => tracing::warn!("client connection lost; reconnecting"),
            StateChange::CannotAuthenticate => {
                tracing::warn!("client rejected credentials; restart the client if this persists")
            }
            StateChange::PhaseChanged(phase) => tracing::info!(?phase, "lifecycle phase changed"),
            StateChange::NewSession { session_id } => {
                tracing::info!(session_id, "champion select session started")
            }
        }
    }

    fn on_dispatch(&self, record: &DispatchRecord) {
        tracing::info!(feature = ?record.feature, url = %record.url, "opened analytics page");
    }

    fn on_error(&self, error: &AgentError) {
        tracing::warn!(%error, "agent error");
    }
}
