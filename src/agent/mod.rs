// Agent assembly: wires the engine, supervisor, and injected collaborators
// together behind a small start/shutdown handle.

pub mod engine;
pub mod phase;
pub mod supervisor;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::champions::ChampionRegistry;
use crate::config::Config;
use crate::dispatch::{BrowserDispatcher, Dispatcher};
use crate::error::{AgentError, Result};
use crate::observer::{AgentObserver, NullObserver};
use crate::agent::supervisor::{AgentCommand, Supervisor};

const COMMAND_QUEUE_DEPTH: usize = 8;

/// Builder for one agent instance. The registry, dispatcher, and observer are
/// injectable so tests and embedders can substitute fakes; defaults cover the
/// normal desktop case.
pub struct Agent {
    config: Config,
    registry: Arc<ChampionRegistry>,
    dispatcher: Arc<dyn Dispatcher>,
    observer: Arc<dyn AgentObserver>,
}

impl Agent {
    pub fn new(config: Config) -> Self {
        Agent {
            config,
            registry: Arc::new(ChampionRegistry::embedded()),
            dispatcher: Arc::new(BrowserDispatcher),
            observer: Arc::new(NullObserver),
        }
    }

    pub fn with_registry(mut self, registry: Arc<ChampionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn AgentObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Spawn the supervisor on the current tokio runtime.
    pub fn start(self) -> (AgentHandle, JoinHandle<()>) {
        let shutdown = CancellationToken::new();
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let supervisor = Supervisor::new(
            self.config,
            self.registry,
            self.dispatcher,
            self.observer,
            shutdown.clone(),
            command_rx,
        );
        let task = tokio::spawn(supervisor.run());
        (
            AgentHandle {
                shutdown,
                commands: command_tx,
            },
            task,
        )
    }
}

#[derive(Clone)]
pub struct AgentHandle {
    shutdown: CancellationToken,
    commands: mpsc::Sender<AgentCommand>,
}

impl AgentHandle {
    /// Begin an orderly shutdown: the socket closes and pending dispatch
    /// delays are cancelled.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Validate and hot-apply a new configuration.
    pub async fn update_config(&self, config: Config) -> Result<()> {
        config.validate()?;
        self.commands
            .send(AgentCommand::UpdateConfig(config))
            .await
            .map_err(|_| AgentError::Config("agent is no longer running".into()))
    }
}
