// Lifecycle owner: acquires credentials, drives the transport, folds events
// through the engine, and schedules dispatches. The supervisor is the only
// component that decides to reconnect or reacquire credentials.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::agent::engine::Engine;
use crate::champions::ChampionRegistry;
use crate::config::Config;
use crate::dispatch::{spawn_dispatch, Dispatcher};
use crate::error::{AgentError, Result};
use crate::lcu::events::{
    decode, decode_phase, decode_session, LcuEvent, CHAMP_SELECT_SESSION_URI, GAMEFLOW_PHASE_URI,
};
use crate::lcu::{ClientLocator, LcuTransport};
use crate::observer::{AgentObserver, StateChange};

#[derive(Debug)]
pub enum AgentCommand {
    UpdateConfig(Config),
}

// One iteration of the event loop; resolved outside the select so handlers
// are free to borrow the supervisor again.
enum Step {
    Shutdown,
    Command(Option<AgentCommand>),
    Frame(Result<Option<String>>),
}

pub struct Supervisor {
    config: Config,
    registry: Arc<ChampionRegistry>,
    dispatcher: Arc<dyn Dispatcher>,
    observer: Arc<dyn AgentObserver>,
    shutdown: CancellationToken,
    commands: mpsc::Receiver<AgentCommand>,
    commands_open: bool,
}

impl Supervisor {
    pub fn new(
        config: Config,
        registry: Arc<ChampionRegistry>,
        dispatcher: Arc<dyn Dispatcher>,
        observer: Arc<dyn AgentObserver>,
        shutdown: CancellationToken,
        commands: mpsc::Receiver<AgentCommand>,
    ) -> Self {
        Supervisor {
            config,
            registry,
            dispatcher,
            observer,
            shutdown,
            commands,
            commands_open: true,
        }
    }

    pub async fn run(mut self) {
        if self.config.champion_data.refresh_on_start {
            let registry = Arc::clone(&self.registry);
            let cdn = self.config.champion_data.cdn_base_url.clone();
            tokio::spawn(async move {
                if let Err(err) = registry.refresh_from_cdn(&cdn).await {
                    warn!(%err, "champion data refresh failed; embedded data stays authoritative");
                }
            });
        }

        let mut locator = ClientLocator::new(self.config.client.install_dir.clone());
        let mut engine = Engine::new(self.config.clone(), Arc::clone(&self.registry));
        // Pending dispatch delays hang off this token; it rotates on session
        // boundaries and dies with the shutdown token.
        let mut session_cancel = self.shutdown.child_token();
        let mut attempt: u32 = 0;

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }
            match self
                .connect_and_stream(&mut locator, &mut engine, &mut session_cancel, &mut attempt)
                .await
            {
                Ok(()) => break, // orderly shutdown
                Err(err) => {
                    attempt += 1;
                    self.notify_failure(&err);
                    let max = self.config.transport.max_retries;
                    if max > 0 && attempt >= max {
                        warn!(attempt, "giving up after exhausting retries");
                        break;
                    }
                    let delay = self.config.transport.delay_for_attempt(attempt);
                    debug!(attempt, ?delay, "retrying client connection");
                    tokio::select! {
                        _ = self.shutdown.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    fn notify_failure(&self, err: &AgentError) {
        match err {
            AgentError::ClientNotRunning => {
                self.observer.on_state_change(&StateChange::WaitingForClient)
            }
            AgentError::Auth => self
                .observer
                .on_state_change(&StateChange::CannotAuthenticate),
            _ => self.observer.on_state_change(&StateChange::Disconnected),
        }
        self.observer.on_error(err);
    }

    /// One full connection lifetime: acquire, resync, then stream events
    /// until the socket dies or shutdown. `Ok` means shutdown.
    async fn connect_and_stream(
        &mut self,
        locator: &mut ClientLocator,
        engine: &mut Engine,
        session_cancel: &mut CancellationToken,
        attempt: &mut u32,
    ) -> Result<()> {
        let credentials = locator.acquire()?;
        let generation = credentials.generation;
        let transport = LcuTransport::new(credentials)?;

        // Resync before any buffered events apply, so a reconnect repairs
        // missed deltas through the same transition table.
        self.resync(&transport, engine, session_cancel).await?;

        let mut stream = transport.open_events().await?;
        *attempt = 0;
        info!(generation, "connected to client event stream");
        self.observer.on_state_change(&StateChange::Connected {
            credential_generation: generation,
        });

        loop {
            let step = tokio::select! {
                _ = self.shutdown.cancelled() => Step::Shutdown,
                command = self.commands.recv(), if self.commands_open => Step::Command(command),
                frame = stream.next_text() => Step::Frame(frame),
            };
            match step {
                Step::Shutdown => {
                    stream.close().await;
                    return Ok(());
                }
                Step::Command(Some(AgentCommand::UpdateConfig(config))) => {
                    info!("applying updated configuration");
                    self.config = config.clone();
                    engine.set_config(config);
                }
                Step::Command(None) => self.commands_open = false,
                Step::Frame(frame) => match frame? {
                    Some(text) => self.handle_frame(engine, &text, session_cancel),
                    None => {
                        return Err(AgentError::Transport(
                            "event stream closed by client".into(),
                        ));
                    }
                },
            }
        }
    }

    async fn resync(
        &mut self,
        transport: &LcuTransport,
        engine: &mut Engine,
        session_cancel: &mut CancellationToken,
    ) -> Result<()> {
        let phase_payload = transport.get(GAMEFLOW_PHASE_URI).await?;
        let phase_event = decode_phase(&phase_payload)?;
        self.process_event(engine, phase_event, session_cancel);

        match transport.get(CHAMP_SELECT_SESSION_URI).await {
            Ok(payload) => {
                let session_event = decode_session(payload)?;
                self.process_event(engine, session_event, session_cancel);
            }
            // 404 means "not in champion select"; nothing to repair.
            Err(AgentError::NotInPhase) => {}
            Err(err) => return Err(err),
        }
        Ok(())
    }

    fn handle_frame(
        &mut self,
        engine: &mut Engine,
        text: &str,
        session_cancel: &mut CancellationToken,
    ) {
        match decode(text) {
            Ok(Some(event)) => self.process_event(engine, event, session_cancel),
            Ok(None) => {}
            Err(err) => {
                // Malformed frames are logged and dropped; state stays put.
                warn!(%err, "dropping undecodable frame");
                self.observer.on_error(&err);
            }
        }
    }

    fn process_event(
        &mut self,
        engine: &mut Engine,
        event: LcuEvent,
        session_cancel: &mut CancellationToken,
    ) {
        let output = engine.handle_event(event);
        for change in &output.state_changes {
            self.observer.on_state_change(change);
        }
        if output.session_boundary {
            session_cancel.cancel();
            *session_cancel = self.shutdown.child_token();
        }
        let delay = Duration::from_millis(self.config.dispatch.delay_ms);
        for intent in output.intents {
            debug!(feature = ?intent.feature, url = %intent.url, "scheduling dispatch");
            spawn_dispatch(
                Arc::clone(&self.dispatcher),
                Arc::clone(&self.observer),
                intent,
                delay,
                session_cancel.clone(),
            );
        }
    }
}
