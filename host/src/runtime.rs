use std::time::Duration;

use minesweeper_common::{
    models::{Outcome, Pos, Snapshot},
    protocol::{Command, SessionMessage},
};
use minesweeper_engine::{Session, Update};
use rand::{SeedableRng, rngs::StdRng};
use tokio::{
    sync::{
        mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender},
        oneshot,
    },
    task::JoinHandle,
    time::{self, Instant},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{HostError, config::HostConfig};

/// Everything the session task consumes. Player commands and clock ticks
/// share this one queue, so they are applied strictly one after another.
#[derive(Debug)]
enum Input {
    Command(Command),
    /// One game second for the session with this id.
    Tick(Uuid),
    Snapshot(oneshot::Sender<Snapshot>),
    Shutdown,
}

/// Handle to a session running on its own task.
///
/// Dropping the handle closes the command channel, which stops the task.
pub struct SessionHandle {
    inputs: UnboundedSender<Input>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Queue a player command
    pub fn send(&self, command: Command) -> Result<(), HostError> {
        self.inputs
            .send(Input::Command(command))
            .map_err(|_| HostError::Closed)
    }

    /// Reveal the cell at `pos`
    pub fn reveal(&self, pos: Pos) -> Result<(), HostError> {
        self.send(Command::Reveal { pos })
    }

    /// Flag or unflag the cell at `pos`
    pub fn toggle_flag(&self, pos: Pos) -> Result<(), HostError> {
        self.send(Command::Flag { pos })
    }

    /// Replace the current session with a fresh one for the named preset
    pub fn restart(&self, difficulty: &str) -> Result<(), HostError> {
        self.send(Command::Restart {
            difficulty: difficulty.to_string(),
        })
    }

    /// Read the current session state. The answer reflects every command
    /// queued before this call.
    pub async fn snapshot(&self) -> Result<Snapshot, HostError> {
        let (reply, answer) = oneshot::channel();
        self.inputs
            .send(Input::Snapshot(reply))
            .map_err(|_| HostError::Closed)?;
        answer.await.map_err(|_| HostError::Closed)
    }

    /// Stop the session task and wait for it to finish
    pub async fn shutdown(self) {
        let _ = self.inputs.send(Input::Shutdown);
        let _ = self.task.await;
    }
}

/// Builds the first session from `config` and starts serving it.
///
/// Returns the handle and the stream of messages for the presentation
/// layer; the first message is always `Init`. Must be called from within a
/// tokio runtime.
pub fn spawn(
    config: &HostConfig,
) -> Result<(SessionHandle, UnboundedReceiver<SessionMessage>), HostError> {
    let seed = config.seed.unwrap_or_else(rand::random);
    info!("Using mine placement seed {}", seed);

    let mut rng = StdRng::seed_from_u64(seed);
    let session = Session::select_difficulty(&config.difficulty, &mut rng)?;

    let (inputs, receiver) = mpsc::unbounded_channel();
    let (messages, message_receiver) = mpsc::unbounded_channel();

    let runner = Runner {
        session,
        rng,
        inputs: receiver,
        tick_sender: inputs.downgrade(),
        tick_interval: config.tick_interval,
        ticker: None,
        messages,
    };
    let task = tokio::spawn(runner.run());

    Ok((SessionHandle { inputs, task }, message_receiver))
}

struct Runner {
    session: Session,
    rng: StdRng,
    inputs: UnboundedReceiver<Input>,
    tick_sender: WeakUnboundedSender<Input>,
    tick_interval: Duration,
    ticker: Option<JoinHandle<()>>,
    messages: UnboundedSender<SessionMessage>,
}

impl Runner {
    async fn run(mut self) {
        self.emit(self.session.init_message());
        self.start_ticker();

        while let Some(input) = self.inputs.recv().await {
            match input {
                Input::Command(command) => self.handle_command(command),
                Input::Tick(id) => self.handle_tick(id),
                Input::Snapshot(reply) => {
                    let _ = reply.send(self.session.snapshot());
                }
                Input::Shutdown => break,
            }
        }

        self.stop_ticker();
        info!("Session runtime for {} stopped", self.session.id());
    }

    fn handle_command(&mut self, command: Command) {
        debug!("Handling {:?}", command);
        let was_finished = self.session.is_finished();

        let result = match command {
            Command::Reveal { pos } => self.session.on_reveal(pos),
            Command::Flag { pos } => self.session.on_toggle_flag(pos),
            Command::Restart { difficulty } => {
                self.restart(&difficulty);
                return;
            }
        };

        match result {
            Ok(update) => self.publish(&update, was_finished),
            Err(e) => {
                warn!("Rejected command: {}", e);
                self.emit(SessionMessage::Rejected {
                    reason: e.to_string(),
                });
            }
        }
    }

    fn handle_tick(&mut self, id: Uuid) {
        // Ticks queued before the game ended or was replaced are stale.
        if id != self.session.id() || self.session.is_finished() {
            debug!("Dropping stale tick for session {}", id);
            return;
        }

        let update = self.session.on_time_tick();
        self.emit(self.session.tick_message());
        self.publish(&update, false);
    }

    fn restart(&mut self, difficulty: &str) {
        match Session::select_difficulty(difficulty, &mut self.rng) {
            Ok(session) => {
                info!(
                    "Restarting: session {} replaced by {}",
                    self.session.id(),
                    session.id()
                );
                self.session = session;
                self.emit(self.session.init_message());
                self.start_ticker();
            }
            Err(e) => {
                warn!("Rejected restart: {}", e);
                self.emit(SessionMessage::Rejected {
                    reason: e.to_string(),
                });
            }
        }
    }

    fn publish(&mut self, update: &Update, was_finished: bool) {
        let just_finished = !was_finished && update.outcome.is_terminal();

        if !update.changed.is_empty() || just_finished {
            self.emit(self.session.update_message(update));
        }

        if just_finished {
            self.stop_ticker();
            info!(
                "{} ({}s on the clock)",
                outcome_message(update.outcome),
                self.session.elapsed_secs()
            );
        }
    }

    fn emit(&self, message: SessionMessage) {
        // Nobody listening is fine; the session keeps running.
        let _ = self.messages.send(message);
    }

    fn start_ticker(&mut self) {
        self.stop_ticker();

        let sender = self.tick_sender.clone();
        let id = self.session.id();
        let period = self.tick_interval;
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let Some(sender) = sender.upgrade() else {
                    break;
                };
                if sender.send(Input::Tick(id)).is_err() {
                    break;
                }
            }
        }));
        debug!("Ticker started with {:?} period", period);
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
            debug!("Ticker stopped");
        }
    }
}

/// End-of-game line for the presentation layer to show.
pub fn outcome_message(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::InProgress => "Game in progress",
        Outcome::Won => "Congratulations! You won!",
        Outcome::Lost => "Boom! Game over.",
        Outcome::TimedOut => "Time's up! Game ended.",
    }
}
