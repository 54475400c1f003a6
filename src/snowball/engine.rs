use crate::colored::Colorize;
use crate::id::Id;

use super::instance::{Instance, Snapshot};
use super::round::{ColorSet, RoundDriver};
use super::Color;

use tracing::{debug, info, warn};

use actix::{Actor, ActorFutureExt, AsyncContext, Context, Handler, Recipient, SpawnHandle};
use actix::{ActorContext, WrapFuture};
use actix_derive::{Message, MessageResponse};
use tokio::sync::watch;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// The engine-observable phase of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Submitted, no round started yet.
    Unset,
    /// A round is in flight.
    Sampling,
    /// The last round obtained no quorum.
    Stalled,
    /// The last round obtained a quorum but the question is not decided yet.
    Progressing,
    Decided,
}

/// What the round loop of a question publishes after each step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub phase: Phase,
    pub snapshot: Snapshot<Color>,
    /// The number of completed rounds.
    pub rounds: u64,
}

impl Status {
    fn unset() -> Self {
        Status { phase: Phase::Unset, snapshot: Snapshot::default(), rounds: 0 }
    }
}

/// An active question.
struct Slot {
    /// The color this node proposed, answered until the first successful round.
    proposal: Option<Color>,
    /// The latest status published by the round loop.
    status: watch::Receiver<Status>,
    /// The spawned round loop.
    handle: SpawnHandle,
}

/// The Snowball engine of a node.
///
/// Every submitted question runs its own round loop, spawned in the engine's context, so
/// unrelated questions proceed in parallel while the rounds of one question run strictly
/// one after the other. The loop is the only writer of its [Instance] and publishes a
/// [Status] after every step; preference queries from other nodes only read the latest
/// published status and therefore never wait for a round.
///
/// Decided questions are retired from the active set. Their final status is kept in a
/// bounded archive (oldest evicted first) so that lagging peers can still be answered.
/// Stopping the engine cancels every pending round.
pub struct Engine {
    /// Samples, queries and tallies rounds on behalf of every question.
    driver: Arc<RoundDriver>,
    /// Receives each decision exactly once.
    decision_recipient: Recipient<Decided>,
    /// Undecided questions.
    active: HashMap<Id, Slot>,
    /// Final status of recently decided questions.
    archive: HashMap<Id, Status>,
    /// Decided questions in order of decision.
    archive_order: VecDeque<Id>,
    /// The capacity of the archive.
    retention: usize,
}

impl Engine {
    pub fn new(driver: RoundDriver, decision_recipient: Recipient<Decided>, retention: usize) -> Self {
        Engine {
            driver: Arc::new(driver),
            decision_recipient,
            active: HashMap::new(),
            archive: HashMap::new(),
            archive_order: VecDeque::new(),
            retention,
        }
    }

    fn is_known(&self, question: &Id) -> bool {
        self.active.contains_key(question) || self.archive.contains_key(question)
    }

    fn retire(&mut self, question: Id, color: Color) {
        if let Some(slot) = self.active.remove(&question) {
            let status = slot.status.borrow().clone();
            info!(
                "[{}] {} decided {} after {} rounds",
                "snowball".cyan(),
                question,
                color,
                status.rounds
            );
            self.archive(question, status);
            let _ = self.decision_recipient.do_send(Decided { question, color });
        }
    }

    fn archive(&mut self, question: Id, status: Status) {
        if self.retention == 0 {
            return;
        }
        while self.archive_order.len() >= self.retention {
            if let Some(oldest) = self.archive_order.pop_front() {
                let _ = self.archive.remove(&oldest);
            }
        }
        let _ = self.archive.insert(question, status);
        self.archive_order.push_back(question);
    }
}

/// The round loop of one question. Resolves with the decided color.
async fn drive(
    driver: Arc<RoundDriver>,
    question: Id,
    colors: ColorSet,
    publisher: watch::Sender<Status>,
) -> Color {
    let mut instance = Instance::new(driver.params().beta());
    let interval = driver.params().interval();
    let mut rounds = 0u64;
    loop {
        let _ = publisher.send(Status { phase: Phase::Sampling, snapshot: instance.snapshot(), rounds });

        let result = driver.run_round(question, &colors).await;
        instance.transition(result);
        rounds += 1;

        let snapshot = instance.snapshot();
        let phase = if snapshot.decided {
            Phase::Decided
        } else if result.is_some() {
            Phase::Progressing
        } else {
            debug!("[{}] {} stalled in round {}", "snowball".cyan(), question, rounds);
            Phase::Stalled
        };
        let _ = publisher.send(Status { phase, snapshot, rounds });

        if let Some(color) = instance.decision() {
            return *color;
        }
        if interval > Duration::from_millis(0) {
            actix::clock::sleep(interval).await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}

impl Actor for Engine {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Context<Self>) {
        debug!("[{}] engine started for {}", "snowball".cyan(), self.driver.node_id());
    }

    fn stopped(&mut self, _ctx: &mut Context<Self>) {
        info!("[{}] engine stopped, {} undecided", "snowball".cyan(), self.active.len());
    }
}

/// Delivered to the decision recipient once a question is decided.
#[derive(Debug, Clone, Serialize, Deserialize, Message)]
#[rtype(result = "()")]
pub struct Decided {
    pub question: Id,
    pub color: Color,
}

/// Starts deciding a question.
#[derive(Debug, Clone, Serialize, Deserialize, Message)]
#[rtype(result = "SubmitAck")]
pub struct Submit {
    pub question: Id,
    /// The legal colors of this question (empty admits any color).
    pub colors: ColorSet,
    /// The color this node proposes.
    pub proposal: Option<Color>,
}

#[derive(Debug, Clone, Serialize, Deserialize, MessageResponse)]
pub struct SubmitAck {
    pub question: Id,
    /// `false` if the question is already known or the proposal is illegal.
    pub accepted: bool,
}

impl Handler<Submit> for Engine {
    type Result = SubmitAck;

    fn handle(&mut self, msg: Submit, ctx: &mut Context<Self>) -> Self::Result {
        let question = msg.question;
        if self.is_known(&question) {
            warn!("[{}] {} already submitted", "snowball".cyan(), question);
            return SubmitAck { question, accepted: false };
        }
        if let Some(proposal) = msg.proposal {
            if !msg.colors.admits(&proposal) {
                warn!("[{}] {} illegal proposal {}", "snowball".cyan(), question, proposal);
                return SubmitAck { question, accepted: false };
            }
        }

        let (publisher, status) = watch::channel(Status::unset());
        let round_loop = drive(self.driver.clone(), question, msg.colors, publisher)
            .into_actor(self)
            .map(move |color, engine, _ctx| engine.retire(question, color));
        let handle = ctx.spawn(round_loop);
        let _ = self.active.insert(question, Slot { proposal: msg.proposal, status, handle });

        info!("[{}] sampling {} (proposal = {:?})", "snowball".cyan(), question, msg.proposal);
        SubmitAck { question, accepted: true }
    }
}

/// Another node asking for this node's preference.
#[derive(Debug, Clone, Serialize, Deserialize, Message)]
#[rtype(result = "PreferenceAck")]
pub struct PreferenceQuery {
    pub question: Id,
}

#[derive(Debug, Clone, Serialize, Deserialize, MessageResponse)]
pub struct PreferenceAck {
    pub question: Id,
    /// `None` is an abstention.
    pub color: Option<Color>,
}

impl Handler<PreferenceQuery> for Engine {
    type Result = PreferenceAck;

    fn handle(&mut self, msg: PreferenceQuery, _ctx: &mut Context<Self>) -> Self::Result {
        let color = match self.active.get(&msg.question) {
            Some(slot) => slot.status.borrow().snapshot.preferred.or(slot.proposal),
            None => self.archive.get(&msg.question).and_then(|status| status.snapshot.preferred),
        };
        PreferenceAck { question: msg.question, color }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Message)]
#[rtype(result = "StatusAck")]
pub struct GetStatus {
    pub question: Id,
}

#[derive(Debug, Clone, Serialize, Deserialize, MessageResponse)]
pub struct StatusAck {
    pub question: Id,
    /// `None` for unknown (or evicted) questions.
    pub status: Option<Status>,
}

impl Handler<GetStatus> for Engine {
    type Result = StatusAck;

    fn handle(&mut self, msg: GetStatus, _ctx: &mut Context<Self>) -> Self::Result {
        let status = match self.active.get(&msg.question) {
            Some(slot) => Some(slot.status.borrow().clone()),
            None => self.archive.get(&msg.question).cloned(),
        };
        StatusAck { question: msg.question, status }
    }
}

/// Gives up on an undecided question without notifying the decision recipient.
#[derive(Debug, Clone, Serialize, Deserialize, Message)]
#[rtype(result = "bool")]
pub struct Abandon {
    pub question: Id,
}

impl Handler<Abandon> for Engine {
    type Result = bool;

    fn handle(&mut self, msg: Abandon, ctx: &mut Context<Self>) -> Self::Result {
        match self.active.remove(&msg.question) {
            Some(slot) => {
                let _ = ctx.cancel_future(slot.handle);
                info!("[{}] abandoned {}", "snowball".cyan(), msg.question);
                true
            }
            None => false,
        }
    }
}

/// Stops the engine, cancelling every pending round.
#[derive(Debug, Clone, Serialize, Deserialize, Message)]
#[rtype(result = "()")]
pub struct Shutdown;

impl Handler<Shutdown> for Engine {
    type Result = ();

    fn handle(&mut self, _msg: Shutdown, ctx: &mut Context<Self>) -> Self::Result {
        ctx.stop();
    }
}
