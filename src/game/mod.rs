//! A single match: players, bank, lifecycle and live feed.
//!
//! All mutable state of a match sits behind one [`RwLock`], so operations on
//! the same match are linearized while different matches proceed in parallel.
//! Every successful mutation publishes an [`Event`] before the lock is
//! released, which keeps feed order identical to mutation order.
//!
//! ## Submodules
//!
//! - [`economy`]: Credit, deposit and loan settlement
//! - [`lottery`]: The nine-cell lottery
//! - [`quiz`]: Bid-based quiz questions
//! - [`theft`]: Periodic redistribution between players
//! - [`feed`]: Fan-out of events to attached players
mod economy;
mod event;
mod feed;
mod lottery;
mod phase;
mod quiz;
mod theft;

pub use economy::*;
pub use event::*;
pub use feed::*;
pub use lottery::*;
pub use phase::*;
pub use quiz::*;

use crate::*;
use rand::rngs::SmallRng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// One instance of the timed game.
pub struct Match {
    id: ID<Self>,
    config: MatchConfig,
    quizmaster: Arc<dyn Quizmaster>,
    state: RwLock<State>,
}

/// Everything guarded by the match lock.
struct State {
    phase: Phase,
    bank: Points,
    endowment: Points,
    players: Vec<Player>,
    questions: HashMap<ID<Question>, Question>,
    loans: HashMap<ID<Loan>, Loan>,
    feed: Broadcast,
    started: Option<Instant>,
    rng: SmallRng,
}

/// Books of a match at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Audit {
    pub endowment: Points,
    pub bank: Points,
    pub points: Points,
    pub credit: Points,
    pub deposit: Points,
}

impl Audit {
    /// Money is neither created nor destroyed.
    pub fn conserved(&self) -> bool {
        self.bank + self.points == self.endowment
    }
}

impl Match {
    pub fn new(config: MatchConfig, quizmaster: Arc<dyn Quizmaster>, rng: SmallRng) -> Self {
        Self {
            id: ID::default(),
            config,
            quizmaster,
            state: RwLock::new(State {
                phase: Phase::Waiting,
                bank: 0,
                endowment: 0,
                players: Vec::new(),
                questions: HashMap::new(),
                loans: HashMap::new(),
                feed: Broadcast::default(),
                started: None,
                rng,
            }),
        }
    }
    pub async fn phase(&self) -> Phase {
        self.state.read().await.phase
    }
    pub async fn is_finished(&self) -> bool {
        self.phase().await == Phase::Finished
    }
    pub async fn roster(&self) -> Roster {
        self.state.read().await.roster()
    }
    pub async fn audit(&self) -> Audit {
        let state = self.state.read().await;
        Audit {
            endowment: state.endowment,
            bank: state.bank,
            points: state.players.iter().map(Player::points).sum(),
            credit: state.players.iter().map(Player::credit).sum(),
            deposit: state.players.iter().map(Player::deposit).sum(),
        }
    }
}

impl Match {
    /// Seats a new player with the configured starting points.
    /// The player also brings their share of the bank.
    pub async fn join(&self, username: String) -> Result<(ID<Player>, Roster), Invalid> {
        let mut state = self.state.write().await;
        state.phase.require(Phase::Waiting, "join")?;
        let player = Player::new(username, self.config.player_points);
        let id = player.id();
        log::debug!("[match {}] {} joins as {}", self.id, player.username(), id);
        state.players.push(player);
        state.bank += self.config.bank_points_per_player;
        state.endowment += self.config.player_points + self.config.bank_points_per_player;
        let roster = state.roster();
        state.feed.publish(&Event::Join {
            player: id,
            roster: roster.clone(),
        });
        Ok((id, roster))
    }
    /// Removes a player from the lobby. Leaving twice is a no-op.
    pub async fn leave(&self, player: ID<Player>) -> Result<bool, Invalid> {
        let mut state = self.state.write().await;
        state.phase.require(Phase::Waiting, "leave")?;
        let Some(index) = state.players.iter().position(|p| p.id() == player) else {
            return Ok(false);
        };
        let gone = state.players.remove(index);
        state.bank -= self.config.bank_points_per_player;
        state.endowment -= gone.points() + self.config.bank_points_per_player;
        state.feed.detach(player);
        log::debug!("[match {}] {} leaves", self.id, player);
        let event = Event::Leave {
            player,
            roster: state.roster(),
        };
        state.feed.publish(&event);
        Ok(true)
    }
    /// Attaches a live feed for a player, replacing any previous one.
    pub async fn set_player_stream(&self, player: ID<Player>, feed: Feed) -> Result<(), Invalid> {
        let mut state = self.state.write().await;
        if state.phase == Phase::Finished {
            return Err(Invalid::Missing(self.id));
        }
        state.player(player)?;
        if state.feed.attach(player, feed).is_some() {
            log::debug!("[match {}] {} replaced their feed", self.id, player);
        }
        Ok(())
    }
}

impl Match {
    /// Waiting → Active. Returns false if the match was not waiting.
    pub(crate) async fn start(&self) -> bool {
        let mut state = self.state.write().await;
        if !state.phase.start() {
            return false;
        }
        state.started = Some(Instant::now());
        let event = Event::Start {
            roster: state.roster(),
        };
        state.feed.publish(&event);
        log::info!(
            "[match {}] started with {} players",
            self.id,
            state.players.len()
        );
        true
    }
    /// Active → Finished. Settles outstanding loans, forgets pending questions,
    /// publishes the final standings and closes every feed.
    pub(crate) async fn finish(&self) -> bool {
        let mut state = self.state.write().await;
        if !state.phase.finish() {
            return false;
        }
        let mut loans = state.loans.keys().copied().collect::<Vec<_>>();
        loans.sort();
        for loan in loans {
            if let Some(transaction) = state.settle(loan, &self.config) {
                state.transact(transaction);
            }
        }
        state.questions.clear();
        let event = Event::Finish {
            roster: state.roster(),
        };
        state.feed.publish(&event);
        log::info!("[match {}] finished, closing {} feeds", self.id, state.feed.len());
        state.feed.close();
        true
    }
}

impl Unique for Match {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

impl State {
    fn player(&self, id: ID<Player>) -> Result<&Player, Invalid> {
        self.players
            .iter()
            .find(|p| p.id() == id)
            .ok_or(Invalid::Stranger(id))
    }
    fn player_mut(&mut self, id: ID<Player>) -> Result<&mut Player, Invalid> {
        self.players
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or(Invalid::Stranger(id))
    }
    fn roster(&self) -> Roster {
        Roster {
            bank: self.bank,
            players: self.players.iter().map(Player::standing).collect(),
        }
    }
    fn elapsed(&self) -> Duration {
        self.started.map(|s| s.elapsed()).unwrap_or_default()
    }
    /// Publishes a money movement along with the balances it produced.
    fn transact(&mut self, transaction: Transaction) {
        log::debug!("{}", transaction);
        let event = Event::Transaction {
            transaction,
            roster: self.roster(),
        };
        self.feed.publish(&event);
    }
}
