use crate::game::*;
use crate::schedule;
use crate::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::unbounded_channel;

/// The match taking new players and the matches being played.
struct Lobby {
    waiting: Arc<Match>,
    active: HashMap<ID<Match>, Arc<Match>>,
}

/// Tracks every live match and moves them through their lifecycle.
///
/// Lock order is registry first, match second. Per-match actions resolve
/// their match under the registry read lock, release it, then lock the match.
/// Only `start` and the finish callback hold both, because they move a match
/// between the waiting slot and the active set.
pub struct Registry {
    config: MatchConfig,
    quizmaster: Arc<dyn Quizmaster>,
    seed: Option<u64>,
    count: AtomicU64,
    lobby: RwLock<Lobby>,
}

/// Everything a client needs to draw the lobby right after joining.
#[derive(Debug, Clone, Serialize)]
pub struct Admission {
    pub player: ID<Player>,
    pub game: ID<Match>,
    pub roster: Roster,
    pub config: MatchConfig,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(MatchConfig::default(), Arc::new(Arithmetic), None)
    }
}

impl Registry {
    /// A seed makes lotteries, thefts and questions reproducible.
    pub fn new(config: MatchConfig, quizmaster: Arc<dyn Quizmaster>, seed: Option<u64>) -> Self {
        let waiting = Arc::new(Match::new(config, quizmaster.clone(), rng(seed, 0)));
        log::debug!("[registry] match {} is waiting", waiting.id());
        Self {
            config,
            quizmaster,
            seed,
            count: AtomicU64::new(1),
            lobby: RwLock::new(Lobby {
                waiting,
                active: HashMap::new(),
            }),
        }
    }
    fn create(&self) -> Arc<Match> {
        let n = self.count.fetch_add(1, Ordering::Relaxed);
        Arc::new(Match::new(
            self.config,
            self.quizmaster.clone(),
            rng(self.seed, n),
        ))
    }
    pub async fn waiting(&self) -> ID<Match> {
        self.lobby.read().await.waiting.id()
    }
    /// Number of matches currently being played.
    pub async fn active(&self) -> usize {
        self.lobby.read().await.active.len()
    }
    /// Looks up a match being played. The waiting match is not found here.
    pub async fn resolve(&self, id: ID<Match>) -> Option<Arc<Match>> {
        self.lobby.read().await.active.get(&id).cloned()
    }
    async fn playing(&self, id: ID<Match>) -> Result<Arc<Match>, Invalid> {
        self.resolve(id).await.ok_or(Invalid::Inactive(id))
    }
}

impl Registry {
    /// Seats a new player in whichever match is waiting.
    /// The read lock keeps a concurrent start from swapping the match out
    /// between the join and the snapshot.
    pub async fn join(&self, username: String) -> Result<Admission, Invalid> {
        let lobby = self.lobby.read().await;
        let (player, roster) = lobby.waiting.join(username).await?;
        Ok(Admission {
            player,
            game: lobby.waiting.id(),
            roster,
            config: self.config,
        })
    }
    /// Removes a player from the waiting match. Active matches cannot be left.
    pub async fn leave(&self, game: ID<Match>, player: ID<Player>) -> Result<(), Invalid> {
        let lobby = self.lobby.read().await;
        if lobby.waiting.id() != game {
            return Err(Invalid::NotWaiting(game));
        }
        lobby.waiting.leave(player).await.map(|_| ())
    }
    /// Starts the waiting match and opens a fresh one in its place.
    /// Starting anything but the waiting match is a harmless no-op: slow
    /// clients racing each other to the start button are expected.
    pub async fn start(self: &Arc<Self>, id: ID<Match>) -> bool {
        let game = {
            let mut lobby = self.lobby.write().await;
            if lobby.waiting.id() != id {
                log::warn!(
                    "[registry] ignoring start of {}, waiting match is {}",
                    id,
                    lobby.waiting.id()
                );
                return false;
            }
            let fresh = self.create();
            let game = std::mem::replace(&mut lobby.waiting, fresh);
            game.start().await;
            lobby.active.insert(id, game.clone());
            log::info!("[registry] match {} is waiting", lobby.waiting.id());
            game
        };
        if self.config.duration == 0 {
            log::warn!("[registry] match {} has no duration, finishing now", id);
            self.finish(id).await;
            return true;
        }
        let registry = Arc::clone(self);
        schedule::after(self.config.duration(), async move {
            registry.finish(id).await;
        });
        if let Some(period) = self.config.theft_time() {
            schedule::every(period, move || {
                let game = game.clone();
                async move { game.steal().await }
            });
        }
        true
    }
    /// Finish callback: drops the match from the active set before finishing
    /// it, so nobody can resolve a match that is on its way out.
    pub async fn finish(&self, id: ID<Match>) -> bool {
        let mut lobby = self.lobby.write().await;
        match lobby.active.remove(&id) {
            Some(game) => game.finish().await,
            None => {
                log::debug!("[registry] match {} already gone", id);
                false
            }
        }
    }
    /// Finishes every active match so their streams close.
    pub async fn shutdown(&self) -> usize {
        let mut lobby = self.lobby.write().await;
        let mut finished = 0;
        for (_, game) in lobby.active.drain() {
            if game.finish().await {
                finished += 1;
            }
        }
        finished
    }
    /// Opens a live feed for a player of the waiting or an active match.
    /// The registry lock is released before the match is touched.
    pub async fn stream(
        &self,
        game: ID<Match>,
        player: ID<Player>,
    ) -> Result<UnboundedReceiver<Event>, Invalid> {
        let found = {
            let lobby = self.lobby.read().await;
            match lobby.waiting.id() == game {
                true => Some(lobby.waiting.clone()),
                false => lobby.active.get(&game).cloned(),
            }
        };
        let found = found.ok_or(Invalid::Missing(game))?;
        let (tx, rx) = unbounded_channel();
        found.set_player_stream(player, tx).await?;
        log::debug!("[registry] {} streaming match {}", player, game);
        Ok(rx)
    }
}

impl Registry {
    pub async fn credit(
        &self,
        game: ID<Match>,
        player: ID<Player>,
        value: Points,
    ) -> Result<Verdict, Invalid> {
        self.playing(game).await?.credit(player, value).await
    }
    pub async fn deposit(
        &self,
        game: ID<Match>,
        player: ID<Player>,
        value: Points,
    ) -> Result<Verdict, Invalid> {
        self.playing(game).await?.deposit(player, value).await
    }
    pub async fn lottery(
        &self,
        game: ID<Match>,
        player: ID<Player>,
        index: i64,
    ) -> Result<Draw, Invalid> {
        crate::game::cell(index)?;
        self.playing(game).await?.lottery(player, index).await
    }
    pub async fn generate_question(
        &self,
        game: ID<Match>,
        player: ID<Player>,
        bid: Points,
    ) -> Result<Prompt, Invalid> {
        self.playing(game).await?.generate_question(player, bid).await
    }
    pub async fn answer_question(
        &self,
        game: ID<Match>,
        player: ID<Player>,
        question: ID<Question>,
        index: i64,
    ) -> Result<Outcome, Invalid> {
        crate::game::answer(index)?;
        self.playing(game)
            .await?
            .answer_question(player, question, index)
            .await
    }
}

fn rng(seed: Option<u64>, n: u64) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(n)),
        None => SmallRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> MatchConfig {
        MatchConfig {
            duration: 100,
            player_points: 100,
            bank_points_per_player: 500,
            credit_interest: 20,
            theft_time: 0,
            ..MatchConfig::default()
        }
    }

    fn registry(config: MatchConfig) -> Arc<Registry> {
        Arc::new(Registry::new(config, Arc::new(Arithmetic), Some(42)))
    }

    #[tokio::test(start_paused = true)]
    async fn join_start_credit_repay() {
        let registry = registry(config());
        let admission = registry.join("alice".into()).await.unwrap();
        let (alice, m1) = (admission.player, admission.game);
        assert_eq!(admission.roster.bank, 500);
        assert_eq!(admission.config, config());
        assert!(registry.start(m1).await);
        let m2 = registry.waiting().await;
        assert_ne!(m1, m2);
        let verdict = registry.credit(m1, alice, 50).await.unwrap();
        assert!(verdict.success);
        let game = registry.resolve(m1).await.unwrap();
        assert_eq!(game.roster().await.player(alice).unwrap().points, 150);
        assert_eq!(game.roster().await.bank, 450);
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(game.roster().await.player(alice).unwrap().points, 90);
        assert_eq!(game.roster().await.bank, 510);
        assert!(game.audit().await.conserved());
    }

    #[tokio::test]
    async fn leave_only_from_waiting_match() {
        let registry = registry(config());
        let admission = registry.join("alice".into()).await.unwrap();
        let stale = ID::default();
        assert_eq!(
            registry.leave(stale, admission.player).await,
            Err(Invalid::NotWaiting(stale))
        );
        registry.leave(admission.game, admission.player).await.unwrap();
        registry.leave(admission.game, admission.player).await.unwrap();
        let bob = registry.join("bob".into()).await.unwrap();
        assert!(registry.start(bob.game).await);
        assert_eq!(
            registry.leave(bob.game, bob.player).await,
            Err(Invalid::NotWaiting(bob.game))
        );
    }

    #[tokio::test]
    async fn stale_start_is_ignored() {
        let registry = registry(config());
        let waiting = registry.waiting().await;
        assert!(!registry.start(ID::default()).await);
        assert_eq!(registry.waiting().await, waiting);
        assert_eq!(registry.active().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_starts_start_once() {
        let registry = registry(config());
        let waiting = registry.waiting().await;
        let starts = (0..8)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.start(waiting).await })
            })
            .collect::<Vec<_>>();
        let mut started = 0;
        for start in starts {
            if start.await.unwrap() {
                started += 1;
            }
        }
        assert_eq!(started, 1);
        assert_eq!(registry.active().await, 1);
        assert_ne!(registry.waiting().await, waiting);
        assert_eq!(registry.resolve(waiting).await.unwrap().phase().await, Phase::Active);
    }

    #[tokio::test]
    async fn economy_refused_before_start() {
        let registry = registry(config());
        let admission = registry.join("alice".into()).await.unwrap();
        let game = admission.game;
        let alice = admission.player;
        assert_eq!(registry.credit(game, alice, 10).await, Err(Invalid::Inactive(game)));
        assert_eq!(registry.deposit(game, alice, 10).await, Err(Invalid::Inactive(game)));
        assert_eq!(registry.lottery(game, alice, 1).await, Err(Invalid::Inactive(game)));
        assert_eq!(
            registry.generate_question(game, alice, 5).await,
            Err(Invalid::Inactive(game))
        );
    }

    #[tokio::test]
    async fn inputs_validated_before_lookup() {
        let registry = registry(config());
        let game = ID::default();
        let player = ID::default();
        assert_eq!(registry.lottery(game, player, 10).await, Err(Invalid::Cell(10)));
        assert_eq!(
            registry.answer_question(game, player, ID::default(), 0).await,
            Err(Invalid::Answer(0))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timer_finishes_and_closes_streams() {
        let registry = registry(config());
        let admission = registry.join("alice".into()).await.unwrap();
        let mut feed = registry
            .stream(admission.game, admission.player)
            .await
            .unwrap();
        registry.start(admission.game).await;
        tokio::time::sleep(Duration::from_secs(101)).await;
        assert!(registry.resolve(admission.game).await.is_none());
        assert_eq!(
            registry.credit(admission.game, admission.player, 1).await,
            Err(Invalid::Inactive(admission.game))
        );
        assert!(matches!(feed.recv().await, Some(Event::Start { .. })));
        assert!(matches!(feed.recv().await, Some(Event::Finish { .. })));
        assert!(feed.recv().await.is_none());
        assert_eq!(
            registry.stream(admission.game, admission.player).await.err(),
            Some(Invalid::Missing(admission.game))
        );
    }

    #[tokio::test]
    async fn zero_duration_finishes_at_once() {
        let registry = registry(MatchConfig {
            duration: 0,
            ..config()
        });
        let admission = registry.join("alice".into()).await.unwrap();
        assert!(registry.start(admission.game).await);
        assert_eq!(registry.active().await, 0);
        assert_ne!(registry.waiting().await, admission.game);
    }

    #[tokio::test(start_paused = true)]
    async fn money_conserved_through_a_whole_match() {
        let registry = registry(MatchConfig {
            theft_time: 7,
            lottery_time: 20,
            ..config()
        });
        let alice = registry.join("alice".into()).await.unwrap();
        let bob = registry.join("bob".into()).await.unwrap();
        let id = alice.game;
        registry.start(id).await;
        let game = registry.resolve(id).await.unwrap();
        let endowment = game.audit().await.endowment;
        assert_eq!(endowment, 1200);
        registry.credit(id, alice.player, 300).await.unwrap();
        registry.deposit(id, bob.player, 60).await.unwrap();
        tokio::time::sleep(Duration::from_secs(21)).await;
        registry.lottery(id, alice.player, 4).await.unwrap();
        let prompt = registry.generate_question(id, bob.player, 15).await.unwrap();
        registry.answer_question(id, bob.player, prompt.id, 2).await.unwrap();
        registry.generate_question(id, alice.player, 5).await.unwrap();
        assert!(game.audit().await.conserved());
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(game.audit().await.conserved());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(game.is_finished().await);
        let audit = game.audit().await;
        assert!(audit.conserved());
        assert_eq!(audit.endowment, endowment);
        assert_eq!(audit.credit, 0);
        assert_eq!(audit.deposit, 0);
    }

    #[tokio::test]
    async fn shutdown_finishes_everything() {
        let registry = registry(config());
        for _ in 0..3 {
            let admission = registry.join("alice".into()).await.unwrap();
            registry.start(admission.game).await;
        }
        assert_eq!(registry.active().await, 3);
        assert_eq!(registry.shutdown().await, 3);
        assert_eq!(registry.active().await, 0);
    }
}
