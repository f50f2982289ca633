use super::*;
use rand::Rng;

impl Match {
    /// One theft tick. Returns false once the match is no longer active,
    /// which stops the ticker.
    pub(crate) async fn steal(&self) -> bool {
        let mut state = self.state.write().await;
        if state.phase != Phase::Active {
            return false;
        }
        if let Some(transaction) = state.steal(self.config.theft_percentage) {
            state.transact(transaction);
        }
        true
    }
}

impl State {
    /// Takes a percentage of every balance and splits the haul evenly.
    /// The indivisible remainder goes to one random player, so the bank
    /// never takes part and the total stays put.
    fn steal(&mut self, percentage: Percent) -> Option<Transaction> {
        let count = self.players.len();
        if count == 0 {
            return None;
        }
        let stolen = self
            .players
            .iter_mut()
            .map(|p| {
                let cut = p.points().saturating_mul(percentage) / 100;
                p.spend(cut)
            })
            .sum::<Points>();
        if stolen == 0 {
            return None;
        }
        let share = stolen / count as Points;
        let remainder = stolen % count as Points;
        self.players.iter_mut().for_each(|p| p.earn(share));
        let index = self.rng.random_range(0..count);
        let lucky = &mut self.players[index];
        lucky.earn(remainder);
        Some(Transaction::Theft {
            stolen,
            share,
            lucky: lucky.id(),
            remainder,
        })
    }
}
