use crate::*;
use serde::Serialize;

/// Economic state of one participant.
/// Owned by exactly one match.
#[derive(Debug, Clone)]
pub struct Player {
    id: ID<Self>,
    username: String,
    points: Points,
    credit: Points,
    deposit: Points,
    lottery: bool,
}

impl Player {
    pub fn new(username: String, points: Points) -> Self {
        Self {
            id: ID::default(),
            username,
            points,
            credit: 0,
            deposit: 0,
            lottery: false,
        }
    }
    pub fn username(&self) -> &str {
        &self.username
    }
    pub fn points(&self) -> Points {
        self.points
    }
    /// Outstanding credit principal.
    pub fn credit(&self) -> Points {
        self.credit
    }
    /// Outstanding deposit principal.
    pub fn deposit(&self) -> Points {
        self.deposit
    }
    pub fn played_lottery(&self) -> bool {
        self.lottery
    }
    pub fn standing(&self) -> Standing {
        Standing {
            id: self.id,
            username: self.username.clone(),
            points: self.points,
            credit: self.credit,
            deposit: self.deposit,
        }
    }
}

impl Player {
    /// Adds points. Every call is paired with a debit elsewhere.
    pub(crate) fn earn(&mut self, amount: Points) {
        self.points += amount;
    }
    /// Removes up to `amount` points and returns how many were actually taken.
    pub(crate) fn spend(&mut self, amount: Points) -> Points {
        let taken = amount.clamp(0, self.points);
        self.points -= taken;
        taken
    }
    pub(crate) fn borrow(&mut self, principal: Points) {
        self.credit += principal;
    }
    pub(crate) fn repaid(&mut self, principal: Points) {
        self.credit -= principal;
    }
    pub(crate) fn save(&mut self, principal: Points) {
        self.deposit += principal;
    }
    pub(crate) fn withdrawn(&mut self, principal: Points) {
        self.deposit -= principal;
    }
    pub(crate) fn play_lottery(&mut self) {
        self.lottery = true;
    }
}

impl Unique for Player {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

/// Public view of a player, as shown in lobbies and event feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub id: ID<Player>,
    pub username: String,
    pub points: Points,
    pub credit: Points,
    pub deposit: Points,
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn spend_never_overdraws() {
        let mut player = Player::new("alice".into(), 30);
        assert_eq!(player.spend(50), 30);
        assert_eq!(player.points(), 0);
    }
    #[test]
    fn spend_ignores_negative_amounts() {
        let mut player = Player::new("bob".into(), 30);
        assert_eq!(player.spend(-5), 0);
        assert_eq!(player.points(), 30);
    }
    #[test]
    fn liabilities_track_principal() {
        let mut player = Player::new("carol".into(), 100);
        player.borrow(40);
        player.save(10);
        player.repaid(40);
        assert_eq!(player.credit(), 0);
        assert_eq!(player.deposit(), 10);
        player.withdrawn(10);
        assert_eq!(player.deposit(), 0);
    }
}
