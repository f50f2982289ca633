use super::*;
use crate::*;
use serde::Serialize;

/// Balances of everyone in a match, bank included.
/// Every event carries one so clients never keep their own books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roster {
    pub bank: Points,
    pub players: Vec<Standing>,
}

impl Roster {
    pub fn player(&self, id: ID<Player>) -> Option<&Standing> {
        self.players.iter().find(|p| p.id == id)
    }
    pub fn total(&self) -> Points {
        self.bank + self.players.iter().map(|p| p.points).sum::<Points>()
    }
}

/// Events pushed to every attached feed of a match.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Join { player: ID<Player>, roster: Roster },
    Leave { player: ID<Player>, roster: Roster },
    Start { roster: Roster },
    Finish { roster: Roster },
    Transaction { transaction: Transaction, roster: Roster },
}

impl Event {
    pub fn transaction(&self) -> Option<&Transaction> {
        match self {
            Event::Transaction { transaction, .. } => Some(transaction),
            _ => None,
        }
    }
}

/// Money movements inside an active match.
/// Each one is a balanced transfer between players and the bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transaction {
    /// Bank lent `amount` to a player.
    Credit { player: ID<Player>, amount: Points },
    /// Player parked `amount` at the bank.
    Deposit { player: ID<Player>, amount: Points },
    /// A credit came due. `paid` falls short of `owed` when the player is broke.
    Repayment {
        player: ID<Player>,
        owed: Points,
        paid: Points,
    },
    /// A deposit matured. `paid` falls short of `owed` when the bank is broke.
    Maturity {
        player: ID<Player>,
        owed: Points,
        paid: Points,
    },
    /// Points taken from every player and handed back out evenly,
    /// with the indivisible remainder going to `lucky`.
    Theft {
        stolen: Points,
        share: Points,
        lucky: ID<Player>,
        remainder: Points,
    },
    Lottery {
        player: ID<Player>,
        cell: usize,
        win: Points,
    },
    /// Bid escrowed to the bank for a quiz question.
    Bid {
        player: ID<Player>,
        question: ID<Question>,
        bid: Points,
    },
    Answer {
        player: ID<Player>,
        question: ID<Question>,
        correct: bool,
        win: Points,
    },
}

impl Transaction {
    pub fn shortfall(&self) -> Points {
        match self {
            Transaction::Repayment { owed, paid, .. } => owed - paid,
            Transaction::Maturity { owed, paid, .. } => owed - paid,
            _ => 0,
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Event::Join { player, .. } => write!(f, "{} joined", player),
            Event::Leave { player, .. } => write!(f, "{} left", player),
            Event::Start { roster } => write!(f, "started with {} players", roster.players.len()),
            Event::Finish { roster } => write!(f, "finished with bank {}", roster.bank),
            Event::Transaction { transaction, .. } => write!(f, "{}", transaction),
        }
    }
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Transaction::Credit { player, amount } => write!(f, "{} borrows {}", player, amount),
            Transaction::Deposit { player, amount } => write!(f, "{} deposits {}", player, amount),
            Transaction::Repayment { player, owed, paid } => {
                write!(f, "{} repays {} of {}", player, paid, owed)
            }
            Transaction::Maturity { player, owed, paid } => {
                write!(f, "{} withdraws {} of {}", player, paid, owed)
            }
            Transaction::Theft { stolen, share, .. } => {
                write!(f, "thieves take {} and share {} each", stolen, share)
            }
            Transaction::Lottery { player, cell, win } => {
                write!(f, "{} opens cell {} for {}", player, cell, win)
            }
            Transaction::Bid { player, bid, .. } => write!(f, "{} bids {}", player, bid),
            Transaction::Answer {
                player,
                correct: true,
                win,
                ..
            } => write!(f, "{} answers correctly for {}", player, win),
            Transaction::Answer { player, .. } => write!(f, "{} answers wrong", player),
        }
    }
}
