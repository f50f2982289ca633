use super::*;
use crate::schedule;
use serde::Serialize;

/// Answer to a credit or deposit request.
/// A refusal here means the request was fine but the books could not cover it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub success: bool,
    pub explanation: String,
}

impl Verdict {
    pub fn granted() -> Self {
        Self {
            success: true,
            explanation: String::new(),
        }
    }
    pub fn denied(explanation: impl Into<String>) -> Self {
        Self {
            success: false,
            explanation: explanation.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lending {
    /// Bank → player now, player → bank with interest later.
    Credit,
    /// Player → bank now, bank → player with interest later.
    Deposit,
}

/// A credit or deposit waiting to mature.
/// Settled exactly once, by its timer or by the end of the match.
#[derive(Debug, Clone, Copy)]
pub struct Loan {
    owner: ID<Player>,
    kind: Lending,
    principal: Points,
}

/// Principal plus interest, rounded down. Saturates instead of overflowing.
pub fn accrue(principal: Points, interest: Percent) -> Points {
    principal.saturating_mul(interest.saturating_add(100)) / 100
}

fn positive(amount: Points) -> Result<Points, Invalid> {
    match amount > 0 {
        true => Ok(amount),
        false => Err(Invalid::Amount(amount)),
    }
}

impl Match {
    /// Lends points from the bank and schedules their repayment with interest.
    pub async fn credit(
        self: &Arc<Self>,
        player: ID<Player>,
        amount: Points,
    ) -> Result<Verdict, Invalid> {
        let loan = {
            let mut state = self.state.write().await;
            state.phase.require(Phase::Active, "take credit")?;
            positive(amount)?;
            state.player(player)?;
            if state.bank < amount {
                return Ok(Verdict::denied(format!(
                    "bank has only {} points left, {} requested",
                    state.bank, amount
                )));
            }
            state.bank -= amount;
            let borrower = state.player_mut(player)?;
            borrower.earn(amount);
            borrower.borrow(amount);
            let loan = state.open(player, Lending::Credit, amount);
            state.transact(Transaction::Credit { player, amount });
            loan
        };
        self.settle_after(loan, self.config.credit_time());
        Ok(Verdict::granted())
    }
    /// Parks points at the bank and schedules their return with interest.
    pub async fn deposit(
        self: &Arc<Self>,
        player: ID<Player>,
        amount: Points,
    ) -> Result<Verdict, Invalid> {
        let loan = {
            let mut state = self.state.write().await;
            state.phase.require(Phase::Active, "deposit")?;
            positive(amount)?;
            let points = state.player(player)?.points();
            if points < amount {
                return Ok(Verdict::denied(format!(
                    "player has only {} points, {} requested",
                    points, amount
                )));
            }
            let saver = state.player_mut(player)?;
            saver.spend(amount);
            saver.save(amount);
            state.bank += amount;
            let loan = state.open(player, Lending::Deposit, amount);
            state.transact(Transaction::Deposit { player, amount });
            loan
        };
        self.settle_after(loan, self.config.deposit_time());
        Ok(Verdict::granted())
    }
    /// Maturity callback. Loans still open at finish were already settled there.
    pub(crate) async fn mature(&self, loan: ID<Loan>) {
        let mut state = self.state.write().await;
        if state.phase != Phase::Active {
            log::debug!("[match {}] loan {} outlived the match", self.id, loan);
            return;
        }
        if let Some(transaction) = state.settle(loan, &self.config) {
            state.transact(transaction);
        }
    }
    fn settle_after(self: &Arc<Self>, loan: ID<Loan>, delay: Duration) {
        let game = Arc::clone(self);
        schedule::after(delay, async move { game.mature(loan).await });
    }
}

impl State {
    fn open(&mut self, owner: ID<Player>, kind: Lending, principal: Points) -> ID<Loan> {
        let id = ID::default();
        self.loans.insert(
            id,
            Loan {
                owner,
                kind,
                principal,
            },
        );
        id
    }
    /// Closes a loan, moving principal plus interest between owner and bank.
    /// The payer can never be driven below zero: what cannot be covered is
    /// reported as a shortfall instead.
    pub(super) fn settle(&mut self, id: ID<Loan>, config: &MatchConfig) -> Option<Transaction> {
        let loan = self.loans.remove(&id)?;
        let player = loan.owner;
        let transaction = match loan.kind {
            Lending::Credit => {
                let owed = accrue(loan.principal, config.credit_interest);
                let debtor = self.player_mut(player).ok()?;
                let paid = debtor.spend(owed);
                debtor.repaid(loan.principal);
                self.bank += paid;
                Transaction::Repayment { player, owed, paid }
            }
            Lending::Deposit => {
                let owed = accrue(loan.principal, config.deposit_interest);
                let paid = owed.min(self.bank);
                let saver = self.player_mut(player).ok()?;
                saver.earn(paid);
                saver.withdrawn(loan.principal);
                self.bank -= paid;
                Transaction::Maturity { player, owed, paid }
            }
        };
        if transaction.shortfall() > 0 {
            log::warn!("shortfall of {} settling {}", transaction.shortfall(), transaction);
        }
        Some(transaction)
    }
}
