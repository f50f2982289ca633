use super::*;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

/// Result of a lottery play. On success all nine cells are revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draw {
    pub success: bool,
    pub explanation: String,
    pub cells: Vec<Points>,
    pub win: Points,
}

impl Draw {
    fn refused(explanation: impl Into<String>) -> Self {
        Self {
            success: false,
            explanation: explanation.into(),
            cells: Vec::new(),
            win: 0,
        }
    }
}

/// Shuffled payout ladder: `max_win × k / 8` for k in 0..=8.
pub fn board<R>(max_win: Points, rng: &mut R) -> Vec<Points>
where
    R: Rng + ?Sized,
{
    let steps = LOTTERY_CELLS as Points - 1;
    let mut cells = (0..=steps)
        .map(|k| max_win.saturating_mul(k) / steps)
        .collect::<Vec<_>>();
    cells.shuffle(rng);
    cells
}

/// Validates a 1-based cell index.
pub fn cell(index: i64) -> Result<usize, Invalid> {
    usize::try_from(index)
        .ok()
        .filter(|i| (1..=LOTTERY_CELLS).contains(i))
        .ok_or(Invalid::Cell(index))
}

impl Match {
    /// Opens one cell of a freshly shuffled board, paid out by the bank.
    /// Each player gets one play, and only once the lottery has opened.
    pub async fn lottery(&self, player: ID<Player>, index: i64) -> Result<Draw, Invalid> {
        let index = cell(index)?;
        let mut state = self.state.write().await;
        state.phase.require(Phase::Active, "play the lottery")?;
        if state.player(player)?.played_lottery() {
            return Ok(Draw::refused("player already played the lottery"));
        }
        let opens = self.config.lottery_time();
        let elapsed = state.elapsed();
        if elapsed < opens {
            return Ok(Draw::refused(format!(
                "lottery opens in {} seconds",
                (opens - elapsed).as_secs_f32().ceil()
            )));
        }
        let cells = board(self.config.lottery_max_win, &mut state.rng);
        let prize = cells[index - 1];
        let win = prize.min(state.bank);
        if win < prize {
            log::warn!("[match {}] bank covers only {} of lottery prize {}", self.id, win, prize);
        }
        state.bank -= win;
        let winner = state.player_mut(player)?;
        winner.earn(win);
        winner.play_lottery();
        state.transact(Transaction::Lottery {
            player,
            cell: index,
            win,
        });
        Ok(Draw {
            success: true,
            explanation: String::new(),
            cells,
            win,
        })
    }
}
