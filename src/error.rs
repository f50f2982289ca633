use crate::game::Match;
use crate::game::Phase;
use crate::game::Question;
use crate::*;

/// Structural problems with a request.
///
/// These are never retried: the caller named something that does not exist,
/// sent a value outside its domain, or asked for an action the match's
/// current phase does not allow. Business-rule refusals (an empty bank, a
/// lottery that has not opened yet) are not errors and travel in normal
/// responses instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Invalid {
    #[error("there is no active match with id {0}")]
    Inactive(ID<Match>),
    #[error("match with id {0} doesn't exist or has already started")]
    NotWaiting(ID<Match>),
    #[error("match with id {0} doesn't exist or is finished")]
    Missing(ID<Match>),
    #[error("player with id {0} is not part of this match")]
    Stranger(ID<Player>),
    #[error("unknown or already-answered question {0}")]
    Question(ID<Question>),
    #[error("question {0} was asked by another player")]
    Foreign(ID<Question>),
    #[error("cannot {action} while the match is {phase}")]
    Phase { action: &'static str, phase: Phase },
    #[error("requested value has to be positive (received: {0})")]
    Amount(Points),
    #[error("cell index has to be from 1 to {max}, received: {0}", max = LOTTERY_CELLS)]
    Cell(i64),
    #[error("answer has to be from 1 to {max}, received: {0}", max = QUIZ_ANSWERS)]
    Answer(i64),
    #[error("bid of {bid} exceeds balance of {points}")]
    Overbid { bid: Points, points: Points },
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn explanations_name_the_offending_value() {
        assert_eq!(
            Invalid::Amount(-3).to_string(),
            "requested value has to be positive (received: -3)"
        );
        assert_eq!(
            Invalid::Cell(10).to_string(),
            "cell index has to be from 1 to 9, received: 10"
        );
        assert_eq!(
            Invalid::Phase {
                action: "take credit",
                phase: Phase::Waiting
            }
            .to_string(),
            "cannot take credit while the match is waiting"
        );
    }
}
