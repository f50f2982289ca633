use super::Admission;
use crate::game::*;
use crate::*;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct LeaveRequest {
    pub player_id: ID<Player>,
    pub match_id: ID<Match>,
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub match_id: ID<Match>,
}

/// Body of both `/credit` and `/deposit`.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub player_id: ID<Player>,
    pub match_id: ID<Match>,
    pub value: Points,
}

#[derive(Debug, Deserialize)]
pub struct LotteryRequest {
    pub player_id: ID<Player>,
    pub match_id: ID<Match>,
    pub cell_index: i64,
}

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub player_id: ID<Player>,
    pub match_id: ID<Match>,
    pub bid_points: Points,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub player_id: ID<Player>,
    pub match_id: ID<Match>,
    pub question_id: ID<Question>,
    pub answer: i64,
}

/// Lobby snapshot plus every tunable, so clients can show countdowns.
#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub player_id: ID<Player>,
    pub match_id: ID<Match>,
    pub bank: Points,
    pub players: Vec<Standing>,
    #[serde(flatten)]
    pub config: MatchConfig,
}

impl From<Admission> for JoinResponse {
    fn from(admission: Admission) -> Self {
        Self {
            player_id: admission.player,
            match_id: admission.game,
            bank: admission.roster.bank,
            players: admission.roster.players,
            config: admission.config,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LotteryResponse {
    pub success: bool,
    pub explanation: String,
    pub cell_values: Vec<Points>,
    pub win_points: Points,
}

impl From<Draw> for LotteryResponse {
    fn from(draw: Draw) -> Self {
        Self {
            success: draw.success,
            explanation: draw.explanation,
            cell_values: draw.cells,
            win_points: draw.win,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub question_id: ID<Question>,
    pub question: String,
    pub answers: [String; QUIZ_ANSWERS],
}

impl From<Prompt> for QuestionResponse {
    fn from(prompt: Prompt) -> Self {
        Self {
            question_id: prompt.id,
            question: prompt.text,
            answers: prompt.answers,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer_is_correct: bool,
    pub correct_answer: usize,
    pub win_points: Points,
}

impl From<Outcome> for AnswerResponse {
    fn from(outcome: Outcome) -> Self {
        Self {
            answer_is_correct: outcome.correct,
            correct_answer: outcome.answer,
            win_points: outcome.win,
        }
    }
}
