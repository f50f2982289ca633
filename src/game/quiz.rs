use super::*;
use rand::Rng;
use rand::RngCore;
use rand::seq::SliceRandom;
use serde::Serialize;

/// A question with its candidate answers, as produced by a [`Quizmaster`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trivia {
    pub text: String,
    pub answers: [String; QUIZ_ANSWERS],
    /// 0-based index into `answers`.
    pub correct: usize,
}

/// Source of quiz content.
pub trait Quizmaster: Send + Sync {
    fn ask(&self, rng: &mut dyn RngCore) -> Trivia;
}

/// Mental arithmetic with near-miss distractors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Arithmetic;

impl Quizmaster for Arithmetic {
    fn ask(&self, rng: &mut dyn RngCore) -> Trivia {
        let a: Points = rng.random_range(10..100);
        let b: Points = rng.random_range(10..100);
        let (text, answer) = match rng.random_range(0..3) {
            0 => (format!("What is {} + {}?", a, b), a + b),
            1 => (format!("What is {} - {}?", a + b, b), a),
            _ => {
                let (a, b) = (a % 11 + 2, b % 11 + 2);
                (format!("What is {} × {}?", a, b), a * b)
            }
        };
        let mut options = vec![answer];
        while options.len() < QUIZ_ANSWERS {
            let offset: Points = rng.random_range(1..=10);
            let guess = match rng.random_bool(0.5) {
                true => answer + offset,
                false => answer - offset,
            };
            if guess >= 0 && !options.contains(&guess) {
                options.push(guess);
            }
        }
        options.shuffle(rng);
        let correct = options
            .iter()
            .position(|o| *o == answer)
            .unwrap_or_default();
        Trivia {
            text,
            answers: std::array::from_fn(|i| options[i].to_string()),
            correct,
        }
    }
}

/// An outstanding question. The bid is already in the bank.
#[derive(Debug, Clone)]
pub struct Question {
    owner: ID<Player>,
    bid: Points,
    trivia: Trivia,
}

/// What the asking player gets to see: never the correct index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub id: ID<Question>,
    pub text: String,
    pub answers: [String; QUIZ_ANSWERS],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub correct: bool,
    /// 1-based index of the right answer.
    pub answer: usize,
    pub win: Points,
}

/// Validates a 1-based answer index.
pub fn answer(index: i64) -> Result<usize, Invalid> {
    usize::try_from(index)
        .ok()
        .filter(|i| (1..=QUIZ_ANSWERS).contains(i))
        .ok_or(Invalid::Answer(index))
}

impl Match {
    /// Escrows the bid and hands out a fresh question.
    /// The bid stays with the bank whether or not the question is answered.
    pub async fn generate_question(
        &self,
        player: ID<Player>,
        bid: Points,
    ) -> Result<Prompt, Invalid> {
        if bid <= 0 {
            return Err(Invalid::Amount(bid));
        }
        let mut state = self.state.write().await;
        state.phase.require(Phase::Active, "bid on a question")?;
        let points = state.player(player)?.points();
        if points < bid {
            return Err(Invalid::Overbid { bid, points });
        }
        let trivia = self.quizmaster.ask(&mut state.rng);
        let id = ID::default();
        state.player_mut(player)?.spend(bid);
        state.bank += bid;
        let prompt = Prompt {
            id,
            text: trivia.text.clone(),
            answers: trivia.answers.clone(),
        };
        state.questions.insert(
            id,
            Question {
                owner: player,
                bid,
                trivia,
            },
        );
        state.transact(Transaction::Bid {
            player,
            question: id,
            bid,
        });
        Ok(prompt)
    }
    /// Resolves a question. A right answer pays a percentage of the bid
    /// out of the bank; a wrong one pays nothing. No second attempts.
    pub async fn answer_question(
        &self,
        player: ID<Player>,
        question: ID<Question>,
        index: i64,
    ) -> Result<Outcome, Invalid> {
        let index = answer(index)?;
        let mut state = self.state.write().await;
        state.phase.require(Phase::Active, "answer a question")?;
        state.player(player)?;
        match state.questions.get(&question) {
            None => return Err(Invalid::Question(question)),
            Some(asked) if asked.owner != player => return Err(Invalid::Foreign(question)),
            Some(_) => {}
        }
        let asked = state
            .questions
            .remove(&question)
            .ok_or(Invalid::Question(question))?;
        let correct = asked.trivia.correct + 1 == index;
        let win = match correct {
            true => {
                let win = asked.bid.saturating_mul(self.config.question_win_percentage) / 100;
                win.min(state.bank)
            }
            false => 0,
        };
        state.bank -= win;
        state.player_mut(player)?.earn(win);
        state.transact(Transaction::Answer {
            player,
            question,
            correct,
            win,
        });
        Ok(Outcome {
            correct,
            answer: asked.trivia.correct + 1,
            win,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::game;
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn config() -> MatchConfig {
        MatchConfig {
            theft_time: 0,
            ..MatchConfig::default()
        }
    }

    /// Always asks the same question, answer 3.
    struct Fixed;
    impl Quizmaster for Fixed {
        fn ask(&self, _: &mut dyn RngCore) -> Trivia {
            Trivia {
                text: "What is 2 + 2?".into(),
                answers: ["1".into(), "2".into(), "4".into(), "5".into()],
                correct: 2,
            }
        }
    }

    fn fixed() -> Arc<Match> {
        Arc::new(Match::new(config(), Arc::new(Fixed), SmallRng::seed_from_u64(3)))
    }

    #[test]
    fn arithmetic_marks_the_right_answer() {
        let ref mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..64 {
            let trivia = Arithmetic.ask(rng);
            let mut answers = trivia.answers.to_vec();
            answers.sort();
            answers.dedup();
            assert_eq!(answers.len(), QUIZ_ANSWERS);
            assert!(trivia.correct < QUIZ_ANSWERS);
            let (lhs, _) = trivia.text.split_once('?').unwrap();
            assert!(lhs.starts_with("What is "));
        }
    }

    #[tokio::test]
    async fn bid_is_escrowed_and_wrong_answer_forfeits() {
        let game = fixed();
        let (alice, _) = game.join("alice".into()).await.unwrap();
        game.start().await;
        let prompt = game.generate_question(alice, 20).await.unwrap();
        assert_eq!(prompt.answers[2], "4");
        let roster = game.roster().await;
        assert_eq!(roster.player(alice).unwrap().points, 80);
        assert_eq!(roster.bank, 520);
        let outcome = game.answer_question(alice, prompt.id, 1).await.unwrap();
        assert_eq!(
            outcome,
            Outcome {
                correct: false,
                answer: 3,
                win: 0
            }
        );
        assert_eq!(game.roster().await.bank, 520);
        assert!(game.audit().await.conserved());
    }

    #[tokio::test]
    async fn right_answer_pays_percentage_of_bid() {
        let game = fixed();
        let (alice, _) = game.join("alice".into()).await.unwrap();
        game.start().await;
        let prompt = game.generate_question(alice, 20).await.unwrap();
        let outcome = game.answer_question(alice, prompt.id, 3).await.unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.win, 40);
        let roster = game.roster().await;
        assert_eq!(roster.player(alice).unwrap().points, 120);
        assert_eq!(roster.bank, 480);
        assert!(game.audit().await.conserved());
    }

    #[tokio::test]
    async fn questions_answered_once() {
        let game = fixed();
        let (alice, _) = game.join("alice".into()).await.unwrap();
        game.start().await;
        let prompt = game.generate_question(alice, 10).await.unwrap();
        game.answer_question(alice, prompt.id, 3).await.unwrap();
        assert_eq!(
            game.answer_question(alice, prompt.id, 3).await,
            Err(Invalid::Question(prompt.id))
        );
    }

    #[tokio::test]
    async fn questions_belong_to_their_asker() {
        let game = fixed();
        let (alice, _) = game.join("alice".into()).await.unwrap();
        let (bob, _) = game.join("bob".into()).await.unwrap();
        game.start().await;
        let prompt = game.generate_question(alice, 10).await.unwrap();
        assert_eq!(
            game.answer_question(bob, prompt.id, 3).await,
            Err(Invalid::Foreign(prompt.id))
        );
        assert!(game.answer_question(alice, prompt.id, 3).await.is_ok());
    }

    #[tokio::test]
    async fn quiz_closed_outside_active_match() {
        let game = fixed();
        let (alice, _) = game.join("alice".into()).await.unwrap();
        assert!(matches!(
            game.generate_question(alice, 10).await,
            Err(Invalid::Phase { phase: Phase::Waiting, .. })
        ));
        assert!(matches!(
            game.answer_question(alice, ID::default(), 1).await,
            Err(Invalid::Phase { phase: Phase::Waiting, .. })
        ));
        game.start().await;
        let prompt = game.generate_question(alice, 10).await.unwrap();
        game.finish().await;
        assert!(matches!(
            game.answer_question(alice, prompt.id, 3).await,
            Err(Invalid::Phase { phase: Phase::Finished, .. })
        ));
        assert_eq!(game.roster().await.player(alice).unwrap().points, 90);
        assert!(game.audit().await.conserved());
    }

    #[tokio::test]
    async fn bids_are_validated() {
        let game = game(config());
        let (alice, _) = game.join("alice".into()).await.unwrap();
        game.start().await;
        assert_eq!(game.generate_question(alice, 0).await, Err(Invalid::Amount(0)));
        assert_eq!(
            game.generate_question(alice, 101).await,
            Err(Invalid::Overbid {
                bid: 101,
                points: 100
            })
        );
        let prompt = game.generate_question(alice, 10).await.unwrap();
        assert_eq!(
            game.answer_question(alice, prompt.id, 5).await,
            Err(Invalid::Answer(5))
        );
    }
}
