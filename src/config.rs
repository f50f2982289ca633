use crate::*;
use serde::Serialize;
use std::time::Duration;

/// Tunables of a single match.
/// Copied into every match when it is created and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::Args)]
pub struct MatchConfig {
    /// Length of an active match.
    #[arg(long, default_value_t = DEFAULT_DURATION)]
    pub duration: Seconds,
    /// Points every player starts with.
    #[arg(long, default_value_t = DEFAULT_PLAYER_POINTS)]
    pub player_points: Points,
    /// Points each joining player adds to the bank.
    #[arg(long, default_value_t = DEFAULT_BANK_POINTS_PER_PLAYER)]
    pub bank_points_per_player: Points,
    #[arg(long, default_value_t = DEFAULT_CREDIT_INTEREST)]
    pub credit_interest: Percent,
    #[arg(long, default_value_t = DEFAULT_DEPOSIT_INTEREST)]
    pub deposit_interest: Percent,
    /// Time until a credit is repaid.
    #[arg(long, default_value_t = DEFAULT_CREDIT_TIME)]
    pub credit_time: Seconds,
    /// Time until a deposit matures.
    #[arg(long, default_value_t = DEFAULT_DEPOSIT_TIME)]
    pub deposit_time: Seconds,
    /// Interval between thefts. Zero disables theft.
    #[arg(long, default_value_t = DEFAULT_THEFT_TIME)]
    pub theft_time: Seconds,
    #[arg(long, default_value_t = DEFAULT_THEFT_PERCENTAGE)]
    pub theft_percentage: Percent,
    /// Time after start before the lottery opens.
    #[arg(long, default_value_t = DEFAULT_LOTTERY_TIME)]
    pub lottery_time: Seconds,
    #[arg(long, default_value_t = DEFAULT_LOTTERY_MAX_WIN)]
    pub lottery_max_win: Points,
    /// Payout of a correct quiz answer relative to the bid.
    #[arg(long, default_value_t = DEFAULT_QUESTION_WIN_PERCENTAGE)]
    pub question_win_percentage: Percent,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            player_points: DEFAULT_PLAYER_POINTS,
            bank_points_per_player: DEFAULT_BANK_POINTS_PER_PLAYER,
            credit_interest: DEFAULT_CREDIT_INTEREST,
            deposit_interest: DEFAULT_DEPOSIT_INTEREST,
            credit_time: DEFAULT_CREDIT_TIME,
            deposit_time: DEFAULT_DEPOSIT_TIME,
            theft_time: DEFAULT_THEFT_TIME,
            theft_percentage: DEFAULT_THEFT_PERCENTAGE,
            lottery_time: DEFAULT_LOTTERY_TIME,
            lottery_max_win: DEFAULT_LOTTERY_MAX_WIN,
            question_win_percentage: DEFAULT_QUESTION_WIN_PERCENTAGE,
        }
    }
}

impl MatchConfig {
    /// Rejects configurations that cannot produce a playable match.
    pub fn validate(&self) -> anyhow::Result<()> {
        let amounts = [
            ("player-points", self.player_points),
            ("bank-points-per-player", self.bank_points_per_player),
            ("credit-interest", self.credit_interest),
            ("deposit-interest", self.deposit_interest),
            ("theft-percentage", self.theft_percentage),
            ("lottery-max-win", self.lottery_max_win),
            ("question-win-percentage", self.question_win_percentage),
        ];
        if let Some((name, value)) = amounts.iter().find(|(_, v)| *v < 0) {
            anyhow::bail!("{} must be non-negative (received: {})", name, value);
        }
        let percents = [
            ("credit-interest", self.credit_interest),
            ("deposit-interest", self.deposit_interest),
            ("question-win-percentage", self.question_win_percentage),
        ];
        if let Some((name, value)) = percents.iter().find(|(_, v)| *v > MAX_PERCENT) {
            anyhow::bail!("{} cannot exceed {} (received: {})", name, MAX_PERCENT, value);
        }
        let points = [
            ("player-points", self.player_points),
            ("bank-points-per-player", self.bank_points_per_player),
            ("lottery-max-win", self.lottery_max_win),
        ];
        if let Some((name, value)) = points.iter().find(|(_, v)| *v > MAX_POINTS) {
            anyhow::bail!("{} cannot exceed {} (received: {})", name, MAX_POINTS, value);
        }
        let times = [
            ("duration", self.duration),
            ("credit-time", self.credit_time),
            ("deposit-time", self.deposit_time),
            ("theft-time", self.theft_time),
            ("lottery-time", self.lottery_time),
        ];
        if let Some((name, value)) = times.iter().find(|(_, v)| *v > MAX_SECONDS) {
            anyhow::bail!("{} cannot exceed {}s (received: {})", name, MAX_SECONDS, value);
        }
        if self.duration == 0 {
            anyhow::bail!("duration must be positive");
        }
        if self.theft_percentage > 100 {
            anyhow::bail!(
                "theft-percentage cannot exceed 100 (received: {})",
                self.theft_percentage
            );
        }
        Ok(())
    }
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration)
    }
    pub fn credit_time(&self) -> Duration {
        Duration::from_secs(self.credit_time)
    }
    pub fn deposit_time(&self) -> Duration {
        Duration::from_secs(self.deposit_time)
    }
    /// None when theft is disabled.
    pub fn theft_time(&self) -> Option<Duration> {
        Some(self.theft_time)
            .filter(|t| *t > 0)
            .map(Duration::from_secs)
    }
    pub fn lottery_time(&self) -> Duration {
        Duration::from_secs(self.lottery_time)
    }
}

/// Command line arguments of the server binary.
#[derive(Debug, clap::Parser)]
#[command(name = "bankgame", about = "Session server for the bank party game")]
pub struct Args {
    /// Address the HTTP server listens on.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8888")]
    pub bind: String,
    #[arg(long, default_value_t = 4)]
    pub workers: usize,
    /// Seed for lotteries, thefts and quiz questions.
    #[arg(long)]
    pub seed: Option<u64>,
    #[command(flatten)]
    pub game: MatchConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    #[test]
    fn defaults_are_valid() {
        assert!(MatchConfig::default().validate().is_ok());
    }
    #[test]
    fn cli_defaults_match_config_defaults() {
        let args = Args::parse_from(["bankgame"]);
        assert_eq!(args.game, MatchConfig::default());
        assert_eq!(args.seed, None);
    }
    #[test]
    fn cli_overrides() {
        let args = Args::parse_from(["bankgame", "--duration", "60", "--theft-time", "0"]);
        assert_eq!(args.game.duration, 60);
        assert_eq!(args.game.theft_time(), None);
    }
    #[test]
    fn rejects_zero_duration() {
        let config = MatchConfig {
            duration: 0,
            ..MatchConfig::default()
        };
        assert!(config.validate().is_err());
    }
    #[test]
    fn rejects_negative_amounts() {
        let config = MatchConfig {
            credit_interest: -5,
            ..MatchConfig::default()
        };
        assert!(config.validate().is_err());
    }
    #[test]
    fn rejects_values_that_would_overflow() {
        let huge = [
            MatchConfig {
                credit_interest: Percent::MAX,
                ..MatchConfig::default()
            },
            MatchConfig {
                question_win_percentage: MAX_PERCENT + 1,
                ..MatchConfig::default()
            },
            MatchConfig {
                lottery_max_win: Points::MAX,
                ..MatchConfig::default()
            },
            MatchConfig {
                deposit_time: Seconds::MAX,
                ..MatchConfig::default()
            },
            MatchConfig {
                theft_time: MAX_SECONDS + 1,
                ..MatchConfig::default()
            },
        ];
        for config in huge {
            assert!(config.validate().is_err(), "{:?}", config);
        }
        let edge = MatchConfig {
            credit_interest: MAX_PERCENT,
            lottery_max_win: MAX_POINTS,
            duration: MAX_SECONDS,
            ..MatchConfig::default()
        };
        assert!(edge.validate().is_ok());
    }
    #[test]
    fn rejects_theft_over_everything() {
        let config = MatchConfig {
            theft_percentage: 101,
            ..MatchConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
