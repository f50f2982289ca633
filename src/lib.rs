//! Session server for a timed, money-based party game.
//!
//! Players join a lobby, one of them starts the match, and for a fixed
//! duration everybody borrows, saves, gambles and bids against a shared bank.
//! Every move inside a match is a balanced transfer, so the total amount of
//! money in a match never changes.
//!
//! ## Architecture
//!
//! - [`player`]: Per-participant balances and liabilities
//! - [`game`]: The [`game::Match`] state machine, its economy and event feed
//! - [`hosting`]: Session registry, lifecycle timers and the HTTP/WebSocket surface
//! - [`schedule`]: Deferred and periodic callbacks
//! - [`config`]: Match tunables and command line arguments
//! - [`error`]: Structural request errors
pub mod config;
pub mod error;
pub mod game;
pub mod hosting;
pub mod player;
pub mod schedule;

pub use config::*;
pub use error::*;
pub use player::*;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Balances, bids, payouts and interest amounts.
pub type Points = i64;
/// Interest rates and percentages, in whole percent.
pub type Percent = i64;
/// Timer lengths in whole seconds.
pub type Seconds = u64;

// ============================================================================
// GAME PARAMETERS
// ============================================================================
/// Number of cells on the lottery board.
pub const LOTTERY_CELLS: usize = 9;
/// Number of candidate answers per quiz question.
pub const QUIZ_ANSWERS: usize = 4;

/// Upper bounds accepted for tunables, far below where arithmetic overflows.
pub const MAX_PERCENT: Percent = 10_000;
pub const MAX_POINTS: Points = 1_000_000_000;
pub const MAX_SECONDS: Seconds = 7 * 24 * 60 * 60;

pub const DEFAULT_DURATION: Seconds = 300;
pub const DEFAULT_PLAYER_POINTS: Points = 100;
pub const DEFAULT_BANK_POINTS_PER_PLAYER: Points = 500;
pub const DEFAULT_CREDIT_INTEREST: Percent = 20;
pub const DEFAULT_DEPOSIT_INTEREST: Percent = 10;
pub const DEFAULT_CREDIT_TIME: Seconds = 30;
pub const DEFAULT_DEPOSIT_TIME: Seconds = 30;
pub const DEFAULT_THEFT_TIME: Seconds = 60;
pub const DEFAULT_THEFT_PERCENTAGE: Percent = 10;
pub const DEFAULT_LOTTERY_TIME: Seconds = 120;
pub const DEFAULT_LOTTERY_MAX_WIN: Points = 400;
pub const DEFAULT_QUESTION_WIN_PERCENTAGE: Percent = 200;

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::marker::PhantomData;

/// Anything addressed by a typed [`ID`].
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

/// Time-ordered uuid tagged with what it identifies, so a player id can never
/// be passed where a match id is expected. Never reused within a process.
/// Serializes as the bare uuid string.
pub struct ID<T>(uuid::Uuid, PhantomData<fn() -> T>);

impl<T> Default for ID<T> {
    fn default() -> Self {
        uuid::Uuid::now_v7().into()
    }
}

impl<T> From<uuid::Uuid> for ID<T> {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid, PhantomData)
    }
}

impl<T> std::str::FromStr for ID<T> {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<uuid::Uuid>().map(Self::from)
    }
}

// Hand-written so `T` itself needs no bounds.
impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<T> Eq for ID<T> {}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}
impl<T> std::hash::Hash for ID<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(&self.0, state)
    }
}

impl<T> std::fmt::Debug for ID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ID({})", self.0)
    }
}
impl<T> std::fmt::Display for ID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl<T> serde::Serialize for ID<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.0, serializer)
    }
}
impl<'de, T> serde::Deserialize<'de> for ID<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <uuid::Uuid as serde::Deserialize>::deserialize(deserializer).map(Self::from)
    }
}

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() -> anyhow::Result<()> {
    std::fs::create_dir_all("logs")?;
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time))?,
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file])?;
    Ok(())
}
