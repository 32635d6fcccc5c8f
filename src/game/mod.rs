//! Headless game core: catalog, deck and the turn state machine.

pub mod catalog;
pub mod controller;
pub mod deck;

pub use catalog::{AchievementRecord, Catalog};
pub use controller::{
    ClockToken, CompletionSummary, Deferred, GameController, HintReveal, HintToken, IgnoreReason,
    MatchReport, Phase, SelectOutcome, TickOutcome, TurnToken,
};
pub use deck::{CardInstance, Deck, InstanceId, Variant};
