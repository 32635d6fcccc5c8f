use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::catalog::{AchievementRecord, Catalog};
use super::deck::{CardInstance, Deck, InstanceAllocator, InstanceId};
use crate::config::GameConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FirstSelected,
    Evaluating,
    Hinting,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    InputLocked,
    Finished,
    UnknownCard,
    AlreadyFaceUp,
    AlreadyMatched,
}

/// Identifies one pending mismatch flip-back. Only the most recent token of the
/// current game is accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnToken {
    game_id: u64,
    seq: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HintToken {
    game_id: u64,
    seq: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockToken {
    game_id: u64,
}

impl TurnToken {
    pub fn game_id(self) -> u64 {
        self.game_id
    }
}

impl HintToken {
    pub fn game_id(self) -> u64 {
        self.game_id
    }
}

impl ClockToken {
    pub fn game_id(self) -> u64 {
        self.game_id
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deferred<T> {
    pub token: T,
    pub delay: Duration,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchReport {
    pub source_id: u32,
    pub details: String,
    /// True only for the match that closes the last outstanding pair.
    pub finished: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    Ignored(IgnoreReason),
    FirstFlipped(InstanceId),
    Matched(MatchReport),
    Mismatched(Deferred<TurnToken>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HintReveal {
    pub pair: [InstanceId; 2],
    pub token: HintToken,
    pub delay: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Stop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletionSummary {
    pub elapsed_secs: u32,
    pub moves: u32,
    pub score: u32,
}

#[derive(Clone, Debug, Default)]
struct TurnState {
    first: Option<InstanceId>,
    second: Option<InstanceId>,
    disabled: bool,
}

impl TurnState {
    fn clear(&mut self) {
        self.first = None;
        self.second = None;
        self.disabled = false;
    }
}

pub struct GameController {
    catalog: Rc<Catalog>,
    config: GameConfig,
    rng: StdRng,
    ids: InstanceAllocator,
    deck: Deck,
    turn: TurnState,
    matched: BTreeSet<u32>,
    score: u32,
    moves: u32,
    elapsed_secs: u32,
    game_id: u64,
    seq: u64,
    pending_mismatch: Option<TurnToken>,
    pending_hint: Option<(HintToken, [InstanceId; 2])>,
    hint_used: bool,
    finished: bool,
    clock_running: bool,
    match_details: Option<String>,
}

impl GameController {
    pub fn new(catalog: Rc<Catalog>, config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let mut controller = GameController {
            catalog,
            config,
            rng,
            ids: InstanceAllocator::default(),
            deck: Deck::default(),
            turn: TurnState::default(),
            matched: BTreeSet::new(),
            score: 0,
            moves: 0,
            elapsed_secs: 0,
            game_id: 0,
            seq: 0,
            pending_mismatch: None,
            pending_hint: None,
            hint_used: false,
            finished: false,
            clock_running: false,
            match_details: None,
        };
        controller.initialize();
        controller
    }

    /// Deals a fresh deck and resets every counter. Tokens issued before the
    /// call are rejected afterwards.
    pub fn initialize(&mut self) {
        self.game_id = self.game_id.wrapping_add(1);
        self.seq = 0;
        self.deck = Deck::build(&self.catalog, &mut self.ids, &mut self.rng);
        self.turn.clear();
        self.matched.clear();
        self.score = 0;
        self.moves = 0;
        self.elapsed_secs = 0;
        self.pending_mismatch = None;
        self.pending_hint = None;
        self.hint_used = false;
        self.finished = false;
        self.clock_running = true;
        self.match_details = None;
        tracing::info!(
            "New game {} with {} cards",
            self.game_id,
            self.deck.len()
        );
    }

    pub fn restart(&mut self) {
        self.initialize();
    }

    fn next_seq(&mut self) -> u64 {
        self.seq = self.seq.wrapping_add(1);
        self.seq
    }

    fn ignore(&self, reason: IgnoreReason) -> SelectOutcome {
        tracing::debug!(game_id = self.game_id, ?reason, "Selection ignored");
        SelectOutcome::Ignored(reason)
    }

    pub fn select_at(&mut self, index: usize) -> SelectOutcome {
        match self.deck.at(index).map(|card| card.instance_id) {
            Some(id) => self.select_card(id),
            None => self.ignore(IgnoreReason::UnknownCard),
        }
    }

    pub fn select_card(&mut self, id: InstanceId) -> SelectOutcome {
        if self.finished {
            return self.ignore(IgnoreReason::Finished);
        }
        if self.turn.disabled {
            return self.ignore(IgnoreReason::InputLocked);
        }
        let Some(card) = self.deck.get(id) else {
            return self.ignore(IgnoreReason::UnknownCard);
        };
        if self.matched.contains(&card.source_id) {
            return self.ignore(IgnoreReason::AlreadyMatched);
        }
        if card.face_up {
            return self.ignore(IgnoreReason::AlreadyFaceUp);
        }

        self.deck.set_face_up(id, true);
        match self.turn.first {
            None => {
                self.turn.first = Some(id);
                tracing::debug!(game_id = self.game_id, card = id.raw(), "First card flipped");
                SelectOutcome::FirstFlipped(id)
            }
            Some(first) => {
                self.turn.second = Some(id);
                self.turn.disabled = true;
                self.moves = self.moves.saturating_add(1);
                self.evaluate(first, id)
            }
        }
    }

    fn evaluate(&mut self, first: InstanceId, second: InstanceId) -> SelectOutcome {
        let (source_id, paired) = match (self.deck.get(first), self.deck.get(second)) {
            (Some(a), Some(b)) => (a.source_id, a.pairs_with(b)),
            _ => {
                self.turn.clear();
                return self.ignore(IgnoreReason::UnknownCard);
            }
        };

        if !paired {
            let token = TurnToken {
                game_id: self.game_id,
                seq: self.next_seq(),
            };
            self.pending_mismatch = Some(token);
            tracing::debug!(game_id = self.game_id, moves = self.moves, "Mismatch");
            return SelectOutcome::Mismatched(Deferred {
                token,
                delay: self.config.mismatch_delay(),
            });
        }

        self.matched.insert(source_id);
        self.score = self.score.saturating_add(self.config.match_reward);
        let details = self
            .catalog
            .get(source_id)
            .map(|record| record.details.clone())
            .unwrap_or_default();
        self.match_details = Some(details.clone());
        self.turn.clear();

        // Compare against the set after this pair was recorded.
        let finished = self.matched.len() == self.catalog.len();
        if finished {
            self.finished = true;
            self.clock_running = false;
            tracing::info!(
                game_id = self.game_id,
                moves = self.moves,
                secs = self.elapsed_secs,
                score = self.score,
                "All pairs found"
            );
        } else {
            tracing::debug!(game_id = self.game_id, source_id, "Pair matched");
        }

        SelectOutcome::Matched(MatchReport {
            source_id,
            details,
            finished,
        })
    }

    /// Flips a mismatched pair back and applies the penalty. Returns false for
    /// a token that no longer refers to the pending turn.
    pub fn resolve_mismatch(&mut self, token: TurnToken) -> bool {
        if self.pending_mismatch != Some(token) {
            tracing::debug!(game_id = self.game_id, stale = token.game_id, "Stale mismatch token");
            return false;
        }
        self.pending_mismatch = None;
        for id in [self.turn.first, self.turn.second].into_iter().flatten() {
            self.deck.set_face_up(id, false);
        }
        self.score = self.score.saturating_sub(self.config.mismatch_penalty);
        self.turn.clear();
        true
    }

    pub fn hint_available(&self) -> bool {
        self.config.hints_enabled
            && !self.hint_used
            && !self.finished
            && !self.turn.disabled
            && self.turn.first.is_none()
    }

    /// Reveals one unresolved pair without touching moves or score. Usable once
    /// per game.
    pub fn hint(&mut self) -> Option<HintReveal> {
        if !self.hint_available() {
            return None;
        }
        let pair = self.find_hint_pair()?;
        for id in pair {
            self.deck.set_face_up(id, true);
        }
        self.turn.disabled = true;
        self.hint_used = true;
        let token = HintToken {
            game_id: self.game_id,
            seq: self.next_seq(),
        };
        self.pending_hint = Some((token, pair));
        tracing::debug!(game_id = self.game_id, "Hint revealed");
        Some(HintReveal {
            pair,
            token,
            delay: self.config.hint_delay(),
        })
    }

    fn find_hint_pair(&self) -> Option<[InstanceId; 2]> {
        let hidden = |card: &&CardInstance| !card.face_up && !self.matched.contains(&card.source_id);
        self.deck.cards().iter().filter(hidden).find_map(|card| {
            self.deck
                .instances_of(card.source_id)
                .filter(hidden)
                .find(|other| other.instance_id != card.instance_id && card.pairs_with(other))
                .map(|other| [card.instance_id, other.instance_id])
        })
    }

    pub fn end_hint(&mut self, token: HintToken) -> bool {
        match self.pending_hint {
            Some((pending, pair)) if pending == token => {
                self.pending_hint = None;
                for id in pair {
                    self.deck.set_face_up(id, false);
                }
                self.turn.disabled = false;
                true
            }
            _ => false,
        }
    }

    pub fn clock_token(&self) -> ClockToken {
        ClockToken {
            game_id: self.game_id,
        }
    }

    pub fn tick(&mut self, token: ClockToken) -> TickOutcome {
        if token.game_id != self.game_id || !self.clock_running || self.finished {
            return TickOutcome::Stop;
        }
        self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        TickOutcome::Continue
    }

    pub fn phase(&self) -> Phase {
        if self.finished {
            Phase::Finished
        } else if self.pending_hint.is_some() {
            Phase::Hinting
        } else if self.turn.second.is_some() {
            Phase::Evaluating
        } else if self.turn.first.is_some() {
            Phase::FirstSelected
        } else {
            Phase::Idle
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn card(&self, id: InstanceId) -> Option<&CardInstance> {
        self.deck.get(id)
    }

    pub fn record_for(&self, id: InstanceId) -> Option<&AchievementRecord> {
        self.deck
            .get(id)
            .and_then(|card| self.catalog.get(card.source_id))
    }

    pub fn is_matched(&self, source_id: u32) -> bool {
        self.matched.contains(&source_id)
    }

    pub fn matched_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.matched.iter().copied()
    }

    pub fn matched_count(&self) -> usize {
        self.matched.len()
    }

    pub fn pair_count(&self) -> usize {
        self.catalog.len()
    }

    pub fn progress_pct(&self) -> u8 {
        if self.pair_count() == 0 {
            return 0;
        }
        let pct = self.matched_count() as f64 / self.pair_count() as f64 * 100.0;
        pct.round() as u8
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn game_id(&self) -> u64 {
        self.game_id
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_input_locked(&self) -> bool {
        self.finished || self.turn.disabled
    }

    pub fn match_details(&self) -> Option<&str> {
        self.match_details.as_deref()
    }

    pub fn dismiss_details(&mut self) {
        self.match_details = None;
    }

    pub fn completion(&self) -> Option<CompletionSummary> {
        self.finished.then_some(CompletionSummary {
            elapsed_secs: self.elapsed_secs,
            moves: self.moves,
            score: self.score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(seed: u64) -> GameController {
        let catalog = Rc::new(Catalog::bundled().unwrap());
        GameController::new(
            catalog,
            GameConfig {
                seed: Some(seed),
                ..GameConfig::default()
            },
        )
    }

    #[test]
    fn starts_idle_with_a_running_clock() {
        let mut game = controller(3);
        assert_eq!(game.phase(), Phase::Idle);
        assert_eq!(game.game_id(), 1);
        let token = game.clock_token();
        assert_eq!(game.tick(token), TickOutcome::Continue);
        assert_eq!(game.elapsed_secs(), 1);
    }

    #[test]
    fn out_of_range_index_is_unknown() {
        let mut game = controller(3);
        assert_eq!(
            game.select_at(99),
            SelectOutcome::Ignored(IgnoreReason::UnknownCard)
        );
        assert_eq!(game.phase(), Phase::Idle);
    }

    #[test]
    fn progress_rounds_to_nearest_percent() {
        let mut game = controller(11);
        let ids: Vec<u32> = game.catalog().records().iter().map(|r| r.id).collect();
        // 3 of 8 pairs is 37.5%
        for source_id in ids.into_iter().take(3) {
            let pair: Vec<InstanceId> = game
                .deck()
                .instances_of(source_id)
                .map(|card| card.instance_id)
                .collect();
            game.select_card(pair[0]);
            game.select_card(pair[1]);
        }
        assert_eq!(game.progress_pct(), 38);
    }

    #[test]
    fn hint_refused_while_first_card_is_up() {
        let mut game = controller(5);
        game.select_at(0);
        assert!(!game.hint_available());
        assert!(game.hint().is_none());
        assert_eq!(game.phase(), Phase::FirstSelected);
    }
}
