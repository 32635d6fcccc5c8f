//! Invariants that must hold for arbitrary seeds and click sequences.

use std::collections::HashMap;
use std::rc::Rc;

use proptest::prelude::*;

use milestones::config::GameConfig;
use milestones::game::{
    Catalog, GameController, HintToken, SelectOutcome, TurnToken, Variant,
};

#[derive(Clone, Debug)]
enum Action {
    Select(usize),
    Resolve,
    Hint,
    EndHint,
    Tick,
    Restart,
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        8 => (0usize..18).prop_map(Action::Select),
        4 => Just(Action::Resolve),
        1 => Just(Action::Hint),
        1 => Just(Action::EndHint),
        1 => Just(Action::Tick),
        1 => Just(Action::Restart),
    ]
}

fn new_game(seed: u64) -> GameController {
    let catalog = Rc::new(Catalog::bundled().unwrap());
    GameController::new(
        catalog,
        GameConfig {
            seed: Some(seed),
            ..GameConfig::default()
        },
    )
}

fn assert_deck_invariant(game: &GameController) {
    assert_eq!(game.deck().len(), 2 * game.pair_count());
    let mut by_source: HashMap<u32, Vec<Variant>> = HashMap::new();
    for card in game.deck().cards() {
        by_source.entry(card.source_id).or_default().push(card.variant);
    }
    for record in game.catalog().records() {
        let variants = &by_source[&record.id];
        assert_eq!(variants.len(), 2);
        assert!(variants.contains(&Variant::Achievement));
        assert!(variants.contains(&Variant::Theme));
    }
}

proptest! {
    #[test]
    fn deck_invariant_holds_for_any_seed(seed in any::<u64>(), restarts in 0usize..4) {
        let mut game = new_game(seed);
        assert_deck_invariant(&game);
        for _ in 0..restarts {
            game.restart();
            assert_deck_invariant(&game);
        }
    }

    #[test]
    fn score_and_match_set_stay_consistent(
        seed in any::<u64>(),
        actions in prop::collection::vec(action_strategy(), 1..120),
    ) {
        let mut game = new_game(seed);
        let mut expected_score: u32 = 0;
        let mut matched_before = 0usize;
        let mut turn: Option<TurnToken> = None;
        let mut hint: Option<HintToken> = None;
        let mut finished_reports = 0;

        for action in actions {
            match action {
                Action::Select(index) => match game.select_at(index) {
                    SelectOutcome::Matched(report) => {
                        expected_score += 100;
                        if report.finished {
                            finished_reports += 1;
                        }
                    }
                    SelectOutcome::Mismatched(deferred) => turn = Some(deferred.token),
                    SelectOutcome::FirstFlipped(_) | SelectOutcome::Ignored(_) => {}
                },
                Action::Resolve => {
                    if let Some(token) = turn.take() {
                        if game.resolve_mismatch(token) {
                            expected_score = expected_score.saturating_sub(10);
                        }
                    }
                }
                Action::Hint => {
                    let score = game.score();
                    let moves = game.moves();
                    if let Some(reveal) = game.hint() {
                        hint = Some(reveal.token);
                    }
                    prop_assert_eq!(game.score(), score);
                    prop_assert_eq!(game.moves(), moves);
                }
                Action::EndHint => {
                    if let Some(token) = hint.take() {
                        game.end_hint(token);
                    }
                }
                Action::Tick => {
                    game.tick(game.clock_token());
                }
                Action::Restart => {
                    game.restart();
                    expected_score = 0;
                    matched_before = 0;
                    finished_reports = 0;
                    assert_deck_invariant(&game);
                }
            }

            prop_assert_eq!(game.score(), expected_score);
            prop_assert!(game.matched_count() >= matched_before);
            prop_assert!(game.matched_count() <= game.pair_count());
            matched_before = game.matched_count();

            for source_id in game.matched_ids() {
                prop_assert!(game.deck().instances_of(source_id).all(|card| card.face_up));
            }
            prop_assert!(finished_reports <= 1);
            prop_assert_eq!(game.is_finished(), game.matched_count() == game.pair_count());
            prop_assert_eq!(finished_reports == 1, game.is_finished());
        }
    }
}
