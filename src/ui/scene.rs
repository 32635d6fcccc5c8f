use std::cell::RefCell;
use std::rc::Rc;

use gettextrs::gettext;
use gtk4 as gtk;
use gtk4::glib;
use gtk4::prelude::*;

use super::board::{build_board_grid, grid_shape};
use super::hud::format_mm_ss;
use super::state::AppState;

const CELEBRATION_MS: u64 = 5000;
const BURST_INTERVAL_MS: u64 = 600;
const BURST_SPOTS: [(f64, f64); 3] = [(75.0, 96.0), (260.0, 74.0), (180.0, 178.0)];

pub(super) fn rebuild_board(state: &Rc<RefCell<AppState>>) {
    let (board_container, card_count) = {
        let st = state.borrow();
        (st.board_container.clone(), st.game.deck().len())
    };
    let Some(board_container) = board_container else {
        return;
    };

    while let Some(child) = board_container.first_child() {
        board_container.remove(&child);
    }
    let grid = build_board_grid(state);
    let (grid_cols, grid_rows) = grid_shape(card_count);
    let grid_ratio = grid_cols as f32 / grid_rows.max(1) as f32;
    let grid_frame = gtk::AspectFrame::new(0.5, 0.5, grid_ratio, false);
    grid_frame.set_halign(gtk::Align::Fill);
    grid_frame.set_valign(gtk::Align::Fill);
    grid_frame.set_hexpand(true);
    grid_frame.set_vexpand(true);
    grid_frame.set_child(Some(&grid));
    board_container.append(&grid_frame);
}

pub(super) fn show_game_view(state: &Rc<RefCell<AppState>>) {
    let st = state.borrow();
    if let Some(stack) = &st.view_stack {
        stack.set_transition_type(gtk::StackTransitionType::SlideRight);
        stack.set_visible_child_name("game");
    }
}

pub(super) fn show_victory(state: &Rc<RefCell<AppState>>) {
    let game_id = {
        let st = state.borrow();
        let Some(summary) = st.game.completion() else {
            return;
        };
        if let Some(label) = &st.victory_stats_label {
            let text = gettext("You found every pair in {time} with {moves} moves.\nScore: {score}")
                .replace("{time}", &format_mm_ss(summary.elapsed_secs))
                .replace("{moves}", &summary.moves.to_string())
                .replace("{score}", &summary.score.to_string());
            label.set_text(&text);
        }
        if let Some(stack) = &st.view_stack {
            stack.set_transition_type(gtk::StackTransitionType::SlideLeft);
            stack.set_visible_child_name("victory");
        }
        st.game.game_id()
    };

    start_victory_sparks(state);

    let state_stop = state.clone();
    glib::timeout_add_local_once(std::time::Duration::from_millis(CELEBRATION_MS), move || {
        let mut st = state_stop.borrow_mut();
        if st.game.game_id() == game_id {
            stop_victory_sparks(&mut st);
        }
    });
}

pub(super) fn spawn_firework_burst(layer: &gtk::Fixed, x: f64, y: f64) {
    for i in 0..8 {
        let color_idx = i % 4;
        let particle = gtk::Label::builder()
            .label("●")
            .css_classes(vec![
                "firework-particle".to_string(),
                format!("dir-{}", i),
                format!("color-{}", color_idx),
            ])
            .build();

        particle.set_can_target(false);
        layer.put(&particle, x, y);

        glib::timeout_add_local_once(std::time::Duration::from_millis(800), {
            let layer_weak = layer.downgrade();
            let particle_weak = particle.downgrade();
            move || {
                if let (Some(layer), Some(particle)) = (layer_weak.upgrade(), particle_weak.upgrade()) {
                    layer.remove(&particle);
                }
            }
        });
    }
}

pub(super) fn stop_victory_sparks(st: &mut AppState) {
    if let Some(handle) = st.spark_timer_handle.take() {
        handle.remove();
    }
    if let Some(layer) = &st.victory_spark_layer {
        while let Some(child) = layer.first_child() {
            layer.remove(&child);
        }
    }
}

pub(super) fn start_victory_sparks(state: &Rc<RefCell<AppState>>) {
    let mut st = state.borrow_mut();
    stop_victory_sparks(&mut st);

    let layer = st.victory_spark_layer.clone();
    let state_weak = Rc::downgrade(state);
    let mut current_spot = 0;

    let handle = glib::timeout_add_local(std::time::Duration::from_millis(BURST_INTERVAL_MS), move || {
        let Some(_state) = state_weak.upgrade() else {
            return glib::ControlFlow::Break;
        };
        if let Some(layer) = &layer {
            let (x, y) = BURST_SPOTS[current_spot];
            spawn_firework_burst(layer, x, y);
            current_spot = (current_spot + 1) % BURST_SPOTS.len();
        }
        glib::ControlFlow::Continue
    });

    st.spark_timer_handle = Some(handle);
}
