use std::cell::RefCell;
use std::rc::Rc;

use gettextrs::gettext;
use gtk4::glib;
use gtk4::prelude::*;

use crate::game::TickOutcome;

use super::state::AppState;

pub(super) fn format_mm_ss(total_secs: u32) -> String {
    let mins = total_secs / 60;
    let secs = total_secs % 60;
    format!("{:02}:{:02}", mins, secs)
}

pub(super) fn update_subtitle(st: &AppState) {
    if let Some(subtitle) = &st.title_game_subtitle {
        subtitle.set_text(&format!(
            "{} {} | {} {} | {} | {}%",
            gettext("Score"),
            st.game.score(),
            gettext("Moves"),
            st.game.moves(),
            format_mm_ss(st.game.elapsed_secs()),
            st.game.progress_pct(),
        ));
    }
}

pub(super) fn update_progress(st: &AppState) {
    if let Some(bar) = &st.progress_bar {
        bar.set_fraction(f64::from(st.game.progress_pct()) / 100.0);
        bar.set_text(Some(&format!("{}%", st.game.progress_pct())));
    }
}

pub(super) fn update_hint_button(st: &AppState) {
    if let Some(button) = &st.hint_button {
        let available = st.game.hint_available();
        button.set_sensitive(available);
        button.set_visible(st.game.config().hints_enabled);
        let tooltip = if available {
            gettext("Show Hint")
        } else {
            gettext("Hint Used")
        };
        button.set_tooltip_text(Some(&tooltip));
    }
}

pub(super) fn refresh_hud(st: &AppState) {
    update_subtitle(st);
    update_progress(st);
    update_hint_button(st);
}

pub(super) fn stop_timer(st: &mut AppState) {
    if let Some(handle) = st.timer_handle.take() {
        handle.remove();
    }
}

pub(super) fn start_timer(state: &Rc<RefCell<AppState>>) {
    let mut st = state.borrow_mut();
    stop_timer(&mut st);

    let token = st.game.clock_token();
    let interval = st.game.config().tick_interval();
    let state_clone = state.clone();
    let handle = glib::timeout_add_local(interval, move || {
        let mut st = state_clone.borrow_mut();
        match st.game.tick(token) {
            TickOutcome::Continue => {
                update_subtitle(&st);
                glib::ControlFlow::Continue
            }
            TickOutcome::Stop => {
                // The source is removed by returning Break.
                if st.game.clock_token() == token {
                    st.timer_handle = None;
                }
                glib::ControlFlow::Break
            }
        }
    });
    st.timer_handle = Some(handle);
}
