use std::cell::RefCell;
use std::rc::Rc;

use gettextrs::gettext;
use gio::SimpleAction;
use gtk4 as gtk;
use gtk4::glib;
use gtk4::prelude::*;
use libadwaita as adw;
use adw::prelude::*;

use super::board::{CONTENT_MARGIN, play_flip_show, sync_board, sync_button};
use super::dialogs::{show_about_dialog, show_instructions_dialog, show_match_dialog};
use super::hud::{refresh_hud, start_timer, stop_timer, update_hint_button};
use super::scene::{rebuild_board, show_game_view, show_victory, stop_victory_sparks};
use super::state::AppState;
use crate::config::GameConfig;
use crate::game::{Catalog, GameController, InstanceId, SelectOutcome};

pub const APP_ID: &str = "io.github.milestones.Milestones";
const VICTORY_DELAY_MS: u64 = 700;
const STYLE_CSS: &str = include_str!("../../data/style.css");

fn load_css() {
    let Some(display) = gtk::gdk::Display::default() else {
        return;
    };
    let provider = gtk::CssProvider::new();
    provider.load_from_data(STYLE_CSS);
    gtk::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}

fn index_of(st: &AppState, id: InstanceId) -> Option<usize> {
    st.game.deck().position(id)
}

fn present_match_details(state: &Rc<RefCell<AppState>>, source_id: u32, details: &str) {
    let (window, title) = {
        let st = state.borrow();
        let title = st
            .game
            .catalog()
            .get(source_id)
            .map(|record| format!("{} {}", record.emoji, record.title))
            .unwrap_or_default();
        (st.window.clone(), title)
    };
    let dialog = show_match_dialog(window.as_ref(), &title, details);
    let state_dismiss = state.clone();
    dialog.connect_response(None, move |_, _| {
        state_dismiss.borrow_mut().game.dismiss_details();
    });
}

pub fn handle_tile_click(state: &Rc<RefCell<AppState>>, index: usize) {
    let mut st = state.borrow_mut();
    let outcome = st.game.select_at(index);

    match outcome {
        SelectOutcome::Ignored(_) => {}
        SelectOutcome::FirstFlipped(_) => {
            play_flip_show(&mut st, index);
            sync_button(&st, index);
            update_hint_button(&st);
        }
        SelectOutcome::Matched(report) => {
            play_flip_show(&mut st, index);
            sync_board(&st);
            refresh_hud(&st);
            let game_id = st.game.game_id();
            if report.finished {
                stop_timer(&mut st);
            }
            drop(st);

            present_match_details(state, report.source_id, &report.details);

            if report.finished {
                let state_victory = state.clone();
                glib::timeout_add_local_once(
                    std::time::Duration::from_millis(VICTORY_DELAY_MS),
                    move || {
                        let in_game = {
                            let st = state_victory.borrow();
                            st.game.game_id() == game_id && st.in_game_view()
                        };
                        if in_game {
                            show_victory(&state_victory);
                        }
                    },
                );
            }
        }
        SelectOutcome::Mismatched(deferred) => {
            play_flip_show(&mut st, index);
            sync_button(&st, index);
            refresh_hud(&st);
            for (idx, button) in st.grid_buttons.iter().enumerate() {
                let pending = st.game.deck().at(idx).is_some_and(|card| {
                    card.face_up && !st.game.is_matched(card.source_id)
                });
                if pending {
                    button.add_css_class("mismatch-shake");
                }
            }
            drop(st);

            let state_reset = state.clone();
            glib::timeout_add_local_once(deferred.delay, move || {
                let mut st = state_reset.borrow_mut();
                if !st.game.resolve_mismatch(deferred.token) {
                    return;
                }
                for button in &st.grid_buttons {
                    button.remove_css_class("mismatch-shake");
                }
                sync_board(&st);
                refresh_hud(&st);
            });
        }
    }
}

fn show_hint(state: &Rc<RefCell<AppState>>) {
    let mut st = state.borrow_mut();
    let Some(reveal) = st.game.hint() else {
        return;
    };
    for id in reveal.pair {
        if let Some(idx) = index_of(&st, id) {
            play_flip_show(&mut st, idx);
        }
    }
    sync_board(&st);
    update_hint_button(&st);
    drop(st);

    let state_hide = state.clone();
    glib::timeout_add_local_once(reveal.delay, move || {
        let mut st = state_hide.borrow_mut();
        if st.game.end_hint(reveal.token) {
            sync_board(&st);
        }
        update_hint_button(&st);
    });
}

fn restart_game(state: &Rc<RefCell<AppState>>) {
    {
        let mut st = state.borrow_mut();
        stop_timer(&mut st);
        stop_victory_sparks(&mut st);
        st.game.restart();
    }
    rebuild_board(state);
    {
        let st = state.borrow();
        refresh_hud(&st);
    }
    show_game_view(state);
    start_timer(state);
}

fn build_game_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
    root.set_hexpand(true);
    root.set_vexpand(true);
    root.add_css_class("game-root");

    let content = gtk::Box::new(gtk::Orientation::Vertical, 12);
    content.set_hexpand(true);
    content.set_vexpand(true);
    content.set_margin_top(CONTENT_MARGIN);
    content.set_margin_bottom(CONTENT_MARGIN);
    content.set_margin_start(CONTENT_MARGIN);
    content.set_margin_end(CONTENT_MARGIN);

    let progress = gtk::ProgressBar::new();
    progress.set_show_text(true);
    progress.add_css_class("milestones-progress");

    let board_frame = gtk::AspectFrame::new(0.5, 0.5, 1.0, false);
    board_frame.set_halign(gtk::Align::Fill);
    board_frame.set_valign(gtk::Align::Fill);
    board_frame.set_hexpand(true);
    board_frame.set_vexpand(true);

    let board_card = gtk::Box::new(gtk::Orientation::Vertical, 0);
    board_card.set_hexpand(true);
    board_card.set_vexpand(true);
    board_card.add_css_class("milestones-card-container");
    board_frame.set_child(Some(&board_card));

    content.append(&progress);
    content.append(&board_frame);
    root.append(&content);

    {
        let mut st = state.borrow_mut();
        st.board_container = Some(board_card);
        st.progress_bar = Some(progress);
    }
    rebuild_board(state);

    root
}

fn build_victory_view(state: &Rc<RefCell<AppState>>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 0);
    root.set_hexpand(true);
    root.set_vexpand(true);
    root.add_css_class("victory-root");

    let center = gtk::CenterBox::new();
    center.set_hexpand(true);
    center.set_vexpand(true);

    let card_shell = gtk::Box::new(gtk::Orientation::Vertical, 0);
    card_shell.set_halign(gtk::Align::Center);
    card_shell.set_valign(gtk::Align::Center);
    card_shell.add_css_class("victory-card");
    card_shell.set_size_request(320, 360);

    let card_overlay = gtk::Overlay::new();
    card_overlay.set_hexpand(true);
    card_overlay.set_vexpand(true);

    let spark_layer = gtk::Fixed::new();
    spark_layer.set_hexpand(true);
    spark_layer.set_vexpand(true);
    spark_layer.set_can_target(false);
    spark_layer.add_css_class("victory-spark-layer");
    spark_layer.set_size_request(320, 360);

    let content = gtk::Box::new(gtk::Orientation::Vertical, 14);
    content.set_halign(gtk::Align::Center);
    content.set_valign(gtk::Align::Center);
    content.set_margin_top(28);
    content.set_margin_bottom(28);
    content.set_margin_start(28);
    content.set_margin_end(28);

    let title = gtk::Label::new(Some(&format!("🎉 {}", gettext("Congratulations!"))));
    title.add_css_class("victory-title");
    title.add_css_class("title-1");

    let stats = gtk::Label::new(None);
    stats.add_css_class("victory-message");
    stats.add_css_class("body");
    stats.set_wrap(true);
    stats.set_justify(gtk::Justification::Center);
    stats.set_max_width_chars(36);

    let again_btn = gtk::Button::with_label(&gettext("Play Again"));
    again_btn.add_css_class("suggested-action");
    again_btn.set_halign(gtk::Align::Center);
    again_btn.connect_clicked({
        let state = state.clone();
        move |_| restart_game(&state)
    });

    content.append(&title);
    content.append(&stats);
    content.append(&again_btn);
    card_overlay.set_child(Some(&spark_layer));
    card_overlay.add_overlay(&content);
    card_shell.append(&card_overlay);
    center.set_center_widget(Some(&card_shell));
    root.append(&center);

    {
        let mut st = state.borrow_mut();
        st.victory_stats_label = Some(stats);
        st.victory_spark_layer = Some(spark_layer);
    }

    root
}

fn add_state_action(app: &adw::Application, name: &str, state: &Rc<RefCell<AppState>>, f: fn(&Rc<RefCell<AppState>>)) {
    let action = SimpleAction::new(name, None);
    action.connect_activate({
        let state = state.clone();
        move |_, _| f(&state)
    });
    app.add_action(&action);
}

pub fn run(catalog: Rc<Catalog>, config: GameConfig) -> glib::ExitCode {
    glib::set_prgname(Some(APP_ID));
    let app = adw::Application::builder().application_id(APP_ID).build();

    app.connect_activate(move |app| {
        load_css();

        let state = Rc::new(RefCell::new(AppState::new(GameController::new(
            catalog.clone(),
            config.clone(),
        ))));

        add_state_action(app, "restart", &state, restart_game);
        add_state_action(app, "hint", &state, show_hint);
        add_state_action(app, "instructions", &state, |state| {
            let window = state.borrow().window.clone();
            show_instructions_dialog(window.as_ref());
        });
        add_state_action(app, "about", &state, |state| {
            let window = state.borrow().window.clone();
            show_about_dialog(window.as_ref());
        });
        app.set_accels_for_action("app.restart", &["<Control>r"]);
        app.set_accels_for_action("app.hint", &["<Control>h"]);

        let quit_action = SimpleAction::new("quit", None);
        quit_action.connect_activate({
            let app = app.clone();
            move |_, _| app.quit()
        });
        app.add_action(&quit_action);
        app.set_accels_for_action("app.quit", &["<Control>q"]);

        let title_game_box = gtk::Box::new(gtk::Orientation::Vertical, 0);
        title_game_box.set_valign(gtk::Align::Center);
        title_game_box.set_halign(gtk::Align::Center);
        title_game_box.set_hexpand(true);

        let title_game_main = gtk::Label::builder()
            .label("Milestones")
            .halign(gtk::Align::Center)
            .css_classes(vec!["game-title-main"])
            .build();
        let title_game_subtitle = gtk::Label::builder()
            .label("")
            .halign(gtk::Align::Center)
            .css_classes(vec!["game-title-subtitle", "caption"])
            .build();
        title_game_box.append(&title_game_main);
        title_game_box.append(&title_game_subtitle);

        let header = adw::HeaderBar::builder()
            .title_widget(&title_game_box)
            .build();
        header.add_css_class("app-header");
        header.add_css_class("flat");

        let hint_button = gtk::Button::builder()
            .icon_name("dialog-information-symbolic")
            .build();
        hint_button.connect_clicked({
            let state = state.clone();
            move |_| show_hint(&state)
        });
        header.pack_start(&hint_button);

        let menu_model = gio::Menu::new();
        menu_model.append(Some(&gettext("Instructions")), Some("app.instructions"));
        menu_model.append(Some(&gettext("About Milestones")), Some("app.about"));
        menu_model.append(Some(&gettext("Quit")), Some("app.quit"));
        let menu_button = gtk::MenuButton::builder()
            .icon_name("open-menu-symbolic")
            .menu_model(&menu_model)
            .build();

        let restart_button = gtk::Button::builder()
            .icon_name("view-refresh-symbolic")
            .action_name("app.restart")
            .build();
        restart_button.set_tooltip_text(Some(&gettext("New Game")));

        let end_box = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        end_box.append(&restart_button);
        end_box.append(&menu_button);
        header.pack_end(&end_box);

        let view_stack = gtk::Stack::new();
        view_stack.set_hexpand(true);
        view_stack.set_vexpand(true);
        view_stack.set_transition_duration(300);

        let game_view = build_game_view(&state);
        view_stack.add_named(&game_view, Some("game"));
        let victory_view = build_victory_view(&state);
        view_stack.add_named(&victory_view, Some("victory"));
        view_stack.set_visible_child_name("game");

        let toolbar = adw::ToolbarView::new();
        toolbar.add_top_bar(&header);
        toolbar.set_content(Some(&view_stack));

        let win = adw::ApplicationWindow::builder()
            .application(app)
            .title("Milestones")
            .default_width(860)
            .default_height(760)
            .content(&toolbar)
            .build();
        win.set_size_request(360, 560);

        {
            let mut st = state.borrow_mut();
            st.window = Some(win.clone().upcast::<gtk::Window>());
            st.view_stack = Some(view_stack);
            st.hint_button = Some(hint_button);
            st.title_game_subtitle = Some(title_game_subtitle);
            refresh_hud(&st);
        }

        start_timer(&state);
        win.present();
    });

    app.run_with_args::<&str>(&[])
}
