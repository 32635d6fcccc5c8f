use std::cell::RefCell;
use std::rc::Rc;

use gettextrs::gettext;
use gtk4 as gtk;
use gtk4::gdk;
use gtk4::pango;
use gtk4::prelude::*;

use super::app::handle_tile_click;
use super::state::AppState;
use crate::game::Variant;

pub const CONTENT_MARGIN: i32 = 12;
pub const TILE_GAP: i32 = 8;
const FALLBACK_CARD_COLOR: &str = "#4a90e2";

/// Columns and rows for a near-square board.
pub fn grid_shape(card_count: usize) -> (i32, i32) {
    if card_count == 0 {
        return (1, 1);
    }
    let cols = (card_count as f64).sqrt().ceil() as usize;
    let rows = card_count.div_ceil(cols);
    (cols as i32, rows as i32)
}

pub(super) fn redraw_button_child(button: &gtk::Button) {
    if let Some(child) = button.child() {
        child.queue_draw();
    }
}

pub(super) fn clear_flip_classes(button: &gtk::Button) {
    button.remove_css_class("flip-show-a");
    button.remove_css_class("flip-show-b");
}

pub(super) fn play_flip_show(st: &mut AppState, index: usize) {
    let Some(button) = st.grid_buttons.get(index).cloned() else {
        return;
    };
    clear_flip_classes(&button);
    st.flip_anim_phase = !st.flip_anim_phase;
    if st.flip_anim_phase {
        button.add_css_class("flip-show-a");
    } else {
        button.add_css_class("flip-show-b");
    }
    redraw_button_child(&button);
}

pub(super) fn sync_button(st: &AppState, index: usize) {
    let (Some(button), Some(card)) = (st.grid_buttons.get(index), st.game.deck().at(index)) else {
        return;
    };
    button.remove_css_class("active");
    button.remove_css_class("matched");
    if st.game.is_matched(card.source_id) {
        button.add_css_class("matched");
    } else if card.face_up {
        button.add_css_class("active");
    }
    redraw_button_child(button);
}

pub(super) fn sync_board(st: &AppState) {
    for index in 0..st.grid_buttons.len() {
        sync_button(st, index);
    }
}

fn card_markup(st: &AppState, index: usize) -> Option<(String, String)> {
    let card = st.game.deck().at(index)?;
    if !card.face_up {
        return None;
    }
    let record = st.game.catalog().get(card.source_id)?;
    let markup = match card.variant {
        Variant::Achievement => format!(
            "<span size='xx-large'>{}</span>\n<b>{}</b>",
            glib::markup_escape_text(&record.emoji),
            glib::markup_escape_text(&record.title)
        ),
        Variant::Theme => format!("<b>{}</b>", glib::markup_escape_text(&record.theme)),
    };
    let color = if record.color.is_empty() {
        FALLBACK_CARD_COLOR.to_string()
    } else {
        record.color.clone()
    };
    Some((markup, color))
}

pub fn build_board_grid(state: &Rc<RefCell<AppState>>) -> gtk::Grid {
    let grid = gtk::Grid::new();
    grid.add_css_class("milestones-board");
    grid.set_row_spacing(TILE_GAP as u32);
    grid.set_column_spacing(TILE_GAP as u32);
    grid.set_halign(gtk::Align::Fill);
    grid.set_valign(gtk::Align::Fill);
    grid.set_hexpand(true);
    grid.set_vexpand(true);

    let card_count = state.borrow().game.deck().len();
    let (grid_cols, _) = grid_shape(card_count);

    let mut buttons = Vec::with_capacity(card_count);

    for index in 0..card_count {
        let aspect_frame = gtk::AspectFrame::builder()
            .ratio(1.0)
            .obey_child(false)
            .halign(gtk::Align::Fill)
            .valign(gtk::Align::Fill)
            .hexpand(true)
            .vexpand(true)
            .build();

        let button = gtk::Button::builder()
            .css_classes(vec!["milestones-card"])
            .build();
        button.set_hexpand(true);
        button.set_vexpand(true);
        let label = format!("{} {}", gettext("Card"), index + 1);
        button.set_tooltip_text(Some(&label));
        button.update_property(&[gtk::accessible::Property::Label(&label)]);

        let drawing_area = gtk::DrawingArea::builder()
            .hexpand(true)
            .vexpand(true)
            .build();
        drawing_area.add_css_class("milestones-card-label");

        let state_draw = state.clone();
        drawing_area.set_draw_func(move |area, cr, width, height| {
            let st = state_draw.borrow();
            let face = card_markup(&st, index);
            let min_dim = width.min(height) as f64;

            cr.set_antialias(cairo::Antialias::Best);

            let layout = pangocairo::functions::create_layout(cr);
            let mut font_desc = pango::FontDescription::new();
            font_desc.set_family("Cantarell, Noto Sans, Noto Color Emoji, sans");
            layout.set_alignment(pango::Alignment::Center);

            match &face {
                Some((markup, color)) => {
                    if let Ok(rgba) = gdk::RGBA::parse(color.as_str()) {
                        cr.set_source_rgba(
                            rgba.red() as f64,
                            rgba.green() as f64,
                            rgba.blue() as f64,
                            rgba.alpha() as f64,
                        );
                        let _ = cr.paint();
                    }
                    font_desc.set_size((min_dim * 0.11 * pango::SCALE as f64) as i32);
                    layout.set_font_description(Some(&font_desc));
                    layout.set_width(((width as f64 * 0.9) as i32) * pango::SCALE);
                    layout.set_wrap(pango::WrapMode::WordChar);
                    layout.set_markup(markup);
                    cr.set_source_rgba(1.0, 1.0, 1.0, 1.0);
                }
                None => {
                    font_desc.set_weight(pango::Weight::Bold);
                    font_desc.set_size((min_dim * 0.34 * pango::SCALE as f64) as i32);
                    layout.set_font_description(Some(&font_desc));
                    layout.set_text("?");
                    let fg = area.style_context().color();
                    cr.set_source_rgba(
                        fg.red() as f64,
                        fg.green() as f64,
                        fg.blue() as f64,
                        fg.alpha() as f64,
                    );
                }
            }

            let (text_width, text_height) = layout.pixel_size();
            cr.move_to(
                (width as f64 - text_width as f64) / 2.0,
                (height as f64 - text_height as f64) / 2.0,
            );
            pangocairo::functions::show_layout(cr, &layout);
        });

        button.set_child(Some(&drawing_area));

        let state_clone = state.clone();
        button.connect_clicked(move |_| {
            handle_tile_click(&state_clone, index);
        });

        aspect_frame.set_child(Some(&button));

        let x = index as i32 % grid_cols;
        let y = index as i32 / grid_cols;
        grid.attach(&aspect_frame, x, y, 1, 1);
        buttons.push(button);
    }

    let mut st = state.borrow_mut();
    st.grid_buttons = buttons;
    sync_board(&st);

    grid
}
