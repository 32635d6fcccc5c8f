use gettextrs::gettext;
use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;

pub fn show_instructions_dialog(parent: Option<&gtk::Window>) -> adw::AlertDialog {
    let dialog = adw::AlertDialog::new(
        Some(&gettext("Instructions")),
        Some(&gettext(
            "Flip two cards per turn.\n\
Each achievement pairs with its theme card.\n\
A match scores 100 points, a miss costs 10.\n\
You get one hint per game.",
        )),
    );
    dialog.add_response("ok", &gettext("Got it"));
    dialog.set_default_response(Some("ok"));
    dialog.set_close_response("ok");
    dialog.present(parent);
    dialog
}

pub fn show_match_dialog(parent: Option<&gtk::Window>, title: &str, details: &str) -> adw::AlertDialog {
    let dialog = adw::AlertDialog::new(
        Some(&format!("{} 🎉", gettext("Matched!"))),
        Some(&format!("{title}\n\n{details}")),
    );
    dialog.add_response("close", &gettext("Close"));
    dialog.set_default_response(Some("close"));
    dialog.set_close_response("close");
    dialog.present(parent);
    dialog
}

pub fn show_about_dialog(parent: Option<&gtk::Window>) -> adw::AboutDialog {
    let dialog = adw::AboutDialog::builder()
        .application_name("Milestones")
        .application_icon("applications-games-symbolic")
        .version(env!("CARGO_PKG_VERSION"))
        .comments(gettext("A memory game about the year's achievements."))
        .build();
    dialog.add_legal_section(
        "Milestones",
        None,
        gtk::License::MitX11,
        None,
    );
    dialog.present(parent);
    dialog
}
