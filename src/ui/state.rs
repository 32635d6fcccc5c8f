use gtk4 as gtk;
use gtk4::glib;

use crate::game::GameController;

pub struct AppState {
    pub game: GameController,
    pub window: Option<gtk::Window>,
    pub view_stack: Option<gtk::Stack>,
    pub hint_button: Option<gtk::Button>,
    pub title_game_subtitle: Option<gtk::Label>,
    pub progress_bar: Option<gtk::ProgressBar>,
    pub board_container: Option<gtk::Box>,
    pub victory_stats_label: Option<gtk::Label>,
    pub victory_spark_layer: Option<gtk::Fixed>,

    pub grid_buttons: Vec<gtk::Button>,
    pub flip_anim_phase: bool,
    pub timer_handle: Option<glib::SourceId>,
    pub spark_timer_handle: Option<glib::SourceId>,
}

impl AppState {
    pub fn new(game: GameController) -> Self {
        AppState {
            game,
            window: None,
            view_stack: None,
            hint_button: None,
            title_game_subtitle: None,
            progress_bar: None,
            board_container: None,
            victory_stats_label: None,
            victory_spark_layer: None,
            grid_buttons: Vec::new(),
            flip_anim_phase: false,
            timer_handle: None,
            spark_timer_handle: None,
        }
    }

    pub fn in_game_view(&self) -> bool {
        self.view_stack
            .as_ref()
            .and_then(|stack| stack.visible_child_name())
            .as_deref()
            == Some("game")
    }
}
