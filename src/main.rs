use std::rc::Rc;

use anyhow::Context;
use gettextrs::{LocaleCategory, setlocale, textdomain};

use milestones::config::GameConfig;
use milestones::game::Catalog;
use milestones::{logging, ui};

fn main() -> anyhow::Result<glib::ExitCode> {
    let config = GameConfig::load().context("loading configuration")?;
    logging::init(&config.log_level);

    setlocale(LocaleCategory::LcAll, "");
    if let Err(err) = textdomain("milestones") {
        tracing::warn!("Translations unavailable: {}", err);
    }

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_path(path)
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => Catalog::bundled().context("loading bundled catalog")?,
    };
    tracing::info!("Loaded {} achievements", catalog.len());

    Ok(ui::run(Rc::new(catalog), config))
}
