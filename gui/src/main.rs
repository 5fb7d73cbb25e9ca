use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use engine::KeyringStore;
use mudgiebo::{APP_NAME, Gui, cli::Cli, context::Context, load_config};

pub fn main() -> Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init();
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    let secrets = Arc::new(KeyringStore::new(&cfg.keyring_service));
    let ctx = Context::new(cfg, secrets)?;

    iced::application(move || Gui::new(ctx.clone()), Gui::update, Gui::view)
        .title(APP_NAME)
        .window_size((640.0, 780.0))
        .run()?;
    Ok(())
}
