use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use color_eyre::{
    Result,
    eyre::{WrapErr as _, eyre},
};
use iced::{
    Element, Font, Length, Task,
    font::{self},
    padding,
    widget::{container, scrollable, text},
};
use log::{error, info};
use serde::de::DeserializeOwned;

use crate::{
    context::{Config, Context},
    message::Message,
    state::{Modal, State, StateExt},
};

pub mod cli;
pub mod context;
pub mod message;
pub mod state;

pub const APP_NAME: &str = "Mudgiebo Image Generator";

pub struct Gui {
    state: Box<dyn State>,
    ctx: Context,
}

impl Gui {
    pub fn new(ctx: Context) -> Self {
        Gui {
            state: state::initial_state(&ctx),
            ctx,
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match self.try_update(message) {
            Ok(task) => task,
            Err(e) => {
                error!("{e:?}");
                self.state = Modal::message(self.state.clone(), "Error", format!("{e}")).boxed();
                Task::none()
            }
        }
    }

    fn try_update(&mut self, message: Message) -> Result<Task<Message>> {
        let cmd = self.state.update(message, &mut self.ctx)?;
        if let Some(new_state) = cmd.transition {
            self.state = new_state;
        }
        Ok(cmd.task.unwrap_or(Task::none()))
    }

    pub fn view(&self) -> Element<'_, Message> {
        self.state.view(&self.ctx)
    }
}

pub fn load_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let src = fs::read_to_string(path)?;
    Ok(ron::from_str(&src)?)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(dirs::config_local_dir()
        .ok_or(eyre!("Couldn't get config dir"))?
        .join("mudgiebo.ron"))
}

/// Reads the config from `path` or the default location. A missing file at the
/// default location means defaults, a missing explicit path is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = config_path()?;
            if !p.exists() {
                return Ok(Config::default());
            }
            p
        }
    };
    info!("Loading config from {}", path.display());
    load_ron_file(&path).wrap_err_with(|| format!("Couldn't load {}", path.display()))
}

fn bold_text<'a>(t: impl text::IntoFragment<'a>) -> iced::widget::Text<'a> {
    iced::widget::text(t).font(bold_default_font())
}

fn bold_default_font() -> Font {
    Font {
        weight: font::Weight::Bold,
        ..Font::DEFAULT
    }
}

fn top_level_container<'a, T: Send + 'static>(
    elem: impl Into<Element<'a, T>>,
) -> container::Container<'a, T> {
    container(
        container(scrollable(
            container(elem).padding(padding::all(10).right(20)),
        ))
        .padding(20)
        .max_width(800),
    )
    .center(Length::Fill)
}

pub trait TryIntoExt<T> {
    fn try_into_ex(self) -> color_eyre::Result<T>;
}

impl<T, Target, E> TryIntoExt<Target> for T
where
    T: TryInto<Target, Error = E>,
    T: fmt::Debug,
    T: Clone,
    E: std::error::Error + Send + Sync + 'static,
{
    fn try_into_ex(self) -> color_eyre::Result<Target> {
        self.clone()
            .try_into()
            .with_context(|| format!("{self:#?}"))
    }
}
