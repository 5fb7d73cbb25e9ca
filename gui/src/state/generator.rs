use std::{fmt, path::PathBuf, sync::Arc};

use color_eyre::Result;
use engine::{ExportError, GeneratedImage, ImageClient, export};
use iced::{
    Color, Element, Length, Task,
    alignment::Horizontal,
    task,
    widget::{
        self, button, column, container, row, space, text,
        text_editor::{self, Edit},
    },
};
use log::{debug, error, info};

use crate::{
    TryIntoExt, bold_text,
    context::Context,
    message::{Message, ui_messages::Generator as MyMessage},
    state::{CredentialEntry, Modal, State, StateCommand, cmd},
    top_level_container,
};

/// Prompt entry and the latest generated image
#[derive(Debug, Clone)]
pub struct Generator {
    credential: ApiKey,
    prompt: text_editor::Content,
    shown: Option<Shown>,
    /// Set while a generation is running. Shared with clones that sit below a
    /// modal.
    pending: Option<Arc<task::Handle>>,
    /// Set while the save dialog is open or the file is being written
    saving: bool,
    status: Status,
}

#[derive(Clone)]
struct ApiKey(String);

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(..)")
    }
}

#[derive(Debug, Clone)]
struct Shown {
    image: GeneratedImage,
    handle: widget::image::Handle,
}

#[derive(Debug, Clone, PartialEq)]
enum Status {
    Idle,
    Generating,
    Saved(PathBuf),
    Failed(String),
}

impl Generator {
    pub fn new(credential: String) -> Self {
        Self {
            credential: ApiKey(credential),
            prompt: text_editor::Content::default(),
            shown: None,
            pending: None,
            saving: false,
            status: Status::Idle,
        }
    }

    fn generate(&mut self, ctx: &Context) -> Result<StateCommand> {
        if self.pending.is_some() {
            debug!("Generation already running, ignoring request");
            return cmd::none();
        }

        let Some((client, prompt)) = self.request(ctx) else {
            return cmd::none();
        };
        let (task, handle): (Task<Message>, _) = Task::perform(
            async move { client.get_image(&prompt).await.map_err(Arc::new) },
            |res| MyMessage::Generated(res).into(),
        )
        .abortable();

        self.pending = Some(Arc::new(handle));
        self.status = Status::Generating;
        cmd::task(task)
    }

    /// Client bound to the held key and the trimmed prompt. `None` for a blank
    /// prompt.
    fn request(&self, ctx: &Context) -> Option<(ImageClient, String)> {
        let prompt = self.prompt.text().trim().to_string();
        if prompt.is_empty() {
            return None;
        }
        Some((ctx.image_client(&self.credential.0), prompt))
    }

    fn abort_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            info!("Aborting generation");
            handle.abort();
            self.status = Status::Idle;
        }
    }

    fn show(&mut self, image: GeneratedImage) {
        let handle = widget::image::Handle::from_rgba(
            image.bitmap.width(),
            image.bitmap.height(),
            image.bitmap.as_raw().clone(),
        );
        self.shown = Some(Shown { image, handle });
    }
}

impl State for Generator {
    fn update(&mut self, message: Message, ctx: &mut Context) -> Result<StateCommand> {
        use MyMessage::*;
        match message.try_into_ex()? {
            UpdatePrompt(text_editor::Action::Edit(Edit::Enter)) => {
                cmd::task(Task::done(Generate.into()))
            }
            UpdatePrompt(action) => {
                self.prompt.perform(action);
                cmd::none()
            }
            Generate => self.generate(ctx),
            Cancel => {
                self.abort_pending();
                cmd::none()
            }
            Generated(res) => {
                if self.pending.take().is_none() {
                    debug!("Dropping result of a cancelled generation");
                    return cmd::none();
                }
                match res {
                    Ok(image) => {
                        self.show(image);
                        self.status = Status::Idle;
                    }
                    Err(e) => {
                        error!("Generation failed: {e}");
                        self.status = Status::Failed(e.to_string());
                    }
                }
                cmd::none()
            }
            Save => {
                if self.saving {
                    debug!("Save already in progress, ignoring request");
                    return cmd::none();
                }
                let Some(shown) = &self.shown else {
                    return cmd::none();
                };
                let start_dir = ctx.config.save_dir.clone().or_else(export::default_directory);
                let task = Task::perform(save_image(shown.image.clone(), start_dir), |res| {
                    Saved(res).into()
                });
                self.saving = true;
                cmd::task(task)
            }
            Saved(res) => {
                self.saving = false;
                match res {
                    Ok(Some(path)) => self.status = Status::Saved(path),
                    Ok(None) => {}
                    Err(e) => self.status = Status::Failed(e.to_string()),
                }
                cmd::none()
            }
            ForgetKey => cmd::transition(Modal::confirm(
                State::clone(self),
                "Forget the stored API key? You will have to enter it again.",
                Some(ConfirmForgetKey.into()),
                None,
            )),
            ConfirmForgetKey => {
                ctx.secrets.delete()?;
                self.abort_pending();
                info!("API key removed");
                cmd::transition(CredentialEntry::new())
            }
        }
    }

    fn view<'a>(&'a self, _ctx: &'a Context) -> Element<'a, Message> {
        let idle = self.pending.is_none();
        let generate: Option<Message> = idle.then_some(MyMessage::Generate.into());

        let mut buttons = row![button("Generate Image").on_press_maybe(generate)].spacing(10);
        if !idle {
            buttons = buttons.push(button("Cancel").on_press(MyMessage::Cancel.into()));
        }
        buttons = buttons.push(space::horizontal()).push(
            button("Forget API key")
                .style(button::secondary)
                .on_press(MyMessage::ForgetKey.into()),
        );

        let mut col = column![
            bold_text("Enter image description:").size(18),
            widget::text_editor(&self.prompt)
                .placeholder("A red fox in snow")
                .on_action(|a| MyMessage::UpdatePrompt(a).into())
                .height(80),
            buttons,
            status_line(&self.status),
        ]
        .spacing(12)
        .width(Length::Fill);

        if let Some(shown) = &self.shown {
            let save: Option<Message> = (!self.saving).then_some(MyMessage::Save.into());
            col = col.push(
                column![
                    container(widget::image(&shown.handle).width(512).height(512))
                        .center_x(Length::Fill),
                    text(&shown.image.prompt).size(12),
                    button("Save Image").on_press_maybe(save),
                ]
                .spacing(10)
                .align_x(Horizontal::Center)
                .width(Length::Fill),
            );
        }

        top_level_container(col).into()
    }

    fn clone(&self) -> Box<dyn State> {
        Box::new(Clone::clone(self))
    }
}

fn status_line(status: &Status) -> Element<'_, Message> {
    match status {
        Status::Idle => space().height(0).into(),
        Status::Generating => text("Generating image...").into(),
        Status::Saved(path) => widget::text!("Saved to {}", path.display()).into(),
        Status::Failed(e) => text(e).color(Color::from_rgb(0.7, 0.1, 0.1)).into(),
    }
}

/// Asks for a destination and writes the image there. `Ok(None)` if the user
/// dismissed the dialog.
async fn save_image(
    image: GeneratedImage,
    start_dir: Option<PathBuf>,
) -> Result<Option<PathBuf>, Arc<ExportError>> {
    let mut dialog = rfd::AsyncFileDialog::new()
        .set_title("Save Image")
        .set_file_name(export::default_file_name(&image.created_at))
        .add_filter("PNG image", &[export::EXTENSION]);
    if let Some(dir) = start_dir {
        dialog = dialog.set_directory(dir);
    }

    let Some(file) = dialog.save_file().await else {
        debug!("Save dialog dismissed");
        return Ok(None);
    };

    export::save_png(image.bitmap, file.path().to_path_buf())
        .await
        .map(Some)
        .map_err(|e| {
            error!("{e}");
            Arc::new(e)
        })
}

#[cfg(test)]
mod tests {
    use std::io;

    use engine::{Bitmap, GenerationError, MemoryStore, SecretStore, SecretStoreError};

    use super::*;
    use crate::{context::Config, state::initial_state};

    fn context(store: &MemoryStore) -> Context {
        Context::new(Config::default(), Arc::new(store.clone())).unwrap()
    }

    /// Holds a key but can't remove it, like a locked keychain
    struct LockedStore;

    impl SecretStore for LockedStore {
        fn get(&self) -> Option<String> {
            Some("sk-test".into())
        }

        fn set(&self, _value: &str) -> Result<(), SecretStoreError> {
            Ok(())
        }

        fn delete(&self) -> Result<(), SecretStoreError> {
            let locked = io::Error::other("keychain is locked");
            Err(keyring::Error::NoStorageAccess(Box::new(locked)).into())
        }
    }

    fn with_prompt(prompt: &str) -> Generator {
        let mut state = Generator::new("sk-test".into());
        state.prompt = text_editor::Content::with_text(prompt);
        state
    }

    fn send(state: &mut Generator, ctx: &mut Context, msg: MyMessage) -> StateCommand {
        state.update(msg.into(), ctx).unwrap()
    }

    fn image() -> GeneratedImage {
        GeneratedImage::new(Bitmap::new(3, 2), "a red fox in snow")
    }

    #[test]
    fn starts_here_with_stored_key() {
        let store = MemoryStore::with_secret("sk-test");
        let state = initial_state(&context(&store));
        assert!(format!("{state:?}").starts_with("Generator"));
        assert!(!format!("{state:?}").contains("sk-test"));
    }

    #[test]
    fn blank_prompt_does_nothing() {
        let mut ctx = context(&MemoryStore::with_secret("sk-test"));
        let mut state = with_prompt("  \n\t ");

        let cmd = send(&mut state, &mut ctx, MyMessage::Generate);

        assert!(cmd.task.is_none());
        assert!(state.pending.is_none());
        assert!(state.shown.is_none());
        assert_eq!(state.status, Status::Idle);
    }

    #[test]
    fn request_uses_trimmed_prompt_and_held_key() {
        let ctx = context(&MemoryStore::with_secret("sk-other"));
        let state = with_prompt("  a red fox in snow \n");

        let (client, prompt) = state.request(&ctx).expect("prompt is not blank");
        let req = client.generation_request(&prompt).build().unwrap();

        assert_eq!(req.method(), reqwest::Method::POST);
        assert_eq!(req.url().as_str(), ctx.config.endpoint);
        assert_eq!(req.headers()["authorization"], "Bearer sk-test");
        let body = req.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(
            std::str::from_utf8(body).unwrap(),
            r#"{"prompt":"a red fox in snow","n":1}"#
        );
    }

    #[test]
    fn second_generate_is_rejected_while_running() {
        let mut ctx = context(&MemoryStore::with_secret("sk-test"));
        let mut state = with_prompt("a red fox in snow");

        let first = send(&mut state, &mut ctx, MyMessage::Generate);
        assert!(first.task.is_some());
        assert!(state.pending.is_some());
        assert_eq!(state.status, Status::Generating);

        let second = send(&mut state, &mut ctx, MyMessage::Generate);
        assert!(second.task.is_none());
    }

    #[test]
    fn finished_generation_replaces_image() {
        let mut ctx = context(&MemoryStore::with_secret("sk-test"));
        let mut state = with_prompt("a red fox in snow");
        send(&mut state, &mut ctx, MyMessage::Generate);

        let img = image();
        send(&mut state, &mut ctx, MyMessage::Generated(Ok(img.clone())));

        let shown = state.shown.as_ref().expect("image should be shown");
        assert!(Arc::ptr_eq(&shown.image.bitmap, &img.bitmap));
        assert!(state.pending.is_none());
        assert_eq!(state.status, Status::Idle);
    }

    #[test]
    fn failed_generation_keeps_previous_image() {
        let mut ctx = context(&MemoryStore::with_secret("sk-test"));
        let mut state = with_prompt("a red fox in snow");
        let previous = image();
        state.show(previous.clone());

        send(&mut state, &mut ctx, MyMessage::Generate);
        let err = GenerationError::malformed("first image has no url");
        send(&mut state, &mut ctx, MyMessage::Generated(Err(Arc::new(err))));

        let shown = state.shown.as_ref().unwrap();
        assert!(Arc::ptr_eq(&shown.image.bitmap, &previous.bitmap));
        assert!(matches!(&state.status, Status::Failed(e) if e.contains("no url")));
        assert!(state.pending.is_none());
    }

    #[test]
    fn cancelled_generation_result_is_dropped() {
        let mut ctx = context(&MemoryStore::with_secret("sk-test"));
        let mut state = with_prompt("a red fox in snow");
        send(&mut state, &mut ctx, MyMessage::Generate);

        send(&mut state, &mut ctx, MyMessage::Cancel);
        assert!(state.pending.is_none());
        assert_eq!(state.status, Status::Idle);

        send(&mut state, &mut ctx, MyMessage::Generated(Ok(image())));
        assert!(state.shown.is_none());
    }

    #[test]
    fn save_needs_an_image() {
        let mut ctx = context(&MemoryStore::with_secret("sk-test"));
        let mut state = with_prompt("a red fox in snow");

        let cmd = send(&mut state, &mut ctx, MyMessage::Save);

        assert!(cmd.task.is_none());
    }

    #[test]
    fn second_save_is_rejected_while_dialog_is_open() {
        let mut ctx = context(&MemoryStore::with_secret("sk-test"));
        let mut state = with_prompt("a red fox in snow");
        state.show(image());

        let first = send(&mut state, &mut ctx, MyMessage::Save);
        assert!(first.task.is_some());
        assert!(state.saving);

        let second = send(&mut state, &mut ctx, MyMessage::Save);
        assert!(second.task.is_none());

        send(&mut state, &mut ctx, MyMessage::Saved(Ok(None)));
        assert!(!state.saving);
        let again = send(&mut state, &mut ctx, MyMessage::Save);
        assert!(again.task.is_some());
    }

    #[test]
    fn dismissed_save_dialog_is_silent() {
        let mut ctx = context(&MemoryStore::with_secret("sk-test"));
        let mut state = with_prompt("a red fox in snow");

        send(&mut state, &mut ctx, MyMessage::Saved(Ok(None)));
        assert_eq!(state.status, Status::Idle);

        let path = PathBuf::from("/tmp/fox.png");
        send(&mut state, &mut ctx, MyMessage::Saved(Ok(Some(path.clone()))));
        assert_eq!(state.status, Status::Saved(path));
    }

    #[test]
    fn forgetting_the_key_returns_to_key_entry() {
        let store = MemoryStore::with_secret("sk-test");
        let mut ctx = context(&store);
        let mut state = with_prompt("a red fox in snow");

        let ask = send(&mut state, &mut ctx, MyMessage::ForgetKey);
        assert!(format!("{:?}", ask.transition.unwrap()).starts_with("Modal"));
        assert_eq!(store.get().as_deref(), Some("sk-test"));

        let cmd = send(&mut state, &mut ctx, MyMessage::ConfirmForgetKey);

        assert!(format!("{:?}", cmd.transition.unwrap()).starts_with("CredentialEntry"));
        assert_eq!(store.get(), None);
        let restarted = initial_state(&context(&store));
        assert!(format!("{restarted:?}").starts_with("CredentialEntry"));
    }

    #[test]
    fn failed_key_removal_leaves_generation_running() {
        let mut ctx = Context::new(Config::default(), Arc::new(LockedStore)).unwrap();
        let mut state = with_prompt("a red fox in snow");
        send(&mut state, &mut ctx, MyMessage::Generate);

        let res = state.update(MyMessage::ConfirmForgetKey.into(), &mut ctx);

        assert!(res.is_err());
        assert!(state.pending.is_some());
        assert_eq!(state.status, Status::Generating);

        send(&mut state, &mut ctx, MyMessage::Generated(Ok(image())));
        assert!(state.shown.is_some());
        assert_eq!(state.status, Status::Idle);
    }

    #[test]
    fn results_reach_the_generator_behind_a_modal() {
        let mut ctx = context(&MemoryStore::with_secret("sk-test"));
        let mut state = with_prompt("a red fox in snow");
        send(&mut state, &mut ctx, MyMessage::Generate);

        let mut modal = Modal::confirm(State::clone(&state), "Sure?", None, None);
        let cmd = modal
            .update(MyMessage::Generated(Ok(image())).into(), &mut ctx)
            .unwrap();

        assert!(cmd.transition.is_none());
        assert!(format!("{modal:?}").contains("shown: Some"));
    }
}
