use color_eyre::Result;
use iced::{
    Length,
    widget::{button, column, row, space, text, text_input},
};
use log::{debug, error, info};

use crate::{
    bold_text,
    context::Context,
    message::{Message, ui_messages::CredentialEntry as MyMessage},
    state::{Generator, Modal, State, StateCommand, StateExt, cmd},
    top_level_container,
};

/// Asks for the OpenAI API key
#[derive(Debug, Clone, Default)]
pub struct CredentialEntry {
    key: String,
}

impl CredentialEntry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl State for CredentialEntry {
    fn update(&mut self, event: Message, ctx: &mut Context) -> Result<StateCommand> {
        // results of an aborted generation may still trickle in
        let Ok(msg) = MyMessage::try_from(event) else {
            debug!("Ignoring message while waiting for an API key");
            return cmd::none();
        };

        use MyMessage::*;
        match msg {
            KeyChanged(val) => {
                self.key = val;
                cmd::none()
            }
            Submit => {
                let key = self.key.trim();
                if key.is_empty() {
                    return cmd::none();
                }

                let ready = Generator::new(key.to_string());
                match ctx.secrets.set(key) {
                    Ok(()) => {
                        info!("API key stored");
                        cmd::transition(ready)
                    }
                    Err(e) => {
                        error!("{e}");
                        cmd::transition(Modal::message(
                            ready.boxed(),
                            "Couldn't store the API key",
                            format!(
                                "{e}\n\nThe key is used for this session, but you will be asked \
                                 for it again on the next start."
                            ),
                        ))
                    }
                }
            }
        }
    }

    fn view<'a>(&'a self, _ctx: &'a Context) -> iced::Element<'a, Message> {
        let submit: Option<Message> =
            (!self.key.trim().is_empty()).then_some(MyMessage::Submit.into());

        top_level_container(
            column![
                bold_text("Enter your OpenAI API Key:").size(20),
                text("The key is kept in your system's credential store."),
                text_input("sk-...", &self.key)
                    .on_input(|s| MyMessage::KeyChanged(s).into())
                    .on_submit_maybe(submit.clone())
                    .secure(true)
                    .width(Length::Fill),
                row![space::horizontal(), button("Continue").on_press_maybe(submit)],
            ]
            .spacing(12)
            .width(Length::Fill),
        )
        .into()
    }

    fn clone(&self) -> Box<dyn State> {
        Box::new(Clone::clone(self))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use engine::{MemoryStore, SecretStore};

    use super::*;
    use crate::{context::Config, state::initial_state};

    fn context(store: &MemoryStore) -> Context {
        Context::new(Config::default(), Arc::new(store.clone())).unwrap()
    }

    fn submit(state: &mut CredentialEntry, ctx: &mut Context, key: &str) -> StateCommand {
        state
            .update(MyMessage::KeyChanged(key.into()).into(), ctx)
            .unwrap();
        state.update(MyMessage::Submit.into(), ctx).unwrap()
    }

    #[test]
    fn starts_here_without_stored_key() {
        let store = MemoryStore::default();
        let state = initial_state(&context(&store));
        assert!(format!("{state:?}").starts_with("CredentialEntry"));
    }

    #[test]
    fn blank_key_is_ignored() {
        let store = MemoryStore::default();
        let mut ctx = context(&store);
        let mut state = CredentialEntry::new();

        let cmd = submit(&mut state, &mut ctx, "   \n");

        assert!(cmd.transition.is_none());
        assert_eq!(store.get(), None);
    }

    #[test]
    fn submitted_key_is_persisted_and_survives_restart() {
        let store = MemoryStore::default();
        let mut ctx = context(&store);
        let mut state = CredentialEntry::new();

        let cmd = submit(&mut state, &mut ctx, "  sk-test\n");

        let next = cmd.transition.expect("should move on to the generator");
        assert!(format!("{next:?}").starts_with("Generator"));
        assert_eq!(store.get().as_deref(), Some("sk-test"));

        let restarted = initial_state(&context(&store));
        assert!(format!("{restarted:?}").starts_with("Generator"));
    }
}
