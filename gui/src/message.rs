use derive_more::{From, TryInto};

#[derive(Debug, Clone, From, TryInto)]
pub enum Message {
    CredentialEntry(ui_messages::CredentialEntry),
    Generator(ui_messages::Generator),
    MessageDialog(ui_messages::MessageDialog),
    ConfirmDialog(ui_messages::ConfirmDialog),
}

pub mod ui_messages {
    use std::{path::PathBuf, sync::Arc};

    use engine::{ExportError, GeneratedImage, GenerationError};
    use iced::widget::text_editor;

    #[derive(Debug, Clone)]
    pub enum CredentialEntry {
        KeyChanged(String),
        Submit,
    }

    #[derive(Debug, Clone)]
    pub enum Generator {
        UpdatePrompt(text_editor::Action),
        Generate,
        Cancel,
        Generated(Result<GeneratedImage, Arc<GenerationError>>),
        Save,
        /// `None` when the save dialog was dismissed
        Saved(Result<Option<PathBuf>, Arc<ExportError>>),
        ForgetKey,
        ConfirmForgetKey,
    }

    #[derive(Debug, Clone)]
    pub enum MessageDialog {
        Confirm,
        EditAction(text_editor::Action),
    }

    #[derive(Debug, Clone)]
    pub enum ConfirmDialog {
        Yes,
        No,
    }
}
