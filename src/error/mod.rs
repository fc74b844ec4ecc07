use crate::config::ConfigError;
use crate::editor::{DrawError, SessionError};
use crate::state::StateError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Draw(#[from] DrawError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("editor type `{editor}` does not crop images")]
    EditingDisabled { editor: &'static str },
}
