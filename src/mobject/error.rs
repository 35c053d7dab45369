use crate::typst::RenderError;

/// Errors produced while building or addressing Typst mobjects.
#[derive(thiserror::Error, Debug)]
pub enum MobjectError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("font_size must be greater than 0 (got {0})")]
    InvalidFontSize(f32),

    #[error("trying to get the index of a part that is not in this object")]
    NotAPart,

    #[error("invalid list item selector: {0}")]
    InvalidSelector(String),

    #[error("failed to build the fragment split pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, MobjectError>;
