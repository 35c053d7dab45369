//! Typst integration layer.
//!
//! - [`template`]: how a bare expression becomes a full Typst document.
//! - [`engine`]: in-memory `World` + compilation into a `PagedDocument`.
//! - [`extract`]: walk the frame tree and emit flat leaf paths.
//! - [`renderer`]: the [`PathRenderer`] boundary the rest of the crate depends on.

pub mod engine;
pub mod extract;
pub mod renderer;
pub mod template;

pub use renderer::{CachingRenderer, PathRenderer, RenderError, TypstRenderer};
pub use template::{Environment, TypstTemplate};
