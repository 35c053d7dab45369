//! `mathtypst` library crate root.
//!
//! Typst expressions rendered into trees of vector paths whose parts stay addressable by
//! the text they came from ("color the `x^2`", "fade everything but item 2").
//!
//! Layers:
//! - [`scene`]: the vector object (`VMobject`) with layout, color and tessellation.
//! - [`typst`]: the renderer boundary and its Typst implementation.
//! - [`mobject`]: normalization, segmentation, addressing, lists and titles.
//!
//! The library never initializes logging; binaries decide their own setup.

pub mod mobject;
pub mod scene;
pub mod typst;

pub use mobject::{
    BulletedList, MathTypst, MathTypstOptions, MobjectError, SingleStringMathTypst, TextMatch,
    Title,
};
pub use scene::{Rgba, VMobject};
pub use typst::{CachingRenderer, PathRenderer, TypstRenderer};

use anyhow::Context as _;

/// Render `parts` as a math object with default options through a fresh Typst renderer.
///
/// Loads fonts on every call; keep a [`TypstRenderer`] around when rendering more than once.
pub fn math_typst<S: AsRef<str>>(parts: &[S]) -> anyhow::Result<MathTypst> {
    let renderer = TypstRenderer::new().context("loading fonts for typst")?;
    MathTypst::new(parts, MathTypstOptions::default(), &renderer)
        .context("building MathTypst")
}
