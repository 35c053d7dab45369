//! Typst-backed mobjects.
//!
//! Build order, leaf first:
//! - [`normalize`]: makes a single fragment safe to render on its own
//! - [`single`]: one string → one flat object, with font-size bookkeeping
//! - [`segment`]: fragment discovery + redistribution of the joint render's leaves
//! - [`math`]: [`MathTypst`], the addressable multi-part object
//! - [`list`] / [`title`]: common layouts on top of [`MathTypst`]

pub mod color_map;
pub mod error;
pub mod list;
pub mod math;
pub mod normalize;
pub mod segment;
pub mod single;
pub mod title;

pub use color_map::{ColorMap, ColorMapKey};
pub use error::{MobjectError, Result};
pub use list::{BulletedList, BulletedListOptions, ListItem};
pub use math::{MathTypst, MathTypstOptions, TextMatch};
pub use normalize::normalize;
pub use single::{
    DEFAULT_FONT_SIZE, SCALE_FACTOR_PER_FONT_POINT, SingleStringMathTypst, SingleStringOptions,
};
pub use title::{Title, TitleOptions};
