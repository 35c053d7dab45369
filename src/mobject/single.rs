//! One markup string rendered as one flat object.

use ecow::EcoString;

use crate::mobject::error::{MobjectError, Result};
use crate::mobject::normalize::normalize;
use crate::scene::{ORIGIN, Rgba, VMobject};
use crate::typst::{Environment, PathRenderer, TypstTemplate};

pub const DEFAULT_FONT_SIZE: f32 = 48.0;

/// Scene units per font point, relative to the height of the first render.
pub const SCALE_FACTOR_PER_FONT_POINT: f32 = 1.0 / 960.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SingleStringOptions {
    pub environment: Environment,
    pub template: TypstTemplate,
    pub font_size: f32,
    /// Color given to every leaf the renderer left uncolored (black).
    pub color: Rgba,
    /// Scale to this height instead of applying `font_size`.
    pub height: Option<f32>,
    pub should_center: bool,
    pub organize_left_to_right: bool,
}

impl Default for SingleStringOptions {
    fn default() -> Self {
        Self {
            environment: Environment::Math,
            template: TypstTemplate::default(),
            font_size: DEFAULT_FONT_SIZE,
            color: Rgba::WHITE,
            height: None,
            should_center: true,
            organize_left_to_right: false,
        }
    }
}

/// A single Typst string: a root whose children are the rendered leaf paths.
#[derive(Debug, Clone)]
pub struct SingleStringMathTypst {
    typst_string: EcoString,
    mobject: VMobject,
    /// Height right after rendering; the reference for `font_size`.
    initial_height: f32,
    font_size: f32,
}

impl SingleStringMathTypst {
    pub fn new(
        typst_string: &str,
        options: &SingleStringOptions,
        renderer: &dyn PathRenderer,
    ) -> Result<Self> {
        let expression = normalize(typst_string);
        let leaves =
            renderer.render_paths(&expression, options.environment, &options.template)?;

        let mut mobject =
            VMobject::group("SingleStringMathTypst", leaves).with_source(typst_string);
        mobject.color = options.color;

        if options.should_center {
            mobject.move_to(ORIGIN, ORIGIN);
        }

        let mut this = Self {
            typst_string: typst_string.into(),
            mobject,
            initial_height: 0.0,
            font_size: options.font_size,
        };
        this.init_colors();
        this.initial_height = this.mobject.height();

        match options.height {
            Some(height) => this.mobject.set_height(height),
            None => this.set_font_size(options.font_size)?,
        }

        if options.organize_left_to_right {
            this.mobject.sort_children_by_x();
        }

        Ok(this)
    }

    /// Give every black leaf the root color; any other color came from the markup and stays.
    fn init_colors(&mut self) {
        let color = self.mobject.color;
        for leaf in &mut self.mobject.children {
            if leaf.color == Rgba::BLACK {
                leaf.set_color(color);
            }
        }
    }

    pub fn font_size(&self) -> f32 {
        if self.initial_height <= 0.0 {
            return self.font_size;
        }
        self.mobject.height() / self.initial_height / SCALE_FACTOR_PER_FONT_POINT
    }

    /// Rescale so that `font_size()` reads `font_size`. Degenerate (zero-height) renders
    /// keep their geometry.
    pub fn set_font_size(&mut self, font_size: f32) -> Result<()> {
        if font_size.is_nan() || font_size <= 0.0 {
            return Err(MobjectError::InvalidFontSize(font_size));
        }
        self.font_size = font_size;
        if self.mobject.height() > 0.0 {
            let current = self.font_size();
            self.mobject.scale(font_size / current);
        }
        Ok(())
    }

    /// The string as given, before normalization.
    pub fn typst_string(&self) -> &str {
        &self.typst_string
    }

    pub fn mobject(&self) -> &VMobject {
        &self.mobject
    }

    pub fn mobject_mut(&mut self) -> &mut VMobject {
        &mut self.mobject
    }

    pub fn into_mobject(self) -> VMobject {
        self.mobject
    }
}
