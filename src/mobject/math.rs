//! Multi-part Typst objects whose parts can be addressed by their source text.

use ecow::EcoString;

use crate::mobject::color_map::ColorMap;
use crate::mobject::error::{MobjectError, Result};
use crate::mobject::normalize::normalize;
use crate::mobject::segment::{self, FragmentPlan};
use crate::mobject::single::{SingleStringMathTypst, SingleStringOptions};
use crate::scene::{Rgba, VMobject};
use crate::typst::{Environment, PathRenderer};

#[derive(Debug, Clone, PartialEq)]
pub struct MathTypstOptions {
    pub base: SingleStringOptions,
    /// Inserted between fragments when they are joined for the single real render.
    pub arg_separator: String,
    /// Texts forced into fragments of their own.
    pub substrings_to_isolate: Vec<EcoString>,
    /// Split keys as well as colors, applied after construction.
    pub color_map: ColorMap,
}

impl Default for MathTypstOptions {
    fn default() -> Self {
        Self {
            base: SingleStringOptions::default(),
            arg_separator: " ".to_string(),
            substrings_to_isolate: Vec::new(),
            color_map: ColorMap::default(),
        }
    }
}

impl MathTypstOptions {
    /// Plain (non-math) markup, parts glued without a separator, centered.
    pub fn text_mode() -> Self {
        Self {
            base: SingleStringOptions {
                environment: Environment::Centered,
                ..Default::default()
            },
            arg_separator: String::new(),
            ..Default::default()
        }
    }

    pub fn isolate<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EcoString>,
    {
        self.substrings_to_isolate
            .extend(texts.into_iter().map(Into::into));
        self
    }

    pub fn with_color_map(mut self, color_map: ColorMap) -> Self {
        self.color_map = color_map;
        self
    }
}

/// How a query text is compared against a part's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMatch {
    /// Query only has to occur inside the part text.
    pub substring: bool,
    pub case_sensitive: bool,
}

impl Default for TextMatch {
    fn default() -> Self {
        Self {
            substring: true,
            case_sensitive: true,
        }
    }
}

impl TextMatch {
    pub const EXACT: Self = Self {
        substring: false,
        case_sensitive: true,
    };

    pub fn matches(&self, query: &str, text: &str) -> bool {
        if !self.case_sensitive {
            let (query, text) = (query.to_lowercase(), text.to_lowercase());
            return self.compare(&query, &text);
        }
        self.compare(query, text)
    }

    fn compare(&self, query: &str, text: &str) -> bool {
        if self.substring {
            text.contains(query)
        } else {
            text == query
        }
    }
}

/// A Typst expression split into addressable parts.
///
/// The root's children are the parts, one per fragment and in fragment order. Each part
/// records its fragment text as `source` and owns the leaves that fragment produced in the
/// joint render.
#[derive(Debug, Clone)]
pub struct MathTypst {
    inner: SingleStringMathTypst,
    fragments: Vec<EcoString>,
    options: MathTypstOptions,
}

impl MathTypst {
    pub fn new<S: AsRef<str>>(
        parts: &[S],
        options: MathTypstOptions,
        renderer: &dyn PathRenderer,
    ) -> Result<Self> {
        let plan = segment::split_fragments(
            parts,
            &options.substrings_to_isolate,
            &options.color_map.split_keys(),
        )?;

        let mut this = Self::build(&plan, options, renderer).inspect_err(|err| {
            if plan.split_marker_used && matches!(err, MobjectError::Render(_)) {
                log::error!(
                    "failed to render an expression split with `{}`. Empty code blocks are \
                     treated as split points; if that was not intended, put a space inside \
                     the braces (`#{{ }}`). Code blocks themselves cannot be split, so remove \
                     any `{}` that sits inside one.",
                    segment::SPLIT_MARKER,
                    segment::SPLIT_MARKER
                );
            }
        })?;

        let color_map = this.options.color_map.clone();
        this.set_color_by_color_map(&color_map);

        if this.options.base.organize_left_to_right {
            this.inner.mobject_mut().sort_children_by_x();
        }

        Ok(this)
    }

    /// Text-mode object: `Environment::Centered`, no separator.
    pub fn text<S: AsRef<str>>(parts: &[S], renderer: &dyn PathRenderer) -> Result<Self> {
        Self::new(parts, MathTypstOptions::text_mode(), renderer)
    }

    fn build(
        plan: &FragmentPlan,
        options: MathTypstOptions,
        renderer: &dyn PathRenderer,
    ) -> Result<Self> {
        let joined = plan.join(&options.arg_separator);

        // Leaves must stay in render order until they are split up.
        let joint_options = SingleStringOptions {
            organize_left_to_right: false,
            ..options.base.clone()
        };
        let mut inner = SingleStringMathTypst::new(&joined, &joint_options, renderer)?;

        let counts = plan
            .fragments
            .iter()
            .map(|f| {
                let expression = normalize(&f.text);
                renderer
                    .render_paths(&expression, options.base.environment, &options.base.template)
                    .map(|leaves| leaves.len())
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let root = inner.mobject_mut();
        let leaves = std::mem::take(&mut root.children);
        let reassembly = segment::reassemble(
            leaves,
            &plan.fragments,
            &counts,
            segment::separator_correction(&options.arg_separator),
            root.color,
        );
        root.children = reassembly.parts;
        root.name = "MathTypst".to_string();

        Ok(Self {
            inner,
            fragments: plan.texts(),
            options,
        })
    }

    /// The fragment texts, in part order as constructed.
    pub fn typst_strings(&self) -> &[EcoString] {
        &self.fragments
    }

    /// The joined string that was actually rendered.
    pub fn typst_string(&self) -> &str {
        self.inner.typst_string()
    }

    pub fn options(&self) -> &MathTypstOptions {
        &self.options
    }

    pub fn parts(&self) -> &[VMobject] {
        &self.inner.mobject().children
    }

    pub fn part(&self, index: usize) -> Option<&VMobject> {
        self.parts().get(index)
    }

    pub fn part_mut(&mut self, index: usize) -> Option<&mut VMobject> {
        self.inner.mobject_mut().children.get_mut(index)
    }

    pub fn mobject(&self) -> &VMobject {
        self.inner.mobject()
    }

    pub fn mobject_mut(&mut self) -> &mut VMobject {
        self.inner.mobject_mut()
    }

    pub fn into_mobject(self) -> VMobject {
        self.inner.into_mobject()
    }

    pub fn font_size(&self) -> f32 {
        self.inner.font_size()
    }

    pub fn set_font_size(&mut self, font_size: f32) -> Result<()> {
        self.inner.set_font_size(font_size)
    }

    fn matching_indices(&self, text: &str, mode: TextMatch) -> Vec<usize> {
        self.parts()
            .iter()
            .enumerate()
            .filter(|(_, part)| mode.matches(text, part.source_text()))
            .map(|(i, _)| i)
            .collect()
    }

    /// Every part whose source text matches `text`, in part order.
    pub fn find_parts(&self, text: &str, mode: TextMatch) -> Vec<&VMobject> {
        self.matching_indices(text, mode)
            .into_iter()
            .map(|i| &self.parts()[i])
            .collect()
    }

    pub fn find_part(&self, text: &str, mode: TextMatch) -> Option<&VMobject> {
        self.parts()
            .iter()
            .find(|part| mode.matches(text, part.source_text()))
    }

    /// Color every matching part. No match is not an error.
    pub fn set_color_by_text(&mut self, text: &str, color: Rgba, mode: TextMatch) -> &mut Self {
        for i in self.matching_indices(text, mode) {
            self.inner.mobject_mut().children[i].set_color(color);
        }
        self
    }

    /// Set matching parts to `opacity`. With `remaining`, everything else is set to it first.
    pub fn set_opacity_by_text(
        &mut self,
        text: &str,
        opacity: f32,
        remaining: Option<f32>,
        mode: TextMatch,
    ) -> &mut Self {
        if let Some(remaining) = remaining {
            self.inner.mobject_mut().set_opacity(remaining);
        }
        for i in self.matching_indices(text, mode) {
            self.inner.mobject_mut().children[i].set_opacity(opacity);
        }
        self
    }

    /// Apply every entry in order; group keys color each of their texts.
    pub fn set_color_by_color_map(&mut self, color_map: &ColorMap) -> &mut Self {
        for (key, color) in color_map.iter() {
            for text in key.texts() {
                self.set_color_by_text(text, *color, TextMatch::default());
            }
        }
        self
    }

    /// Position of `part` among this object's parts, by identity.
    pub fn index_of_part(&self, part: &VMobject) -> Result<usize> {
        self.parts()
            .iter()
            .position(|p| std::ptr::eq(p, part))
            .ok_or(MobjectError::NotAPart)
    }

    pub fn index_of_part_by_text(&self, text: &str, mode: TextMatch) -> Result<usize> {
        let part = self.find_part(text, mode).ok_or(MobjectError::NotAPart)?;
        self.index_of_part(part)
    }

    /// Reorder parts by source text.
    pub fn sort_alphabetically(&mut self) {
        self.inner
            .mobject_mut()
            .children
            .sort_by(|a, b| a.source_text().cmp(b.source_text()));
    }
}
