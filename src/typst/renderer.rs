//! The renderer boundary: "markup string → flat sequence of leaf paths".
//!
//! Everything above this boundary (normalization, segmentation, addressing) only needs
//! [`PathRenderer`]. [`TypstRenderer`] is the real implementation; tests plug in their own.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::scene::VMobject;
use crate::typst::{
    engine::{self, world::FontStore},
    extract::{self, RenderOptions},
    template::{Environment, TypstTemplate},
};

/// Errors produced at the renderer boundary.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("typst compile failed with {errors} error(s):\n{diagnostics}")]
    Compile { errors: usize, diagnostics: String },

    #[error("no fonts could be loaded (system fonts + typst-assets fallback failed)")]
    NoFonts,
}

/// Turns one expression into an ordered, flat list of leaf paths.
///
/// Implementations must be pure for a given `(expression, environment, template)`:
/// the same input always yields the same number of leaves in the same order. Leaves are
/// returned in renderer units (pt for Typst), y-up, not yet centered or scaled.
pub trait PathRenderer {
    fn render_paths(
        &self,
        expression: &str,
        environment: Environment,
        template: &TypstTemplate,
    ) -> Result<Vec<VMobject>, RenderError>;
}

/// In-process Typst compiler + frame extraction.
#[derive(Debug, Clone)]
pub struct TypstRenderer {
    fonts: Arc<FontStore>,
    options: RenderOptions,
}

impl TypstRenderer {
    /// Load fonts (system first, embedded fallback) and build a renderer.
    pub fn new() -> Result<Self, RenderError> {
        Ok(Self::with_fonts(Arc::new(FontStore::load()?)))
    }

    /// Only Typst's embedded fonts, so output is identical on every machine.
    pub fn embedded() -> Result<Self, RenderError> {
        Ok(Self::with_fonts(Arc::new(FontStore::embedded()?)))
    }

    pub fn with_fonts(fonts: Arc<FontStore>) -> Self {
        Self {
            fonts,
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn font_count(&self) -> usize {
        self.fonts.font_count()
    }
}

impl PathRenderer for TypstRenderer {
    fn render_paths(
        &self,
        expression: &str,
        environment: Environment,
        template: &TypstTemplate,
    ) -> Result<Vec<VMobject>, RenderError> {
        let source = template.document_for(expression, environment);
        let document = engine::compile_document(&self.fonts, &source)?;
        let (leaves, stats) = extract::extract_leaf_paths(&document, &self.options);

        log::debug!(
            "extracted {} leaves from {expression:?} (glyphs={}, shapes={}, lines={}, groups={})",
            leaves.len(),
            stats.glyphs_emitted,
            stats.shapes_emitted,
            stats.lines_emitted,
            stats.groups
        );

        Ok(leaves)
    }
}

type CacheKey = (String, Environment, TypstTemplate);

/// Memoizes any renderer by `(expression, environment, template)`.
///
/// Segmentation renders every fragment once in isolation, and the same fragments
/// (bullets, repeated symbols) come back across objects; this keeps that cheap.
#[derive(Debug)]
pub struct CachingRenderer<R> {
    inner: R,
    cache: Mutex<HashMap<CacheKey, Vec<VMobject>>>,
}

impl<R: PathRenderer> CachingRenderer<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn cached_entries(&self) -> usize {
        self.cache().len()
    }

    // A panic while holding the lock cannot leave a half-written entry behind.
    fn cache(&self) -> MutexGuard<'_, HashMap<CacheKey, Vec<VMobject>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: PathRenderer> PathRenderer for CachingRenderer<R> {
    fn render_paths(
        &self,
        expression: &str,
        environment: Environment,
        template: &TypstTemplate,
    ) -> Result<Vec<VMobject>, RenderError> {
        let key = (expression.to_string(), environment, template.clone());

        if let Some(hit) = self.cache().get(&key) {
            return Ok(hit.clone());
        }

        // Render outside the lock; failures are not cached.
        let leaves = self.inner.render_paths(expression, environment, template)?;
        self.cache().insert(key, leaves.clone());
        Ok(leaves)
    }
}
