//! Deterministic stand-in for the Typst renderer.
//!
//! One unit box per visible character, placed at the character's column. Whitespace,
//! delimiters, backslashes and `#` directives (up to the next whitespace) render nothing,
//! so an isolated fragment yields exactly the boxes it contributes to the joined string.
//! `!` renders red to stand in for markup-level colors; everything else is black.

#![allow(dead_code)]

use std::sync::Mutex;

use mathtypst::scene::{Rgba, VMobject, rect_path};
use mathtypst::typst::{Environment, PathRenderer, RenderError, TypstTemplate};

pub const FAIL_MARKER: &str = "FAIL";

#[derive(Default)]
pub struct BoxRenderer {
    calls: Mutex<Vec<(String, Environment)>>,
}

impl BoxRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(String, Environment)> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }

    /// Leaf count for `expression`, as the renderer would produce it.
    pub fn count(&self, expression: &str) -> usize {
        self.render_paths(expression, Environment::Math, &TypstTemplate::default())
            .expect("render")
            .len()
    }
}

impl PathRenderer for BoxRenderer {
    fn render_paths(
        &self,
        expression: &str,
        environment: Environment,
        _template: &TypstTemplate,
    ) -> Result<Vec<VMobject>, RenderError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((expression.to_string(), environment));

        if expression.contains(FAIL_MARKER) {
            return Err(RenderError::Compile {
                errors: 1,
                diagnostics: "unknown variable: FAIL".to_string(),
            });
        }

        let mut leaves = Vec::new();
        let mut in_directive = false;
        for (col, c) in expression.chars().enumerate() {
            if c.is_whitespace() {
                in_directive = false;
                continue;
            }
            if c == '#' {
                in_directive = true;
            }
            if in_directive || "{}()[]\\".contains(c) {
                continue;
            }

            let x = col as f32;
            let color = if c == '!' { Rgba::RED } else { Rgba::BLACK };
            leaves.push(VMobject::leaf(
                format!("glyph {c}"),
                rect_path([x, 0.0], [x + 0.8, 1.0]),
                color,
            ));
        }
        Ok(leaves)
    }
}

/// Reverses the order of another renderer's leaves.
pub struct Reversed<R>(pub R);

impl<R: PathRenderer> PathRenderer for Reversed<R> {
    fn render_paths(
        &self,
        expression: &str,
        environment: Environment,
        template: &TypstTemplate,
    ) -> Result<Vec<VMobject>, RenderError> {
        let mut leaves = self.0.render_paths(expression, environment, template)?;
        leaves.reverse();
        Ok(leaves)
    }
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

/// Font sizes are derived from tiny heights, so compare them more loosely.
pub fn approx_font_size(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-2
}
