//! Document templates: how a bare expression becomes a compilable Typst source.

use std::fmt::Write as _;

/// How an expression is embedded into the document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Environment {
    /// Display math: `$ expr $`.
    #[default]
    Math,
    /// Inline math: `$expr$`.
    InlineMath,
    /// Plain markup, no wrapping.
    Text,
    /// Markup centered with `#align(center)[...]`.
    Centered,
}

impl Environment {
    pub fn wrap(self, expression: &str) -> String {
        match self {
            Environment::Math => format!("$ {expression} $"),
            Environment::InlineMath => format!("${expression}$"),
            Environment::Text => expression.to_string(),
            Environment::Centered => format!("#align(center)[{expression}]"),
        }
    }
}

/// A Typst preamble applied to every compiled expression.
///
/// Callers construct one explicitly (usually `TypstTemplate::default()`) and pass it down;
/// nothing reads a process-wide template behind their back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypstTemplate {
    pub preamble: String,
}

impl Default for TypstTemplate {
    fn default() -> Self {
        Self {
            preamble: concat!(
                "#set page(width: auto, height: auto, margin: 0pt, fill: none)\n",
                "#set text(size: 11pt)\n",
            )
            .to_string(),
        }
    }
}

impl TypstTemplate {
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
        }
    }

    /// Append an extra preamble line (e.g. `#set text(font: "New Computer Modern")`).
    pub fn with_line(mut self, line: &str) -> Self {
        if !self.preamble.is_empty() && !self.preamble.ends_with('\n') {
            self.preamble.push('\n');
        }
        let _ = writeln!(self.preamble, "{line}");
        self
    }

    /// Full document source for `expression` in `environment`.
    pub fn document_for(&self, expression: &str, environment: Environment) -> String {
        let mut out = String::with_capacity(self.preamble.len() + expression.len() + 32);
        out.push_str(&self.preamble);
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&environment.wrap(expression));
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environments_wrap_expression() {
        assert_eq!(Environment::Math.wrap("x^2"), "$ x^2 $");
        assert_eq!(Environment::InlineMath.wrap("x"), "$x$");
        assert_eq!(Environment::Text.wrap("hi"), "hi");
        assert_eq!(Environment::Centered.wrap("hi"), "#align(center)[hi]");
    }

    #[test]
    fn document_puts_body_after_preamble() {
        let t = TypstTemplate::new("#set text(size: 20pt)").with_line("#let v = 1");
        let doc = t.document_for("a + b", Environment::Math);
        assert_eq!(doc, "#set text(size: 20pt)\n#let v = 1\n$ a + b $\n");
    }

    #[test]
    fn empty_preamble_is_allowed() {
        let doc = TypstTemplate::new("").document_for("x", Environment::Text);
        assert_eq!(doc, "x\n");
    }
}
