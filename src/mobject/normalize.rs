//! Fragment clean-up before it reaches the renderer.
//!
//! Segmentation can cut an expression anywhere: in the middle of `e^{i tau}`, right after an
//! operator, or leave a fragment that is pure whitespace. Typst would reject most of those
//! pieces on their own, yet every fragment has to be rendered in isolation to count its
//! paths. [`normalize`] patches the usual breakages heuristically. It never fails.

/// Fragments that need an operand to render at all.
const NEEDS_OPERAND: [&str; 4] = ["overline", "overline{", "sqrt", "sqrt("];

/// Endings that leave a dangling sub/superscript or accent.
const DANGLING_SUFFIXES: [&str; 3] = ["_", "^", "dot"];

/// Substitute for an empty fragment: occupies space, renders no paths.
pub const EMPTY_SUBSTITUTE: &str = "#h(1em)";

/// Explicit line break.
pub const LINE_BREAK: &str = "\\ ";

const LEADING_LINE_BREAK_FIX: &str = "\\ #h(1cm) \\ ";

/// Delimiter pairs repaired independently, in this order.
const DELIMITERS: [(char, char); 3] = [('{', '}'), ('(', ')'), ('[', ']')];

/// Make `fragment` safe to hand to the renderer on its own.
pub fn normalize(fragment: &str) -> String {
    let mut out = fragment.trim().to_string();

    let needs_filler = NEEDS_OPERAND.contains(&out.as_str())
        || DANGLING_SUFFIXES.iter().any(|s| out.ends_with(s));
    if needs_filler {
        out.push(' ');
    }

    if out.is_empty() {
        out = EMPTY_SUBSTITUTE.to_string();
    }

    // Keep documents from starting with a blank line.
    if out.starts_with(LINE_BREAK) {
        out = out.replace(LINE_BREAK, LEADING_LINE_BREAK_FIX);
    }

    balance_delimiters(&out)
}

/// Prepend missing openers / append missing closers for `{}`, `()` and `[]`.
///
/// Escaped delimiters (`\{`, `\)`, ...) are literals and do not count.
pub fn balance_delimiters(s: &str) -> String {
    let mut out = s.to_string();

    for (open, close) in DELIMITERS {
        let mut opens = count_unescaped(&out, open);
        let mut closes = count_unescaped(&out, close);

        while closes > opens {
            out.insert(0, open);
            opens += 1;
        }
        while opens > closes {
            out.push(close);
            closes += 1;
        }
    }

    out
}

/// Occurrences of `c` minus occurrences of `\c`.
pub fn count_unescaped(s: &str, c: char) -> usize {
    let total = s.matches(c).count();
    let escaped = s.matches(&format!("\\{c}")).count();
    total.saturating_sub(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_whitespace() {
        assert_eq!(normalize("  a + b \n"), "a + b");
    }

    #[test]
    fn operand_tokens_get_filler() {
        assert_eq!(normalize("sqrt"), "sqrt ");
        assert_eq!(normalize("overline"), "overline ");
        assert_eq!(normalize("x_"), "x_ ");
        assert_eq!(normalize("x^"), "x^ ");
        assert_eq!(normalize("a dot"), "a dot ");
    }

    #[test]
    fn filler_then_balance_for_open_tokens() {
        assert_eq!(normalize("sqrt("), "sqrt( )");
        assert_eq!(normalize("overline{"), "overline{ }");
    }

    #[test]
    fn empty_and_blank_fragments_get_substitute() {
        assert_eq!(normalize(""), EMPTY_SUBSTITUTE);
        assert_eq!(normalize("   "), EMPTY_SUBSTITUTE);
    }

    #[test]
    fn leading_line_break_gets_spacing() {
        assert_eq!(normalize("\\ next"), "\\ #h(1cm) \\ next");
    }

    #[test]
    fn split_exponent_is_repaired_on_both_sides() {
        assert_eq!(normalize("e^{i"), "e^{i}");
        assert_eq!(normalize(" tau} = 1"), "{tau} = 1");
    }

    #[test]
    fn parens_and_brackets_are_repaired() {
        assert_eq!(normalize("f(x"), "f(x)");
        assert_eq!(normalize("x)]"), "[(x)]");
        assert_eq!(normalize("((a"), "((a))");
    }

    #[test]
    fn escaped_delimiters_do_not_count() {
        assert_eq!(normalize("\\{ x"), "\\{ x");
        assert_eq!(normalize("a \\) b"), "a \\) b");
        assert_eq!(count_unescaped("\\{{", '{'), 1);
    }

    #[test]
    fn balanced_input_is_untouched() {
        assert_eq!(normalize("frac(1, n^s)"), "frac(1, n^s)");
        assert_eq!(normalize("#text(red)[x]"), "#text(red)[x]");
    }
}
