//! Fragment discovery and reassembly.
//!
//! The renderer only hands back a flat list of leaf paths with no link to the source text.
//! To make parts of an expression addressable we:
//!
//! 1. cut the input into fragments ([`split_fragments`]),
//! 2. render the joined string once (done by the caller),
//! 3. render each fragment alone just to learn how many leaves it produces,
//! 4. walk the joint leaves with a cursor and hand each fragment its slice ([`reassemble`]).
//!
//! Step 4 assumes a fragment contributes as many leaves to the joint render as it does
//! alone. Glyphs merged across a fragment boundary break that assumption; the cursor then
//! drifts and we log it instead of guessing.

use ecow::EcoString;
use regex::Regex;

use crate::mobject::error::Result;
use crate::scene::{Aabb2, RIGHT, Rgba, VMobject};

/// Explicit split point. An empty code block renders nothing in Typst.
pub const SPLIT_MARKER: &str = "#{}";

/// One logical piece of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: EcoString,
    /// Position in join order.
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentPlan {
    pub fragments: Vec<Fragment>,
    /// Whether any input contained [`SPLIT_MARKER`].
    pub split_marker_used: bool,
}

impl FragmentPlan {
    pub fn texts(&self) -> Vec<EcoString> {
        self.fragments.iter().map(|f| f.text.clone()).collect()
    }

    pub fn join(&self, separator: &str) -> String {
        let texts: Vec<&str> = self.fragments.iter().map(|f| f.text.as_str()).collect();
        texts.join(separator)
    }
}

/// Cut `parts` into fragments.
///
/// Every part is split on [`SPLIT_MARKER`]; every occurrence of an `isolate` or
/// `color_keys` text then becomes a fragment of its own. Alternatives are tried in the
/// order given (isolate first), leftmost match wins. Empty fragments are dropped.
pub fn split_fragments<S: AsRef<str>>(
    parts: &[S],
    isolate: &[EcoString],
    color_keys: &[EcoString],
) -> Result<FragmentPlan> {
    let mut pieces: Vec<&str> = Vec::new();
    for part in parts {
        pieces.extend(part.as_ref().split(SPLIT_MARKER));
    }
    let split_marker_used = pieces.len() > parts.len();

    let pattern = isolate_pattern(isolate.iter().chain(color_keys))?;

    let mut texts: Vec<&str> = Vec::new();
    for piece in pieces {
        match &pattern {
            Some(re) => texts.extend(split_keeping_matches(re, piece)),
            None => texts.push(piece),
        }
    }

    let fragments: Vec<Fragment> = texts
        .into_iter()
        .filter(|t| !t.is_empty())
        .enumerate()
        .map(|(index, text)| Fragment {
            text: text.into(),
            index,
        })
        .collect();

    log::debug!(
        "split {} part(s) into {} fragment(s) (split marker used: {split_marker_used})",
        parts.len(),
        fragments.len()
    );

    Ok(FragmentPlan {
        fragments,
        split_marker_used,
    })
}

fn isolate_pattern<'a>(keys: impl Iterator<Item = &'a EcoString>) -> Result<Option<Regex>> {
    let alternatives: Vec<String> = keys
        .filter(|k| !k.is_empty())
        .map(|k| regex::escape(k))
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }
    Ok(Some(Regex::new(&alternatives.join("|"))?))
}

/// Like `str::split`, but the matched text is kept as its own item.
fn split_keeping_matches<'t>(re: &Regex, text: &'t str) -> Vec<&'t str> {
    let mut out = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        out.push(&text[last..m.start()]);
        out.push(m.as_str());
        last = m.end();
    }
    out.push(&text[last..]);
    out
}

/// Extra leaves a separator contributes per join point: its non-whitespace characters.
///
/// Exact for single-glyph punctuation like `","`; only a heuristic for longer separators.
pub fn separator_correction(separator: &str) -> usize {
    separator.chars().filter(|c| !c.is_whitespace()).count()
}

/// Result of redistributing the joint leaves over fragments.
#[derive(Debug, Clone)]
pub struct Reassembly {
    /// One part per fragment, in fragment order.
    pub parts: Vec<VMobject>,
    /// Joint leaves no fragment claimed. They are dropped.
    pub unclaimed: usize,
    /// Where the cursor stopped.
    pub cursor: usize,
}

/// Hand each fragment its slice of `leaves`.
///
/// `counts[i]` is the number of leaves fragment `i` produced when rendered alone. The
/// cursor advances by `counts[i] + correction` per fragment. A fragment with no leaves
/// becomes an empty part anchored at the right edge of the joint leaf under the cursor,
/// so it still has a position.
pub fn reassemble(
    leaves: Vec<VMobject>,
    fragments: &[Fragment],
    counts: &[usize],
    correction: usize,
    color: Rgba,
) -> Reassembly {
    debug_assert_eq!(fragments.len(), counts.len());

    let total = leaves.len();
    let leaf_bounds: Vec<Aabb2> = leaves.iter().map(VMobject::bounds).collect();
    let joint_bounds = leaf_bounds
        .iter()
        .fold(Aabb2::empty(), |acc, b| acc.union(*b));
    let mut slots: Vec<Option<VMobject>> = leaves.into_iter().map(Some).collect();

    let mut parts = Vec::with_capacity(fragments.len());
    let mut cursor = 0usize;

    for (fragment, &count) in fragments.iter().zip(counts) {
        let next = cursor + count + correction;
        let name = format!("part[{}]", fragment.index);

        let mut part = if count == 0 {
            let at = if total == 0 {
                joint_bounds.center()
            } else {
                leaf_bounds[cursor.min(total - 1)].critical_point(RIGHT)
            };
            VMobject::anchored(name, at)
        } else {
            let (start, end) = (cursor.min(total), next.min(total));
            let children = slots[start..end].iter_mut().filter_map(Option::take).collect();
            VMobject::group(name, children)
        };
        part.color = color;
        part.source = Some(fragment.text.clone());

        parts.push(part);
        cursor = next;
    }

    let unclaimed = slots.iter().filter(|s| s.is_some()).count();
    let expected = if fragments.is_empty() {
        total
    } else {
        total + correction
    };
    if cursor != expected || unclaimed > 0 {
        log::warn!(
            "reassembly drifted: {} fragment(s), cursor stopped at {cursor} of {total} leaves, {unclaimed} leaf(s) left unassigned",
            fragments.len()
        );
    }

    Reassembly {
        parts,
        unclaimed,
        cursor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::rect_path;

    fn texts(plan: &FragmentPlan) -> Vec<&str> {
        plan.fragments.iter().map(|f| f.text.as_str()).collect()
    }

    fn leaves(n: usize) -> Vec<VMobject> {
        (0..n)
            .map(|i| {
                let x = i as f32 * 2.0;
                VMobject::leaf(format!("leaf{i}"), rect_path([x, 0.0], [x + 1.0, 1.0]), Rgba::WHITE)
            })
            .collect()
    }

    fn fragments(texts: &[&str]) -> Vec<Fragment> {
        texts
            .iter()
            .enumerate()
            .map(|(index, t)| Fragment {
                text: (*t).into(),
                index,
            })
            .collect()
    }

    #[test]
    fn split_marker_cuts_and_is_reported() {
        let plan = split_fragments(&["a #{} + #{} b #{} = #{} c "], &[], &[]).expect("split");
        assert_eq!(texts(&plan), vec!["a ", " + ", " b ", " = ", " c "]);
        assert!(plan.split_marker_used);
    }

    #[test]
    fn plain_parts_pass_through() {
        let plan = split_fragments(&["x^2", "+", "y^2"], &[], &[]).expect("split");
        assert_eq!(texts(&plan), vec!["x^2", "+", "y^2"]);
        assert!(!plan.split_marker_used);
        assert_eq!(plan.join(" "), "x^2 + y^2");
    }

    #[test]
    fn isolate_and_color_keys_become_fragments() {
        let plan = split_fragments(
            &["a^2 + b^2 = c^2"],
            &["a".into()],
            &["c".into(), "".into()],
        )
        .expect("split");
        assert_eq!(texts(&plan), vec!["a", "^2 + b^2 = ", "c", "^2"]);
        assert_eq!(
            plan.fragments.iter().map(|f| f.index).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn isolate_texts_are_literal() {
        let plan = split_fragments(&["f(x) + g(x)"], &["(x)".into()], &[]).expect("split");
        assert_eq!(texts(&plan), vec!["f", "(x)", " + g", "(x)"]);
    }

    #[test]
    fn empty_pieces_are_dropped() {
        let plan = split_fragments(&["", "#{}x#{}"], &["x".into()], &[]).expect("split");
        assert_eq!(texts(&plan), vec!["x"]);
    }

    #[test]
    fn separator_correction_counts_visible_chars() {
        assert_eq!(separator_correction(" "), 0);
        assert_eq!(separator_correction(""), 0);
        assert_eq!(separator_correction(", "), 1);
        assert_eq!(separator_correction(" = "), 1);
    }

    #[test]
    fn reassembly_slices_in_order() {
        let r = reassemble(leaves(5), &fragments(&["ab", "c", "de"]), &[2, 1, 2], 0, Rgba::RED);
        let counts: Vec<usize> = r.parts.iter().map(VMobject::leaf_count).collect();
        assert_eq!(counts, vec![2, 1, 2]);
        assert_eq!(r.parts[1].children[0].name, "leaf2");
        assert_eq!(r.parts[2].source_text(), "de");
        assert_eq!(r.parts[0].color, Rgba::RED);
        assert_eq!(r.unclaimed, 0);
        assert_eq!(r.cursor, 5);
    }

    #[test]
    fn zero_leaf_fragment_anchors_at_right_edge() {
        // "a", "   ", "b": the cursor sits on leaf 1 when the blank fragment comes up.
        let r = reassemble(leaves(2), &fragments(&["a", "   ", "b"]), &[1, 0, 1], 0, Rgba::WHITE);
        let blank = &r.parts[1];
        assert_eq!(blank.leaf_count(), 0);
        assert_eq!(blank.anchor, Some([3.0, 0.5]));
    }

    #[test]
    fn trailing_zero_leaf_fragment_clamps_to_last_leaf() {
        let r = reassemble(leaves(2), &fragments(&["ab", " "]), &[2, 0], 0, Rgba::WHITE);
        assert_eq!(r.parts[1].anchor, Some([3.0, 0.5]));
    }

    #[test]
    fn empty_joint_render_anchors_at_center() {
        let r = reassemble(Vec::new(), &fragments(&[" "]), &[0], 0, Rgba::WHITE);
        assert_eq!(r.parts[0].anchor, Some([0.0, 0.0]));
    }

    #[test]
    fn separator_leaves_go_to_preceding_fragment() {
        // "a,b" renders as three leaves; the comma belongs to "a".
        let r = reassemble(leaves(3), &fragments(&["a", "b"]), &[1, 1], 1, Rgba::WHITE);
        assert_eq!(r.parts[0].leaf_count(), 2);
        assert_eq!(r.parts[1].leaf_count(), 1);
        assert_eq!(r.unclaimed, 0);
    }

    #[test]
    fn short_counts_leave_unclaimed_leaves() {
        let r = reassemble(leaves(4), &fragments(&["a", "b"]), &[1, 1], 0, Rgba::WHITE);
        assert_eq!(r.unclaimed, 2);
        assert_eq!(r.parts.iter().map(VMobject::leaf_count).sum::<usize>(), 2);
    }

    #[test]
    fn overlong_counts_are_clamped() {
        let r = reassemble(leaves(2), &fragments(&["a", "b"]), &[1, 5], 0, Rgba::WHITE);
        assert_eq!(r.parts[1].leaf_count(), 1);
        assert_eq!(r.cursor, 6);
    }
}
