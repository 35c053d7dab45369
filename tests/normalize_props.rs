mod common;

use common::BoxRenderer;
use mathtypst::mobject::{MathTypst, MathTypstOptions, normalize};
use proptest::prelude::*;

fn balanced(s: &str, open: char, close: char) -> bool {
    s.matches(open).count() == s.matches(close).count()
}

proptest! {
    #[test]
    fn normalize_balances_every_delimiter_pair(s in "[a-z0-9 ^_{}()\\[\\]+=]{0,32}") {
        let out = normalize(&s);
        prop_assert!(balanced(&out, '{', '}'), "{out:?}");
        prop_assert!(balanced(&out, '(', ')'), "{out:?}");
        prop_assert!(balanced(&out, '[', ']'), "{out:?}");
    }

    #[test]
    fn normalize_never_returns_blank(s in "[ a-z{}]{0,16}") {
        prop_assert!(!normalize(&s).trim().is_empty());
    }

    #[test]
    fn normalize_is_idempotent(s in "[a-z ^_{}()\\[\\]]{0,24}") {
        let once = normalize(&s);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn one_part_per_word_and_no_lost_leaves(words in prop::collection::vec("[a-z]{1,6}", 1..8)) {
        let r = BoxRenderer::new();
        let math = MathTypst::new(&words, MathTypstOptions::default(), &r).expect("build");

        prop_assert_eq!(math.parts().len(), words.len());
        for (part, word) in math.parts().iter().zip(&words) {
            prop_assert_eq!(part.source_text(), word.as_str());
            prop_assert_eq!(part.leaf_count(), word.len());
        }
        let joint = r.count(&normalize(&words.join(" ")));
        prop_assert_eq!(math.mobject().leaf_count(), joint);
    }
}
