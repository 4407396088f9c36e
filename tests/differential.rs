// Checks regez against the regex crate on generated patterns.

use proptest::prelude::*;

// Patterns over a tiny alphabet built only from syntax both engines read
// the same way. Every operator wraps its operands in a non-capturing group
// so precedence never differs.
fn pattern() -> impl Strategy<Value = String> {
    let leaf = prop::sample::select(vec!["a", "b", "c", "1", ".", "[ab]", "[^a]", "[a-c]", r"\d"])
        .prop_map(str::to_string);
    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(x, y)| format!("{}{}", x, y)),
            (inner.clone(), inner.clone()).prop_map(|(x, y)| format!("(?:{}|{})", x, y)),
            inner.clone().prop_map(|x| format!("(?:{})*", x)),
            inner.clone().prop_map(|x| format!("(?:{})+", x)),
            inner.clone().prop_map(|x| format!("(?:{})?", x)),
            (inner, 0u32..3, 0u32..3).prop_map(|(x, m, extra)| format!("(?:{}){{{},{}}}", x, m, m + extra)),
        ]
    })
}

fn input() -> impl Strategy<Value = String> {
    "[abc1]{0,8}"
}

fn anchored(pattern: &str) -> regex::Regex {
    regex::Regex::new(&format!("^(?s:(?:{}))$", pattern)).unwrap()
}

proptest! {
    #[test]
    fn whole_match_agrees(p in pattern(), s in input()) {
        let ours = regez::compile(&p).unwrap();
        prop_assert_eq!(ours.matches(&s), anchored(&p).is_match(&s), "pattern {:?} input {:?}", p, s);
    }

    #[test]
    fn search_agrees(p in pattern(), s in input()) {
        let ours = regez::compile(&p).unwrap();
        let theirs = regex::Regex::new(&format!("(?s:{})", p)).unwrap();

        let found = ours.find(&s);
        // Both engines agree on where the leftmost match starts, even though
        // regex prefers the first alternative and we prefer the longest.
        prop_assert_eq!(found.map(|m| m.start), theirs.find(&s).map(|m| m.start()), "pattern {:?} input {:?}", p, s);

        if let Some(span) = found {
            let whole = anchored(&p);
            prop_assert!(whole.is_match(&s[span.range()]));
            for end in span.end + 1..=s.len() {
                prop_assert!(!whole.is_match(&s[span.start..end]), "longer match to {} in {:?}", end, s);
            }
        }
    }

    #[test]
    fn anchors_agree(p in pattern(), s in input(), hat in any::<bool>(), dollar in any::<bool>()) {
        let p = format!("{}(?:{}){}", if hat { "^" } else { "" }, p, if dollar { "$" } else { "" });
        let ours = regez::compile(&p).unwrap();
        let theirs = regex::Regex::new(&format!("(?s:{})", p)).unwrap();
        prop_assert_eq!(ours.is_match_anywhere(&s), theirs.is_match(&s), "pattern {:?} input {:?}", p, s);
    }
}
