use crate::compile::{Nfa, State, StateId};
use crate::parse::Anchor;
use crate::Span;
use std::mem;

// The active states of one step, in insertion order, each with the input
// offset its thread started at.
struct Threads {
    // `sparse[id]` is the position of `id` in `dense`, if it is there.
    sparse: Box<[usize]>,
    dense: Vec<StateId>,
    starts: Box<[usize]>,
}

impl Threads {
    fn with_capacity(cap: usize) -> Self {
        Threads {
            sparse: vec![0; cap].into(),
            dense: Vec::with_capacity(cap),
            starts: vec![0; cap].into(),
        }
    }

    // The first insertion of a state wins; later ones are ignored.
    fn insert(&mut self, id: StateId, start: usize) -> bool {
        if self.contains(id) {
            return false;
        }
        self.sparse[id as usize] = self.dense.len();
        self.dense.push(id);
        self.starts[id as usize] = start;
        true
    }

    fn contains(&self, id: StateId) -> bool {
        let n = self.sparse[id as usize];
        self.dense.get(n) == Some(&id)
    }

    fn start_of(&self, id: StateId) -> Option<usize> {
        if self.contains(id) {
            Some(self.starts[id as usize])
        } else {
            None
        }
    }

    fn get(&self, i: usize) -> (StateId, usize) {
        let id = self.dense[i];
        (id, self.starts[id as usize])
    }

    fn len(&self) -> usize {
        self.dense.len()
    }

    fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    fn clear(&mut self) {
        self.dense.clear();
    }
}

// Adds `id` and its epsilon-closure at input offset `at` to `list`.
// Assertions are decided here, against `at`. States already in `list` stop
// the walk, which is what keeps epsilon cycles like `(a*)*` finite.
fn add_thread(
    nfa: &Nfa,
    list: &mut Threads,
    stack: &mut Vec<StateId>,
    id: StateId,
    start: usize,
    at: usize,
    len: usize,
) {
    stack.push(id);
    while let Some(id) = stack.pop() {
        if !list.insert(id, start) {
            continue;
        }
        match &nfa.states[id as usize] {
            State::Jump(next) => stack.push(*next),
            // Push the right branch first so the left one is walked first.
            State::Split(x, y) => {
                stack.push(*y);
                stack.push(*x);
            }
            State::Assert { anchor, next } => {
                let holds = match anchor {
                    Anchor::Start => at == 0,
                    Anchor::End => at == len,
                };
                if holds {
                    stack.push(*next);
                }
            }
            State::Char { .. } | State::Match => (),
        }
    }
}

pub struct Vm<'a> {
    nfa: &'a Nfa,
    clist: Threads,
    nlist: Threads,
    stack: Vec<StateId>,
}

impl<'a> Vm<'a> {
    pub fn new(nfa: &'a Nfa) -> Self {
        let n = nfa.states.len();
        Vm {
            nfa,
            clist: Threads::with_capacity(n),
            nlist: Threads::with_capacity(n),
            stack: Vec::with_capacity(n),
        }
    }

    /// Whether the whole of `s` is matched.
    pub fn run(&mut self, s: &str) -> bool {
        let nfa = self.nfa;
        let Vm { clist, nlist, stack, .. } = self;
        let len = s.len();

        add_thread(nfa, clist, stack, nfa.start, 0, 0, len);
        for (at, c) in s.char_indices() {
            if clist.is_empty() {
                return false;
            }
            let next_at = at + c.len_utf8();
            for i in 0..clist.len() {
                let (id, _) = clist.get(i);
                if let State::Char { set, next } = &nfa.states[id as usize] {
                    if set.has(c) {
                        add_thread(nfa, nlist, stack, *next, 0, next_at, len);
                    }
                }
            }
            mem::swap(clist, nlist);
            nlist.clear();
        }
        clist.contains(nfa.accept)
    }

    /// The leftmost-longest match anywhere in `s`.
    ///
    /// A thread is started at every offset until something matches. Threads
    /// stay ordered by start offset, so the first one to reach a state owns
    /// it with the earliest start. Once a match is known, no thread that
    /// started after it can improve on it and those are dropped.
    pub fn search(&mut self, s: &str) -> Option<Span> {
        let nfa = self.nfa;
        let Vm { clist, nlist, stack, .. } = self;
        let len = s.len();
        let mut matched: Option<Span> = None;
        let mut at = 0;

        loop {
            if matched.is_none() {
                add_thread(nfa, clist, stack, nfa.start, at, at, len);
            }

            if let Some(start) = clist.start_of(nfa.accept) {
                let better = match matched {
                    None => true,
                    Some(m) => start < m.start || (start == m.start && at > m.end),
                };
                if better {
                    matched = Some(Span { start, end: at });
                }
            }

            let c = match s[at..].chars().next() {
                Some(c) => c,
                None => break,
            };
            let next_at = at + c.len_utf8();
            for i in 0..clist.len() {
                let (id, start) = clist.get(i);
                if matches!(matched, Some(m) if start > m.start) {
                    continue;
                }
                if let State::Char { set, next } = &nfa.states[id as usize] {
                    if set.has(c) {
                        add_thread(nfa, nlist, stack, *next, start, next_at, len);
                    }
                }
            }
            mem::swap(clist, nlist);
            nlist.clear();
            at = next_at;

            if clist.is_empty() && matched.is_some() {
                break;
            }
        }
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::Compiler;
    use crate::parse::Parser;
    use crate::Config;

    fn nfa(re: &str) -> Nfa {
        let config = Config::default();
        Compiler::compile(&Parser::parse(re, &config).unwrap(), &config).unwrap()
    }

    fn m(re: &str, s: &str) -> bool {
        Vm::new(&nfa(re)).run(s)
    }

    fn find(re: &str, s: &str) -> Option<(usize, usize)> {
        Vm::new(&nfa(re)).search(s).map(|span| (span.start, span.end))
    }

    macro_rules! assert_match {
        ( $re:expr, $s:expr ) => { assert!(m($re, $s), "{:?} should match {:?}", $re, $s); }
    }

    macro_rules! assert_not_match {
        ( $re:expr, $s:expr ) => { assert!(!m($re, $s), "{:?} should not match {:?}", $re, $s); }
    }

    macro_rules! assert_find {
        ( $re:expr, $s:expr, None ) => { assert_eq!(find($re, $s), None, "{:?} in {:?}", $re, $s); };
        ( $re:expr, $s:expr, $begin:expr, $end:expr ) => {
            assert_eq!(find($re, $s), Some(($begin, $end)), "{:?} in {:?}", $re, $s);
        };
    }

    #[test]
    fn test_match() {
        // The good
        assert_match!(r"", "");
        assert_match!(r"a", "a");
        assert_match!(r"a?", "a");
        assert_match!(r"a?", "");
        assert_match!(r"a*", "");
        assert_match!(r"a*", "a");
        assert_match!(r"a*", "aaaaa");
        assert_match!(r"a+", "a");
        assert_match!(r"a+", "aaaaa");
        assert_match!(r"a|b|c", "a");
        assert_match!(r"a|b|c", "b");
        assert_match!(r"a|b|c", "c");
        assert_match!(r"a|", "");
        assert_match!(r"abcde", "abcde");
        assert_match!(r"(ab)+", "abab");
        assert_match!(r"(a*)*", "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        assert_match!(r"((a*)*)*", "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        assert_match!(r"a*a*a*a*", "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        assert_match!(r"(a?)*a*", "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        assert_match!(r"(a*)?a*", "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        assert_match!(r"(a|b)*d+(ef)?", "d");
        assert_match!(r"(a|b)*d+(ef)?", "def");
        assert_match!(r"(a|b)*d+(ef)?", "ddef");
        assert_match!(r"(a|b)*d+(ef)?", "addef");
        assert_match!(r"(a|b)*d+(ef)?", "aabbaddef");
        assert_match!(r"^abc$", "abc");
        assert_match!(r"^a*$", "aaaaaaa");
        assert_match!(r"a*$", "aaaaaaa");
        assert_match!(r"^$", "");
        assert_match!(r"(^a|b)+", "ab");
        assert_match!(r"(a$|b)+", "ba");
        assert_match!(r"[a-c]+", "abcba");
        assert_match!(r"[^a-c]", "d");
        assert_match!(r".*~", "notes.txt~");
        assert_match!(r"[α-ω]+", "λμ");
        assert_match!(r"日本.", "日本語");
        assert_match!(r"a{2,3}", "aa");
        assert_match!(r"a{2,3}", "aaa");
        assert_match!(r"(ab){2,}", "ababab");
        assert_match!(r"\d{3}-\d{4}", "555-1234");
        assert_match!(r"\w+\s\w+", "hello world");

        // The bad
        assert_not_match!(r"", "a");
        assert_not_match!(r"a", "b");
        assert_not_match!(r"a", "aa");
        assert_not_match!(r"abc", "bca");
        assert_not_match!(r"abc", "xabcx");
        assert_not_match!(r"a+", "");
        assert_not_match!(r"a*", "b");
        assert_not_match!(r"a|b|c", "x");
        assert_not_match!(r"a|b", "ab");
        assert_not_match!(r"(a|b)+", "x");
        assert_not_match!(r"^a*$", "aaaab");
        assert_not_match!(r"a^b", "ab");
        assert_not_match!(r"a$b", "ab");
        assert_not_match!(r"[a-c]", "d");
        assert_not_match!(r"[^a-c]", "b");
        assert_not_match!(r".*~", "notes.txt");
        assert_not_match!(r"a{2,3}", "a");
        assert_not_match!(r"a{2,3}", "aaaa");
    }

    #[test]
    fn test_match_pathological() {
        let s = "a".repeat(10_000);
        assert_not_match!(r"(a*)*b", &s);
        assert_not_match!(r"(a|aa)+b", &s);

        let s = "a".repeat(30);
        assert_match!(r"(a?){30}a{30}", &s);
    }

    #[test]
    fn test_search() {
        assert_find!(r"abc", "xabcx", 1, 4);
        assert_find!(r"abc", "xabx", None);
        assert_find!(r"", "", 0, 0);
        assert_find!(r"", "abc", 0, 0);
        assert_find!(r"a*", "baaa", 0, 0);
        assert_find!(r"a+", "baaa", 1, 4);
        assert_find!(r"a|ab", "xab", 1, 3);
        assert_find!(r"abcd|c", "abcd", 0, 4);
        assert_find!(r"bc|abcd", "abcx", 1, 3);
        assert_find!(r"^abc", "abcx", 0, 3);
        assert_find!(r"^abc", "xabc", None);
        assert_find!(r"abc$", "xabc", 1, 4);
        assert_find!(r"abc$", "abcx", None);
        assert_find!(r"$", "ab", 2, 2);
        assert_find!(r"a^b", "ab", None);
        assert_find!(r".*~", "x~y~z", 0, 4);
        assert_find!(r"本.", "日本語", 3, 9);
    }
}
