//! A regular expression engine built on Thompson's construction.
//!
//! A pattern is compiled once into an immutable NFA. The NFA is then
//! simulated breadth-first against each input, which takes time linear in
//! the input for every pattern. There is no backtracking to blow up.
//!
//! ```
//! let re = regez::compile(r"(ab)+").unwrap();
//! assert!(re.matches("abab"));
//! assert!(!re.matches("aba"));
//! assert_eq!(re.find("xxabx").map(|m| m.range()), Some(2..4));
//! ```
//!
//! Supported syntax: literals, `.`, `[...]`, `[^...]`, `\d \w \s` and
//! their negations, `^`, `$`, `|`, `(...)`, `(?:...)`, `*`, `+`, `?`,
//! `{m}`, `{m,}` and `{m,n}`. Groups only group; nothing is captured.

mod charset;
mod compile;
mod error;
mod parse;
mod vm;

pub use error::CompileError;

use compile::{Compiler, Nfa};
use parse::Parser;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, trace};
use vm::Vm;

const DEFAULT_SIZE_LIMIT: usize = 1 << 17;
const DEFAULT_NEST_LIMIT: u32 = 250;
// Compiling and dropping an `Ast` recurse once per level.
const MAX_NEST_LIMIT: u32 = 1000;

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub size_limit: usize,
    pub nest_limit: u32,
    pub dot_matches_newline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            size_limit: DEFAULT_SIZE_LIMIT,
            nest_limit: DEFAULT_NEST_LIMIT,
            dot_matches_newline: true,
        }
    }
}

/// A match location, as byte offsets into the searched string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Configures and compiles a [`Regex`].
#[derive(Debug, Clone)]
pub struct Builder {
    pattern: String,
    config: Config,
}

impl Builder {
    pub fn new(pattern: &str) -> Self {
        Builder {
            pattern: pattern.to_string(),
            config: Config::default(),
        }
    }

    /// Maximum number of NFA states. Bounded repetitions are expanded, so
    /// this is what stops `a{1000}{1000}` from eating memory.
    pub fn size_limit(&mut self, limit: usize) -> &mut Self {
        self.config.size_limit = limit;
        self
    }

    /// Maximum nesting depth of the pattern. Values above 1000 are clamped
    /// to 1000 so that deep patterns fail to compile instead of overflowing
    /// the stack.
    pub fn nest_limit(&mut self, limit: u32) -> &mut Self {
        self.config.nest_limit = limit.min(MAX_NEST_LIMIT);
        self
    }

    /// Whether `.` matches `\n`. On by default.
    pub fn dot_matches_newline(&mut self, yes: bool) -> &mut Self {
        self.config.dot_matches_newline = yes;
        self
    }

    pub fn build(&self) -> Result<Regex, CompileError> {
        let ast = Parser::parse(&self.pattern, &self.config)?;
        let nfa = Compiler::compile(&ast, &self.config)?;
        debug!(pattern = %self.pattern, states = nfa.states.len(), "compiled regex");
        Ok(Regex {
            pattern: Arc::from(self.pattern.as_str()),
            nfa: Arc::new(nfa),
        })
    }
}

/// A compiled regular expression.
///
/// Cloning is cheap and clones share the automaton. Any number of threads
/// may match against the same `Regex` at once.
#[derive(Clone)]
pub struct Regex {
    pattern: Arc<str>,
    nfa: Arc<Nfa>,
}

impl Regex {
    pub fn new(pattern: &str) -> Result<Regex, CompileError> {
        Builder::new(pattern).build()
    }

    /// Whether the whole of `input` matches.
    pub fn matches(&self, input: &str) -> bool {
        trace!(pattern = %self.pattern, len = input.len(), "whole match");
        Vm::new(&self.nfa).run(input)
    }

    /// The leftmost-longest match anywhere in `input`.
    pub fn find(&self, input: &str) -> Option<Span> {
        trace!(pattern = %self.pattern, len = input.len(), "search");
        Vm::new(&self.nfa).search(input)
    }

    /// Whether any part of `input` matches, like POSIX `regexec`.
    pub fn is_match_anywhere(&self, input: &str) -> bool {
        self.find(input).is_some()
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn state_count(&self) -> usize {
        self.nfa.states.len()
    }
}

impl fmt::Debug for Regex {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "regex {:?}", self.pattern)?;
        write!(f, "{:?}", self.nfa)
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

impl FromStr for Regex {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Regex, CompileError> {
        Regex::new(s)
    }
}

/// Compiles `pattern` with the default limits.
pub fn compile(pattern: &str) -> Result<Regex, CompileError> {
    Regex::new(pattern)
}

/// Whether the whole of `input` matches `compiled`.
pub fn matches(compiled: &Regex, input: &str) -> bool {
    compiled.matches(input)
}

/// Compiles `re` and matches it against `s` once.
pub fn is_match(re: &str, s: &str) -> Result<bool, CompileError> {
    Ok(compile(re)?.matches(s))
}
