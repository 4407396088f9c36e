use std::cmp::Ordering;
use std::fmt;

/// A set of chars stored as sorted, non-overlapping, non-adjacent ranges.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Charset {
    ranges: Vec<(char, char)>,
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "[")?;
        for (i, &(lo, hi)) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            if lo == hi {
                write!(f, "{}", lo.escape_debug())?;
            } else {
                write!(f, "{}-{}", lo.escape_debug(), hi.escape_debug())?;
            }
        }
        write!(f, "]")
    }
}

// Neighbours in the space of Unicode scalar values, skipping surrogates.
fn succ(c: char) -> Option<char> {
    match c {
        '\u{D7FF}' => Some('\u{E000}'),
        char::MAX => None,
        _ => char::from_u32(c as u32 + 1),
    }
}

fn pred(c: char) -> Option<char> {
    match c {
        '\u{E000}' => Some('\u{D7FF}'),
        '\0' => None,
        _ => char::from_u32(c as u32 - 1),
    }
}

impl Charset {
    pub fn new() -> Self {
        Charset { ranges: vec![] }
    }

    pub fn single(c: char) -> Self {
        Charset { ranges: vec![(c, c)] }
    }

    /// Every Unicode scalar value.
    pub fn any() -> Self {
        Charset { ranges: vec![('\0', char::MAX)] }
    }

    #[cfg(test)]
    pub fn from_chars(chars: &[char]) -> Self {
        let mut cs = Charset::new();
        for &c in chars {
            cs.ranges.push((c, c));
        }
        cs.canonicalize();
        cs
    }

    pub fn from_ranges(ranges: &[(char, char)]) -> Self {
        let mut cs = Charset::new();
        cs.ranges.extend(ranges.iter().filter(|(lo, hi)| lo <= hi));
        cs.canonicalize();
        cs
    }

    /// `\d`
    pub fn digit() -> Self {
        Charset::from_ranges(&[('0', '9')])
    }

    /// `\w`
    pub fn word() -> Self {
        Charset::from_ranges(&[('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')])
    }

    /// `\s`
    pub fn space() -> Self {
        Charset::from_ranges(&[('\t', '\r'), (' ', ' ')])
    }

    pub fn add(&mut self, c: char) {
        self.add_range(c, c);
    }

    pub fn add_range(&mut self, lo: char, hi: char) {
        if lo > hi {
            return;
        }
        self.ranges.push((lo, hi));
        self.canonicalize();
    }

    pub fn union(&mut self, other: &Charset) {
        self.ranges.extend_from_slice(&other.ranges);
        self.canonicalize();
    }

    pub fn has(&self, c: char) -> bool {
        self.ranges
            .binary_search_by(|&(lo, hi)| {
                if hi < c {
                    Ordering::Less
                } else if lo > c {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            })
            .is_ok()
    }

    pub fn complement(&mut self) {
        let mut out = Vec::with_capacity(self.ranges.len() + 1);
        let mut next = Some('\0');
        for &(lo, hi) in &self.ranges {
            if let Some(n) = next {
                if n < lo {
                    if let Some(p) = pred(lo) {
                        out.push((n, p));
                    }
                }
            }
            next = succ(hi);
        }
        if let Some(n) = next {
            out.push((n, char::MAX));
        }
        self.ranges = out;
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    #[cfg(test)]
    pub fn ranges(&self) -> &[(char, char)] {
        &self.ranges
    }

    fn canonicalize(&mut self) {
        self.ranges.sort_unstable();
        let mut merged: Vec<(char, char)> = Vec::with_capacity(self.ranges.len());
        for (lo, hi) in self.ranges.drain(..) {
            if let Some(last) = merged.last_mut() {
                // An upper bound of char::MAX swallows everything after it.
                if succ(last.1).map_or(true, |n| lo <= n) {
                    if hi > last.1 {
                        last.1 = hi;
                    }
                    continue;
                }
            }
            merged.push((lo, hi));
        }
        self.ranges = merged;
    }
}
