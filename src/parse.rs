use crate::charset::Charset;
use crate::error::CompileError;
use crate::Config;
use std::cmp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    End,
}

#[derive(Debug, PartialEq)]
pub struct Repeat {
    pub ast: Box<Ast>,
    pub min: u32,
    // `None` is unbounded.
    pub max: Option<u32>,
}

#[derive(Debug, PartialEq)]
pub enum Ast {
    Empty,
    Literal(Charset),
    Concat(Vec<Ast>),
    Alter(Vec<Ast>),
    Repeat(Repeat),
    Group(Box<Ast>),
    Anchor(Anchor),
}

// What a backslash sequence stands for.
enum Escape {
    Char(char),
    Class(Charset),
}

// Entries on the operand stack. Every `Ast` carries its nesting depth so
// that no tree deeper than the nest limit is ever built.
enum Frame {
    Ast(Ast, u32),
    // Branches of an alternation seen so far, with their maximum depth.
    Alter(Vec<Ast>, u32),
    // Offset of an unclosed '('.
    Lparen(usize),
}

pub struct Parser {
    chars: Vec<char>,
    off: usize,
    stack: Vec<Frame>,
    nest_limit: u32,
    dot_matches_newline: bool,
}

impl Parser {
    fn currchar(&self) -> Option<char> {
        self.chars.get(self.off).copied()
    }

    fn nextchar(&self, off: usize) -> Option<char> {
        self.chars.get(self.off + off).copied()
    }

    fn takechar(&mut self, off: usize) {
        self.off += off
    }

    fn push(&mut self, ast: Ast, depth: u32) -> Result<(), CompileError> {
        if depth > self.nest_limit {
            return Err(CompileError::NestTooDeep { limit: self.nest_limit });
        }
        self.stack.push(Frame::Ast(ast, depth));
        Ok(())
    }

    fn parse_repeat(&mut self, min: u32, max: Option<u32>, len: usize) -> Result<(), CompileError> {
        match self.stack.pop() {
            Some(Frame::Ast(Ast::Anchor(_), _)) | Some(Frame::Alter(..)) | Some(Frame::Lparen(_)) | None => {
                return Err(CompileError::InvalidRepetitionTarget { offset: self.off });
            }
            Some(Frame::Ast(ast, depth)) => {
                let rep = Repeat { ast: Box::new(ast), min, max };
                self.push(Ast::Repeat(rep), depth + 1)?;
            }
        }
        self.takechar(len);
        Ok(())
    }

    // Scans a run of digits starting `i` chars ahead. The value is `None`
    // when it overflows a u32.
    fn scan_number(&self, mut i: usize) -> Option<(Option<u32>, usize)> {
        let start = i;
        let mut n: Option<u32> = Some(0);
        while let Some(d) = self.nextchar(i).and_then(|c| c.to_digit(10)) {
            n = n.and_then(|n| n.checked_mul(10)).and_then(|n| n.checked_add(d));
            i += 1;
        }
        if i == start {
            None
        } else {
            Some((n, i))
        }
    }

    // Looks ahead from a '{' for `{m}`, `{m,}` or `{m,n}` without consuming
    // anything. Returns the bounds and the length of the whole operator, or
    // `None` when the brace is just a literal. Bad numbers are only an error
    // once the closing '}' is seen.
    fn scan_bound(&self) -> Result<Option<(u32, Option<u32>, usize)>, CompileError> {
        let (min, i) = match self.scan_number(1) {
            Some(x) => x,
            None => return Ok(None),
        };
        let (max, len) = match self.nextchar(i) {
            Some('}') => (Some(min), i + 1),
            Some(',') if self.nextchar(i + 1) == Some('}') => (None, i + 2),
            Some(',') => match self.scan_number(i + 1) {
                Some((max, j)) if self.nextchar(j) == Some('}') => (Some(max), j + 1),
                _ => return Ok(None),
            },
            _ => return Ok(None),
        };

        let bad = CompileError::InvalidRepetitionBound { offset: self.off };
        let min = min.ok_or(bad.clone())?;
        let max = match max {
            Some(max) => Some(max.ok_or(bad.clone())?),
            None => None,
        };
        if matches!(max, Some(max) if min > max) {
            return Err(bad);
        }
        Ok(Some((min, max, len)))
    }

    // Pops the terms of the innermost unfinished concatenation, stopping at
    // an alternation or an open paren. An open paren is left on the stack.
    fn collect_concat(&mut self) -> Result<(Ast, u32, Option<(Vec<Ast>, u32)>), CompileError> {
        let mut terms = vec![];
        let mut depth = 0;
        let alter = loop {
            match self.stack.pop() {
                Some(Frame::Ast(ast, d)) => {
                    depth = cmp::max(depth, d);
                    terms.push(ast);
                }
                Some(Frame::Alter(v, d)) => break Some((v, d)),
                Some(paren @ Frame::Lparen(_)) => {
                    self.stack.push(paren);
                    break None;
                }
                None => break None,
            }
        };

        let (concat, depth) = if terms.len() > 1 {
            terms.reverse();
            (Ast::Concat(terms), depth + 1)
        } else {
            match terms.pop() {
                Some(ast) => (ast, depth),
                None => (Ast::Empty, 1),
            }
        };
        if depth > self.nest_limit {
            return Err(CompileError::NestTooDeep { limit: self.nest_limit });
        }
        Ok((concat, depth, alter))
    }

    fn finish(&mut self) -> Result<(Ast, u32), CompileError> {
        let (concat, depth, alter) = self.collect_concat()?;
        match alter {
            None => Ok((concat, depth)),
            Some((mut v, d)) => {
                v.push(concat);
                let depth = cmp::max(d, depth) + 1;
                if depth > self.nest_limit {
                    return Err(CompileError::NestTooDeep { limit: self.nest_limit });
                }
                Ok((Ast::Alter(v), depth))
            }
        }
    }

    fn parse_alter(&mut self) -> Result<(), CompileError> {
        let (concat, depth, alter) = self.collect_concat()?;
        let (mut v, d) = alter.unwrap_or_default();
        v.push(concat);
        let depth = cmp::max(d, depth);
        if depth + 1 > self.nest_limit {
            return Err(CompileError::NestTooDeep { limit: self.nest_limit });
        }
        self.stack.push(Frame::Alter(v, depth));
        self.takechar(1);
        Ok(())
    }

    fn parse_paren(&mut self) -> Result<(), CompileError> {
        let off = self.off;
        if let Some('?') = self.nextchar(1) {
            match self.nextchar(2) {
                Some(':') => self.takechar(3), // take '(' '?' ':'
                _ => return Err(CompileError::UnknownGroupKind { offset: off + 2 }),
            }
        } else {
            self.takechar(1); // take '('
        }
        self.stack.push(Frame::Lparen(off));
        Ok(())
    }

    fn parse_group(&mut self) -> Result<(), CompileError> {
        let (ast, depth) = self.finish()?;
        match self.stack.pop() {
            Some(Frame::Lparen(_)) => self.push(Ast::Group(Box::new(ast)), depth + 1)?,
            _ => return Err(CompileError::UnbalancedParen { offset: self.off }),
        }
        self.takechar(1); // take ')'
        Ok(())
    }

    fn parse_escape(&mut self) -> Result<Escape, CompileError> {
        let off = self.off;
        self.takechar(1); // take '\'
        let esc = match self.currchar() {
            Some('n') => Escape::Char('\n'),
            Some('t') => Escape::Char('\t'),
            Some('r') => Escape::Char('\r'),
            Some('f') => Escape::Char('\x0C'),
            Some('v') => Escape::Char('\x0B'),
            Some('0') => Escape::Char('\0'),
            Some('d') => Escape::Class(Charset::digit()),
            Some('w') => Escape::Class(Charset::word()),
            Some('s') => Escape::Class(Charset::space()),
            Some(c @ 'D') | Some(c @ 'W') | Some(c @ 'S') => {
                let mut cs = match c {
                    'D' => Charset::digit(),
                    'W' => Charset::word(),
                    _ => Charset::space(),
                };
                cs.complement();
                Escape::Class(cs)
            }
            Some(c) if c.is_ascii_punctuation() => Escape::Char(c),
            _ => return Err(CompileError::InvalidEscape { offset: off }),
        };
        self.takechar(1);
        Ok(esc)
    }

    fn parse_class_atom(&mut self) -> Result<Escape, CompileError> {
        match self.currchar() {
            Some('\\') => self.parse_escape(),
            Some(c) => {
                self.takechar(1);
                Ok(Escape::Char(c))
            }
            None => Err(CompileError::InvalidCharacterClass { offset: self.off }),
        }
    }

    fn parse_charset(&mut self) -> Result<(), CompileError> {
        let start = self.off;
        self.takechar(1); // take '['

        let mut complemented = false;
        let mut cs = Charset::new();

        if let Some('^') = self.currchar() {
            complemented = true;
            self.takechar(1);
        }

        // A ']' right after the opening bracket is a literal.
        let mut first = true;
        loop {
            match self.currchar() {
                None => return Err(CompileError::InvalidCharacterClass { offset: start }),
                Some(']') if !first => break,
                _ => (),
            }
            first = false;

            let atom = self.parse_class_atom()?;
            let is_range = self.currchar() == Some('-') && !matches!(self.nextchar(1), Some(']') | None);
            if !is_range {
                match atom {
                    Escape::Char(c) => cs.add(c),
                    Escape::Class(set) => cs.union(&set),
                }
                continue;
            }

            let lb = match atom {
                Escape::Char(c) => c,
                Escape::Class(_) => return Err(CompileError::InvalidCharacterClass { offset: self.off }),
            };
            self.takechar(1); // take '-'
            let hb_off = self.off;
            let hb = match self.parse_class_atom()? {
                Escape::Char(c) => c,
                Escape::Class(_) => return Err(CompileError::InvalidCharacterClass { offset: hb_off }),
            };
            if lb > hb {
                return Err(CompileError::InvalidCharacterClass { offset: hb_off });
            }
            cs.add_range(lb, hb);
        }

        if complemented {
            cs.complement();
        }

        self.takechar(1); // take ']'
        self.push(Ast::Literal(cs), 1)
    }

    fn anychar(&self) -> Charset {
        let mut cs = Charset::any();
        if !self.dot_matches_newline {
            cs.complement();
            cs.add('\n');
            cs.complement();
        }
        cs
    }

    fn parse_regex(&mut self) -> Result<Ast, CompileError> {
        while let Some(curr) = self.currchar() {
            match curr {
                '\\' => match self.parse_escape()? {
                    Escape::Char(c) => self.push(Ast::Literal(Charset::single(c)), 1)?,
                    Escape::Class(cs) => self.push(Ast::Literal(cs), 1)?,
                },
                '*' => self.parse_repeat(0, None, 1)?,
                '+' => self.parse_repeat(1, None, 1)?,
                '?' => self.parse_repeat(0, Some(1), 1)?,
                '{' => match self.scan_bound()? {
                    Some((min, max, len)) => self.parse_repeat(min, max, len)?,
                    None => {
                        self.push(Ast::Literal(Charset::single('{')), 1)?;
                        self.takechar(1);
                    }
                },
                '|' => self.parse_alter()?,
                '(' => self.parse_paren()?,
                ')' => self.parse_group()?,
                '[' => self.parse_charset()?,
                '^' => {
                    self.push(Ast::Anchor(Anchor::Start), 1)?;
                    self.takechar(1);
                }
                '$' => {
                    self.push(Ast::Anchor(Anchor::End), 1)?;
                    self.takechar(1);
                }
                '.' => {
                    let cs = self.anychar();
                    self.push(Ast::Literal(cs), 1)?;
                    self.takechar(1);
                }
                _ => {
                    self.push(Ast::Literal(Charset::single(curr)), 1)?;
                    self.takechar(1);
                }
            }
        }

        let (ast, _) = self.finish()?;
        if let Some(Frame::Lparen(off)) = self.stack.pop() {
            return Err(CompileError::UnbalancedParen { offset: off });
        }
        Ok(ast)
    }

    pub fn parse(pat: &str, config: &Config) -> Result<Ast, CompileError> {
        Parser {
            chars: pat.chars().collect(),
            off: 0,
            stack: vec![],
            nest_limit: config.nest_limit,
            dot_matches_newline: config.dot_matches_newline,
        }
        .parse_regex()
    }
}
