use crate::charset::Charset;
use crate::error::CompileError;
use crate::parse::{Anchor, Ast, Repeat};
use crate::Config;
use std::fmt;

// A state id is its index in `Nfa::states`. u32 keeps `State` small and is
// far beyond any size limit we accept.
pub type StateId = u32;

// The unconnected exit of a fragment, filled in once the following fragment
// is known.
const HOLE: StateId = StateId::MAX;

#[derive(PartialEq)]
pub enum State {
    // Consume one char in `set`.
    Char { set: Charset, next: StateId },
    // Epsilon edges to both.
    Split(StateId, StateId),
    Jump(StateId),
    // Epsilon edge taken only where the anchor holds.
    Assert { anchor: Anchor, next: StateId },
    Match,
}

#[derive(PartialEq)]
pub struct Nfa {
    pub states: Vec<State>,
    pub start: StateId,
    pub accept: StateId,
}

impl fmt::Debug for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let mut width = 0;
        let mut n = self.states.len();
        while n > 0 {
            width += 1;
            n >>= 4;
        }
        writeln!(f, "start {:0w$x}", self.start, w = width)?;
        for (i, state) in self.states.iter().enumerate() {
            write!(f, "{:0w$x} ", i, w = width)?;
            match state {
                State::Match => writeln!(f, "match")?,
                State::Char { set, next } => writeln!(f, "char {:?} {:0w$x}", set, next, w = width)?,
                State::Split(x, y) => writeln!(f, "split {:0w$x} {:0w$x}", x, y, w = width)?,
                State::Jump(x) => writeln!(f, "jump {:0w$x}", x, w = width)?,
                State::Assert { anchor: Anchor::Start, next } => {
                    writeln!(f, "assert hat {:0w$x}", next, w = width)?
                }
                State::Assert { anchor: Anchor::End, next } => {
                    writeln!(f, "assert dollar {:0w$x}", next, w = width)?
                }
            }
        }
        Ok(())
    }
}

pub struct Compiler {
    states: Vec<State>,
    size_limit: usize,
}

#[derive(Debug)]
struct Patch {
    entry: StateId,
    holes: Vec<StateId>,
}

impl Compiler {
    fn emit(&mut self, state: State) -> Result<StateId, CompileError> {
        if self.states.len() >= self.size_limit {
            return Err(CompileError::TooLarge { limit: self.size_limit });
        }
        let id = self.states.len() as StateId;
        self.states.push(state);
        Ok(id)
    }

    // Splits are filled left slot first.
    fn fill(&mut self, hole: StateId, id: StateId) {
        match &mut self.states[hole as usize] {
            State::Split(x, _) if *x == HOLE => *x = id,
            State::Split(_, y) if *y == HOLE => *y = id,
            State::Jump(x) | State::Char { next: x, .. } | State::Assert { next: x, .. } => *x = id,
            _ => (),
        }
    }

    // Appends `next` to the fragment built so far in `acc`.
    fn chain(&mut self, acc: &mut Patch, next: Patch) {
        if acc.entry == HOLE {
            acc.entry = next.entry;
        } else {
            for hole in acc.holes.drain(..) {
                self.fill(hole, next.entry);
            }
        }
        acc.holes = next.holes;
    }

    fn compile_single(&mut self, state: State) -> Result<Patch, CompileError> {
        let id = self.emit(state)?;
        Ok(Patch { entry: id, holes: vec![id] })
    }

    fn compile_empty(&mut self) -> Result<Patch, CompileError> {
        self.compile_single(State::Jump(HOLE))
    }

    fn compile_star(&mut self, ast: &Ast) -> Result<Patch, CompileError> {
        let split = self.emit(State::Split(HOLE, HOLE))?;
        let patch = self.compile_ast(ast)?;
        self.fill(split, patch.entry);
        for hole in patch.holes {
            self.fill(hole, split);
        }
        Ok(Patch { entry: split, holes: vec![split] })
    }

    fn compile_plus(&mut self, ast: &Ast) -> Result<Patch, CompileError> {
        let patch = self.compile_ast(ast)?;
        let split = self.emit(State::Split(patch.entry, HOLE))?;
        for hole in patch.holes {
            self.fill(hole, split);
        }
        Ok(Patch { entry: patch.entry, holes: vec![split] })
    }

    fn compile_question(&mut self, ast: &Ast) -> Result<Patch, CompileError> {
        let split = self.emit(State::Split(HOLE, HOLE))?;
        let mut patch = self.compile_ast(ast)?;
        self.fill(split, patch.entry);
        patch.entry = split;
        patch.holes.push(split);
        Ok(patch)
    }

    // ast{min,max}
    //
    // `min` copies of ast, the last one looping back when unbounded,
    // followed by `max - min` optional copies that may each skip to the end.
    fn compile_repeat(&mut self, rep: &Repeat) -> Result<Patch, CompileError> {
        match (rep.min, rep.max) {
            (0, None) => return self.compile_star(&rep.ast),
            (1, None) => return self.compile_plus(&rep.ast),
            (0, Some(1)) => return self.compile_question(&rep.ast),
            (0, Some(0)) => return self.compile_empty(),
            _ => (),
        }

        let mut acc = Patch { entry: HOLE, holes: vec![] };
        for i in 0..rep.min {
            let patch = if rep.max.is_none() && i + 1 == rep.min {
                self.compile_plus(&rep.ast)?
            } else {
                self.compile_ast(&rep.ast)?
            };
            self.chain(&mut acc, patch);
        }

        if let Some(max) = rep.max {
            let mut skips = vec![];
            for _ in rep.min..max {
                let split = self.emit(State::Split(HOLE, HOLE))?;
                self.chain(&mut acc, Patch { entry: split, holes: vec![] });
                let patch = self.compile_ast(&rep.ast)?;
                self.fill(split, patch.entry);
                skips.push(split);
                acc.holes = patch.holes;
            }
            acc.holes.append(&mut skips);
        }
        Ok(acc)
    }

    // ast | ...
    //
    //       split l1, l2
    //  l1:  <states for ast>
    //  l2:  split l3, ...
    //  l3:  <states for the next ast>
    //
    // Every branch exit becomes an exit of the whole alternation.
    fn compile_alter(&mut self, asts: &[Ast]) -> Result<Patch, CompileError> {
        let (last, init) = match asts.split_last() {
            Some(x) => x,
            None => return self.compile_empty(),
        };

        let mut entry = HOLE;
        let mut holes = vec![];
        let mut last_split = HOLE;
        for ast in init {
            let split = self.emit(State::Split(HOLE, HOLE))?;
            if entry == HOLE {
                entry = split;
            } else {
                self.fill(last_split, split);
            }
            last_split = split;
            let mut patch = self.compile_ast(ast)?;
            self.fill(split, patch.entry);
            holes.append(&mut patch.holes);
        }

        let mut patch = self.compile_ast(last)?;
        if entry == HOLE {
            return Ok(patch);
        }
        self.fill(last_split, patch.entry);
        holes.append(&mut patch.holes);
        Ok(Patch { entry, holes })
    }

    fn compile_concat(&mut self, asts: &[Ast]) -> Result<Patch, CompileError> {
        if asts.is_empty() {
            return self.compile_empty();
        }
        let mut acc = Patch { entry: HOLE, holes: vec![] };
        for ast in asts {
            let patch = self.compile_ast(ast)?;
            self.chain(&mut acc, patch);
        }
        Ok(acc)
    }

    fn compile_ast(&mut self, ast: &Ast) -> Result<Patch, CompileError> {
        match ast {
            Ast::Empty => self.compile_empty(),
            Ast::Literal(set) => self.compile_single(State::Char { set: set.clone(), next: HOLE }),
            Ast::Anchor(anchor) => self.compile_single(State::Assert { anchor: *anchor, next: HOLE }),
            Ast::Repeat(rep) => self.compile_repeat(rep),
            Ast::Alter(asts) => self.compile_alter(asts),
            Ast::Concat(asts) => self.compile_concat(asts),
            Ast::Group(ast) => self.compile_ast(ast),
        }
    }

    pub fn compile(ast: &Ast, config: &Config) -> Result<Nfa, CompileError> {
        let mut c = Compiler {
            states: vec![],
            size_limit: config.size_limit,
        };

        let patch = c.compile_ast(ast)?;
        let accept = c.emit(State::Match)?;
        for hole in patch.holes {
            c.fill(hole, accept);
        }

        Ok(Nfa {
            states: c.states,
            start: patch.entry,
            accept,
        })
    }
}
