//! Stack of renaming frames.
//!
//! The bottom frame is the program (module) frame and is never popped.
//! Lookups walk innermost to outermost; names that resolve nowhere are
//! treated as free references and bound in the program frame.

use crate::namer::{Namers, Role};
use rustc_hash::FxHashMap;

/// What opened a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Program,
    Function,
    Block,
    Catch,
    /// An indentation-delimited definition body opened by a header at
    /// `indent` columns.
    Definition { indent: usize },
}

/// One lexical region's bindings.
#[derive(Debug, Clone)]
pub struct Frame {
    kind: FrameKind,
    bindings: FxHashMap<String, String>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            bindings: FxHashMap::default(),
        }
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    /// A stack holding only the program frame.
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new(FrameKind::Program)],
        }
    }

    /// Open an empty frame.
    pub fn push(&mut self, kind: FrameKind) {
        tracing::trace!(?kind, depth = self.frames.len(), "push frame");
        self.frames.push(Frame::new(kind));
    }

    /// Discard the innermost frame. The program frame stays put.
    pub fn pop(&mut self) -> Option<Frame> {
        if self.frames.len() <= 1 {
            return None;
        }
        let frame = self.frames.pop();
        tracing::trace!(depth = self.frames.len(), "pop frame");
        frame
    }

    /// Pop frames from the top while `pred` holds.
    pub fn pop_while(&mut self, mut pred: impl FnMut(&Frame) -> bool) -> usize {
        let mut popped = 0;
        while self.frames.len() > 1 {
            match self.frames.last() {
                Some(top) if pred(top) => {
                    self.frames.pop();
                    popped += 1;
                }
                _ => break,
            }
        }
        popped
    }

    /// Number of frames, program frame included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn current(&self) -> &Frame {
        // The program frame is never popped, so the stack is never empty.
        &self.frames[self.frames.len() - 1]
    }

    /// Index of the innermost function or program frame, where `var`-style
    /// declarations land.
    pub fn hoist_target(&self) -> usize {
        self.frames
            .iter()
            .rposition(|f| matches!(f.kind, FrameKind::Function | FrameKind::Program))
            .unwrap_or(0)
    }

    /// Bind `name` in the current frame, reusing an existing binding in that
    /// same frame.
    pub fn declare(&mut self, name: &str, role: Role, namers: &mut Namers<'_>) -> String {
        let top = self.frames.len() - 1;
        self.declare_at(top, name, || namers.next(role))
    }

    /// Bind `name` in frame `index`, allocating with `alloc` only when the
    /// frame has no binding for it yet.
    pub fn declare_at(&mut self, index: usize, name: &str, alloc: impl FnOnce() -> String) -> String {
        let index = index.min(self.frames.len() - 1);
        let frame = &mut self.frames[index];
        if let Some(existing) = frame.bindings.get(name) {
            return existing.clone();
        }
        let assigned = alloc();
        frame.bindings.insert(name.to_string(), assigned.clone());
        assigned
    }

    /// Bind `name` to a predetermined `assigned` name in frame `index`,
    /// replacing any previous binding there.
    pub fn bind_at(&mut self, index: usize, name: &str, assigned: &str) {
        let index = index.min(self.frames.len() - 1);
        self.frames[index]
            .bindings
            .insert(name.to_string(), assigned.to_string());
    }

    /// Bind `name` in the current frame.
    pub fn bind(&mut self, name: &str, assigned: &str) {
        let top = self.frames.len() - 1;
        self.bind_at(top, name, assigned);
    }

    /// Look `name` up from the innermost frame outwards.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.frames.iter().rev().find_map(|f| f.get(name))
    }

    /// Resolve `name`, binding it in the program frame when no frame knows it.
    pub fn resolve_or_global(&mut self, name: &str, role: Role, namers: &mut Namers<'_>) -> String {
        if let Some(found) = self.resolve(name) {
            return found.to_string();
        }
        self.declare_at(0, name, || namers.next(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namer::{nato_alphabet, Overflow};

    #[test]
    fn test_declare_is_idempotent_in_same_frame() {
        let words = nato_alphabet();
        let mut namers = Namers::new(&words, Overflow::Cycle);
        let mut scopes = ScopeStack::new();
        let a = scopes.declare("x", Role::Variable, &mut namers);
        let b = scopes.declare("x", Role::Variable, &mut namers);
        assert_eq!(a, b);
        assert_eq!(namers.total_issued(), 1);
    }

    #[test]
    fn test_shadowing_allocates_new_name() {
        let words = nato_alphabet();
        let mut namers = Namers::new(&words, Overflow::Cycle);
        let mut scopes = ScopeStack::new();
        let outer = scopes.declare("x", Role::Variable, &mut namers);
        scopes.push(FrameKind::Function);
        let inner = scopes.declare("x", Role::Variable, &mut namers);
        assert_ne!(outer, inner);
        assert_eq!(scopes.resolve("x"), Some(inner.as_str()));
        scopes.pop();
        assert_eq!(scopes.resolve("x"), Some(outer.as_str()));
    }

    #[test]
    fn test_popped_bindings_are_unreachable() {
        let words = nato_alphabet();
        let mut namers = Namers::new(&words, Overflow::Cycle);
        let mut scopes = ScopeStack::new();
        scopes.push(FrameKind::Block);
        scopes.declare("tmp", Role::Variable, &mut namers);
        scopes.pop();
        assert_eq!(scopes.resolve("tmp"), None);
    }

    #[test]
    fn test_program_frame_survives_pop() {
        let mut scopes = ScopeStack::new();
        assert!(scopes.pop().is_none());
        assert_eq!(scopes.depth(), 1);
    }

    #[test]
    fn test_unresolved_names_bind_globally() {
        let words = nato_alphabet();
        let mut namers = Namers::new(&words, Overflow::Cycle);
        let mut scopes = ScopeStack::new();
        scopes.push(FrameKind::Function);
        let first = scopes.resolve_or_global("config", Role::Variable, &mut namers);
        scopes.pop();
        assert_eq!(scopes.resolve("config"), Some(first.as_str()));
    }

    #[test]
    fn test_hoist_target_skips_blocks() {
        let mut scopes = ScopeStack::new();
        scopes.push(FrameKind::Function);
        scopes.push(FrameKind::Block);
        scopes.push(FrameKind::Block);
        assert_eq!(scopes.hoist_target(), 1);
    }

    #[test]
    fn test_pop_while_by_indent() {
        let mut scopes = ScopeStack::new();
        scopes.push(FrameKind::Definition { indent: 0 });
        scopes.push(FrameKind::Definition { indent: 4 });
        let popped = scopes.pop_while(|f| matches!(f.kind(), FrameKind::Definition { indent } if 4 <= indent));
        assert_eq!(popped, 1);
        assert_eq!(scopes.depth(), 2);
    }
}
