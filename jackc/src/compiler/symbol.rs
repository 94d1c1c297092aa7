use std::collections::BTreeMap;

use smol_str::SmolStr;

use super::vm::Segment;
use crate::error::{JackError, JackResult};

/// Storage class of a declared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SymbolKind {
    /// Shared by all instances of the class.
    Static = 0,
    /// Per-object instance variable.
    Field = 1,
    /// Subroutine parameter.
    Argument = 2,
    /// Subroutine local variable.
    Local = 3,
}

impl SymbolKind {
    /// Memory segment the symbol's value lives in.
    #[rustfmt::skip]
    pub fn segment(&self) -> Segment {
        match self {
            Self::Static   => Segment::Static,
            Self::Field    => Segment::This,
            Self::Argument => Segment::Argument,
            Self::Local    => Segment::Local,
        }
    }

    /// Static and field symbols live for the whole class.
    #[inline]
    pub fn is_class_scope(&self) -> bool {
        matches!(self, Self::Static | Self::Field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: SmolStr,
    /// Primitive type or class name.
    pub ty: SmolStr,
    pub kind: SymbolKind,
    /// Position of the symbol within its kind, in declaration order.
    pub index: u16,
}

/// Declared names of one class, in two scopes.
///
/// The class scope holds statics and fields for the whole class. The
/// subroutine scope holds arguments and locals, and is emptied by
/// [`SymbolTable::start_subroutine`]. Lookups search the subroutine
/// scope first, so locals shadow fields.
#[derive(Debug, Default)]
pub struct SymbolTable {
    class_scope: BTreeMap<SmolStr, Symbol>,
    subroutine_scope: BTreeMap<SmolStr, Symbol>,
    /// Next free index per kind, indexed by `SymbolKind as usize`.
    counts: [u16; 4],
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a new symbol, assigning it the next index of its kind.
    ///
    /// A name that already exists in the same scope is overwritten. The
    /// previous symbol is returned in that case. Its index stays allocated,
    /// so indices within a kind never collide.
    ///
    /// Fails when the kind has run out of indices, leaving the table unchanged.
    pub fn define(
        &mut self,
        name: impl Into<SmolStr>,
        ty: impl Into<SmolStr>,
        kind: SymbolKind,
    ) -> JackResult<Option<Symbol>> {
        let name = name.into();
        let slot = &mut self.counts[kind as usize];
        let index = *slot;
        *slot = match index.checked_add(1) {
            Some(next) => next,
            None => return Err(JackError::TooManySymbols { name, location: None }),
        };

        let symbol = Symbol {
            name: name.clone(),
            ty: ty.into(),
            kind,
            index,
        };

        if kind.is_class_scope() {
            Ok(self.class_scope.insert(name, symbol))
        } else {
            Ok(self.subroutine_scope.insert(name, symbol))
        }
    }

    /// Discard all arguments and locals, keeping statics and fields.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope.clear();
        self.counts[SymbolKind::Argument as usize] = 0;
        self.counts[SymbolKind::Local as usize] = 0;
    }

    /// Number of symbols defined of the given kind in the active scope.
    #[inline]
    pub fn count(&self, kind: SymbolKind) -> u16 {
        self.counts[kind as usize]
    }

    #[inline]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    pub fn kind_of(&self, name: &str) -> JackResult<SymbolKind> {
        self.lookup(name).map(|symbol| symbol.kind)
    }

    pub fn type_of(&self, name: &str) -> JackResult<&str> {
        self.lookup(name).map(|symbol| symbol.ty.as_str())
    }

    pub fn index_of(&self, name: &str) -> JackResult<u16> {
        self.lookup(name).map(|symbol| symbol.index)
    }

    fn lookup(&self, name: &str) -> JackResult<&Symbol> {
        self.get(name).ok_or_else(|| JackError::Unresolved {
            name: SmolStr::from(name),
            location: None,
        })
    }
}
