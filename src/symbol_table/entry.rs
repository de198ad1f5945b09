use crate::ast::types::TypeNode;

/// Handle to an entry stored in the `SymbolTable` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

impl EntryId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// What the passes know about a declared name.
///
/// `offset` is negative for frame locals and fields, positive for parameters
/// and the dispatch table slot for methods.
#[derive(Debug, Clone, PartialEq)]
pub struct STentry {
    pub nesting_level: usize,
    pub ty: TypeNode,
    pub offset: i32,
}

impl STentry {
    pub fn new(nesting_level: usize, ty: TypeNode, offset: i32) -> Self {
        STentry {
            nesting_level,
            ty,
            offset,
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self.ty, TypeNode::Method(_))
    }
}

/// Arena owning every entry created while building scopes.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    entries: Vec<STentry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    pub fn add(&mut self, entry: STentry) -> EntryId {
        self.entries.push(entry);
        EntryId(self.entries.len() - 1)
    }

    pub fn get(&self, id: EntryId) -> &STentry {
        &self.entries[id.0]
    }

    /// Class entries get their final type once every member has been laid out.
    pub(crate) fn set_type(&mut self, id: EntryId, ty: TypeNode) {
        self.entries[id.0].ty = ty;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
