//! Per-class member tables.
//!
//! `ClassLayout` is the one place where the override-or-extend rule lives.
//! The symbol table derives both the class type and the virtual table
//! entries from it, and the code generator writes the heap dispatch table
//! from its method slots, so the three always agree.

use std::collections::HashMap;

use crate::{
    ast::types::{ClassType, TypeNode},
    type_checker::type_rels::TypeRels,
};

use super::entry::EntryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Method,
}

impl MemberKind {
    pub fn name(&self) -> &'static str {
        match self {
            MemberKind::Field => "Field",
            MemberKind::Method => "Method",
        }
    }

    fn other(&self) -> MemberKind {
        match self {
            MemberKind::Field => MemberKind::Method,
            MemberKind::Method => MemberKind::Field,
        }
    }
}

/// A field or method slot, remembering which class declared it last.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSlot {
    pub owner: String,
    pub name: String,
    pub ty: TypeNode,
}

/// Raised when a member would override a member of the other kind.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutClash {
    pub declared: MemberKind,
    pub inherited: MemberKind,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClassLayout {
    pub fields: Vec<LayoutSlot>,
    pub methods: Vec<LayoutSlot>,
}

impl ClassLayout {
    pub fn new() -> Self {
        ClassLayout::default()
    }

    /// Field slot `index` lives at `-(index + 1)` from the object pointer.
    pub fn field_offset(index: usize) -> i32 {
        -(index as i32) - 1
    }

    pub fn offset_of(kind: MemberKind, index: usize) -> i32 {
        match kind {
            MemberKind::Field => ClassLayout::field_offset(index),
            MemberKind::Method => index as i32,
        }
    }

    fn slots(&self, kind: MemberKind) -> &Vec<LayoutSlot> {
        match kind {
            MemberKind::Field => &self.fields,
            MemberKind::Method => &self.methods,
        }
    }

    fn slots_mut(&mut self, kind: MemberKind) -> &mut Vec<LayoutSlot> {
        match kind {
            MemberKind::Field => &mut self.fields,
            MemberKind::Method => &mut self.methods,
        }
    }

    pub fn find(&self, kind: MemberKind, name: &str) -> Option<usize> {
        self.slots(kind).iter().position(|slot| slot.name == name)
    }

    /// Places a member and returns its offset.
    ///
    /// A member whose name is already laid out takes over that slot; a new
    /// one is appended after every slot of its kind.
    pub fn declare(
        &mut self,
        kind: MemberKind,
        owner: &str,
        name: &str,
        ty: TypeNode,
    ) -> Result<i32, LayoutClash> {
        if self.find(kind.other(), name).is_some() {
            return Err(LayoutClash {
                declared: kind,
                inherited: kind.other(),
            });
        }

        let slot = LayoutSlot {
            owner: owner.to_string(),
            name: name.to_string(),
            ty,
        };

        let index = match self.find(kind, name) {
            Some(index) => {
                self.slots_mut(kind)[index] = slot;
                index
            }
            None => {
                self.slots_mut(kind).push(slot);
                self.slots(kind).len() - 1
            }
        };

        Ok(ClassLayout::offset_of(kind, index))
    }

    pub fn class_type(&self) -> ClassType {
        ClassType {
            all_fields: self.fields.iter().map(|slot| slot.ty.clone()).collect(),
            all_methods: self
                .methods
                .iter()
                .filter_map(|slot| slot.ty.as_callable().cloned())
                .collect(),
        }
    }
}

/// Everything the later passes need to know about declared classes.
#[derive(Debug, Default, Clone)]
pub struct ClassTable {
    /// Member name to entry, inherited members included.
    pub virtual_tables: HashMap<String, HashMap<String, EntryId>>,
    pub layouts: HashMap<String, ClassLayout>,
    pub type_rels: TypeRels,
}

impl ClassTable {
    pub fn new() -> Self {
        ClassTable::default()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.layouts.contains_key(class)
    }

    pub fn layout(&self, class: &str) -> Option<&ClassLayout> {
        self.layouts.get(class)
    }

    pub fn member(&self, class: &str, member: &str) -> Option<EntryId> {
        self.virtual_tables.get(class)?.get(member).copied()
    }

    pub fn register(
        &mut self,
        class: &str,
        superclass: Option<&str>,
        layout: ClassLayout,
        virtual_table: HashMap<String, EntryId>,
    ) {
        if let Some(superclass) = superclass {
            self.type_rels.set_super(class, superclass);
        }
        self.layouts.insert(class.to_string(), layout);
        self.virtual_tables
            .insert(class.to_string(), virtual_table);
    }
}
