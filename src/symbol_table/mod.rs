/// Symbol table module
/// Resolves every name to the declaration it refers to
///
/// Submodules:
/// - entry: `STentry` and the arena that owns them
/// - class_table: Class layouts, virtual tables and the class hierarchy
/// - symbol_table: The pass itself, assigning nesting levels and offsets
pub mod class_table;
pub mod entry;
pub mod symbol_table;
