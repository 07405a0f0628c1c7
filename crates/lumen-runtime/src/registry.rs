//! Module registry
//!
//! Built once at startup from the closed [`ModuleId`] set; registration
//! order is menu order. Modules live for the process lifetime and are only
//! ever reset through `import_state`.

use lumen_core::{Module, ModuleId};

#[derive(Default)]
pub struct ModuleRegistry {
    entries: Vec<Box<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module. Later registrations of the same id are rejected so
    /// menu order stays unambiguous.
    pub fn register(&mut self, module: Box<dyn Module>) {
        debug_assert!(
            !self.entries.iter().any(|m| m.id() == module.id()),
            "module {} registered twice",
            module.id()
        );
        self.entries.push(module);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Menu order.
    pub fn ids(&self) -> Vec<ModuleId> {
        self.entries.iter().map(|m| m.id()).collect()
    }

    pub fn id_at(&self, index: usize) -> Option<ModuleId> {
        self.entries.get(index).map(|m| m.id())
    }

    pub fn get_mut(&mut self, id: ModuleId) -> Option<&mut dyn Module> {
        self.entries
            .iter_mut()
            .find(|m| m.id() == id)
            .map(|m| m.as_mut())
    }

    pub fn get(&self, id: ModuleId) -> Option<&dyn Module> {
        self.entries.iter().find(|m| m.id() == id).map(|m| m.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut dyn Module> {
        self.entries.iter_mut().map(|m| m.as_mut())
    }
}
