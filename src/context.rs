use crate::error::{GanttError, Result};
use crate::store::GanttStore;

/// Slot through which the presentation layer reaches the store.
///
/// Reading an empty slot is a wiring bug, so [`GanttContext::store`] and
/// [`GanttContext::store_mut`] panic instead of handing out a default.
#[derive(Default)]
pub struct GanttContext {
    store: Option<GanttStore>,
}

impl GanttContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: GanttStore) -> Self {
        Self { store: Some(store) }
    }

    /// Install a store, returning the previous one.
    pub fn install(&mut self, store: GanttStore) -> Option<GanttStore> {
        self.store.replace(store)
    }

    pub fn take(&mut self) -> Option<GanttStore> {
        self.store.take()
    }

    pub fn is_installed(&self) -> bool {
        self.store.is_some()
    }

    pub fn try_store(&self) -> Result<&GanttStore> {
        self.store.as_ref().ok_or(GanttError::MissingContext)
    }

    pub fn try_store_mut(&mut self) -> Result<&mut GanttStore> {
        self.store.as_mut().ok_or(GanttError::MissingContext)
    }

    #[track_caller]
    pub fn store(&self) -> &GanttStore {
        match self.store.as_ref() {
            Some(store) => store,
            None => panic!("{}", GanttError::MissingContext),
        }
    }

    #[track_caller]
    pub fn store_mut(&mut self) -> &mut GanttStore {
        match self.store.as_mut() {
            Some(store) => store,
            None => panic!("{}", GanttError::MissingContext),
        }
    }
}
