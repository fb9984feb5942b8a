//!
//! Open/close state of the nested dropdowns.
//!
//! Only one chain of dropdowns can be open at any time.
//! The chain is stored as the path of the deepest open submenu,
//! all its prefixes are open too.
//!
use log::debug;
use std::collections::HashSet;
use std::fmt::Debug;

/// Toggle behaviour for the dropdowns.
///
/// The menubar registers every submenu path once, before the first
/// click is handled. Only registered dropdowns can be opened.
pub trait DropdownToggle: Debug {
    /// Register a dropdown.
    fn register(&mut self, path: &[usize]);

    /// Is this a known dropdown.
    fn is_registered(&self, path: &[usize]) -> bool;

    /// Open the dropdown at path if it is closed, close it and
    /// everything below if it is open.
    ///
    /// Opening a dropdown closes any sibling chain.
    /// Returns true if anything changed.
    fn toggle(&mut self, path: &[usize]) -> bool;

    /// Close all dropdowns.
    /// Returns true if anything changed.
    fn collapse(&mut self) -> bool;

    /// Is the dropdown at path open.
    fn is_open(&self, path: &[usize]) -> bool;

    /// Path of the deepest open dropdown.
    fn open_path(&self) -> Vec<usize>;

    /// Reset to a previous [open_path](DropdownToggle::open_path).
    fn restore(&mut self, path: &[usize]);
}

/// Default toggle behaviour.
///
/// Only registered paths can be opened.
#[derive(Debug, Default, Clone)]
pub struct DropdownChain {
    registered: HashSet<Vec<usize>>,
    open: Vec<usize>,
}

impl DropdownChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered dropdowns.
    pub fn registered(&self) -> usize {
        self.registered.len()
    }

    /// Nesting depth of the open chain. 0 if nothing is open.
    pub fn depth(&self) -> usize {
        self.open.len()
    }
}

impl DropdownToggle for DropdownChain {
    fn register(&mut self, path: &[usize]) {
        self.registered.insert(path.to_vec());
    }

    fn is_registered(&self, path: &[usize]) -> bool {
        self.registered.contains(path)
    }

    fn toggle(&mut self, path: &[usize]) -> bool {
        if path.is_empty() {
            return false;
        }
        if self.is_open(path) {
            self.open.truncate(path.len() - 1);
            debug!("dropdown close {:?}", path);
            true
        } else if self.registered.contains(path) {
            self.open.clear();
            self.open.extend_from_slice(path);
            debug!("dropdown open {:?}", path);
            true
        } else {
            debug!("dropdown not registered {:?}", path);
            false
        }
    }

    fn collapse(&mut self) -> bool {
        let changed = !self.open.is_empty();
        self.open.clear();
        changed
    }

    fn is_open(&self, path: &[usize]) -> bool {
        !path.is_empty() && self.open.starts_with(path)
    }

    fn open_path(&self) -> Vec<usize> {
        self.open.clone()
    }

    fn restore(&mut self, path: &[usize]) {
        self.open.clear();
        self.open.extend_from_slice(path);
    }
}
