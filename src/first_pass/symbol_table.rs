/// Insertion-ordered symbol table mapping labels to addresses.
///
/// A `Vec<(String, u16)>` with linear-scan lookups is plenty for LC-3
/// programs, which rarely exceed a few dozen labels.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    entries: Vec<(String, u16)>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn insert(&mut self, label: String, address: u16) {
        if let Some(entry) = self.entries.iter_mut().find(|(l, _)| l == &label) {
            entry.1 = address;
        } else {
            self.entries.push((label, address));
        }
    }

    pub fn get(&self, label: &str) -> Option<u16> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, addr)| *addr)
    }
}
