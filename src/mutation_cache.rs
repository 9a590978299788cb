use crate::energy_table::ParsedTable;
use std::collections::HashMap;

/// Session-wide store of parsed energy tables.
///
/// Keys are unique; insertion order is the display order of the
/// table-selection list. Tables stream in one by one while a job or archive
/// loads, so a missing key means "not yet loaded", never an error. The cache
/// is only ever emptied wholesale, on session reset.
#[derive(Clone, Debug, Default)]
pub struct MutationDataCache {
    tables: HashMap<String, ParsedTable>,
    order: Vec<String>,
}

impl MutationDataCache {
    pub fn put(&mut self, key: &str, table: ParsedTable) {
        if !self.tables.contains_key(key) {
            self.order.push(key.to_string());
        }
        let _ = self.tables.insert(key.to_string(), table);
    }

    pub fn get(&self, key: &str) -> Option<&ParsedTable> {
        self.tables.get(key)
    }

    /// Table keys in insertion order.
    pub fn keys(&self) -> &[String] {
        &self.order
    }

    /// All tables in insertion order, for the combined view.
    pub fn tables(&self) -> Vec<&ParsedTable> {
        self.order
            .iter()
            .filter_map(|key| self.tables.get(key))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.tables.clear();
        self.order.clear();
    }
}
