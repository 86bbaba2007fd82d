//! Person-keyed attribute table.

use std::collections::HashMap;

use ct_core::PersonId;

use crate::{AttributeError, AttributeRecord, AttributeResult};

/// Read-only lookup from person id to [`AttributeRecord`].
///
/// Built by the loader or collected from records directly.  When two records
/// share a person id the later one wins.
#[derive(Clone, Debug, Default)]
pub struct AttributeTable {
    records: HashMap<PersonId, AttributeRecord>,
    columns: Vec<String>,
}

impl AttributeTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self { records: HashMap::new(), columns }
    }

    /// Insert a record and return the one it replaced, if any.
    pub fn insert(&mut self, record: AttributeRecord) -> Option<AttributeRecord> {
        self.records.insert(record.person.clone(), record)
    }

    /// # Errors
    ///
    /// [`AttributeError::PersonNotFound`] if `person` has no row.
    #[inline]
    pub fn lookup(&self, person: &PersonId) -> AttributeResult<&AttributeRecord> {
        self.records
            .get(person)
            .ok_or_else(|| AttributeError::PersonNotFound(person.clone()))
    }

    pub fn get(&self, person: &PersonId) -> Option<&AttributeRecord> {
        self.records.get(person)
    }

    /// Header columns after the key column, in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<AttributeRecord> for AttributeTable {
    fn from_iter<I: IntoIterator<Item = AttributeRecord>>(iter: I) -> Self {
        let mut table = AttributeTable::default();
        for record in iter {
            table.insert(record);
        }
        table
    }
}
