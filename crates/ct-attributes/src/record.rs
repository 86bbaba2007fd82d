//! One person's attribute row.

use std::collections::HashMap;

use ct_core::{Coord, PersonId};

use crate::{AttributeError, AttributeResult};

/// Column name → raw string value for a single person.
///
/// Values are kept as text; typed access goes through the `require_*`
/// helpers, which name the person and column in their errors.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeRecord {
    pub person: PersonId,
    values:     HashMap<String, String>,
}

impl AttributeRecord {
    pub fn new(person: impl Into<PersonId>) -> Self {
        Self { person: person.into(), values: HashMap::new() }
    }

    /// Build a record from `(column, value)` pairs.
    pub fn from_pairs<K, V>(person: impl Into<PersonId>, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            person: person.into(),
            values: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.values.insert(column.into(), value.into());
    }

    #[inline]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    pub fn require(&self, column: &str) -> AttributeResult<&str> {
        self.get(column).ok_or_else(|| AttributeError::MissingAttribute {
            person:    self.person.clone(),
            attribute: column.to_owned(),
        })
    }

    /// Parse `column` as `f64`.  Surrounding whitespace is ignored.
    pub fn require_f64(&self, column: &str) -> AttributeResult<f64> {
        let raw = self.require(column)?;
        raw.trim().parse::<f64>().map_err(|_| AttributeError::InvalidNumber {
            person:    self.person.clone(),
            attribute: column.to_owned(),
            value:     raw.to_owned(),
        })
    }

    pub fn require_coord(&self, x_column: &str, y_column: &str) -> AttributeResult<Coord> {
        Ok(Coord::new(self.require_f64(x_column)?, self.require_f64(y_column)?))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
