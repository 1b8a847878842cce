//! Per-type record collections

use std::any::Any;
use std::slice;

/// Ordered records of one type, rebuilt on every load.
#[derive(Debug, Clone, PartialEq)]
pub struct Repository<R> {
    records: Vec<R>,
}

impl<R> Default for Repository<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Repository<R> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// All records, in sheet order.
    pub fn all(&self) -> &[R] {
        &self.records
    }

    pub fn push(&mut self, record: R) {
        self.records.push(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, R> {
        self.records.iter()
    }
}

impl<'a, R> IntoIterator for &'a Repository<R> {
    type Item = &'a R;
    type IntoIter = slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A repository with its record type erased, as held by the workbook.
pub trait AnyRepository {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// An empty repository of the same record type.
    fn fresh(&self) -> Box<dyn AnyRepository>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<R: 'static> AnyRepository for Repository<R> {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn fresh(&self) -> Box<dyn AnyRepository> {
        Box::new(Repository::<R>::new())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
