//! One-shot row cursor.

use crate::model::Model;
use crate::value::Row;
use std::collections::VecDeque;
use std::marker::PhantomData;

/// A lazy, single-pass cursor over query results.
///
/// Rows are fetched from the driver when the cursor is created (driver
/// rows cannot outlive their statement); decoding through the model's
/// `transform` hook happens per `next()` call. The cursor is finite,
/// forward-only and not restartable — once exhausted it stays
/// exhausted, and re-querying requires building a new cursor.
pub struct RowCursor<M: Model> {
    rows: VecDeque<Row>,
    exhausted: bool,
    _marker: PhantomData<M>,
}

impl<M: Model> RowCursor<M> {
    /// Wraps fetched rows in a cursor.
    #[must_use]
    pub fn new(rows: Vec<Row>) -> Self {
        let exhausted = rows.is_empty();
        Self {
            rows: rows.into(),
            exhausted,
            _marker: PhantomData,
        }
    }

    /// True once every row has been yielded. Terminal.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Rows not yet yielded.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl<M: Model> Iterator for RowCursor<M> {
    type Item = M;

    fn next(&mut self) -> Option<Self::Item> {
        match self.rows.pop_front() {
            Some(row) => {
                if self.rows.is_empty() {
                    self.exhausted = true;
                }
                Some(M::from_fields(M::transform(row).into_iter().collect()))
            }
            None => {
                self.exhausted = true;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.rows.len(), Some(self.rows.len()))
    }
}
