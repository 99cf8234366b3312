use crate::errors::PlannerError;
use crate::types::value::DataValue;
use std::iter::Peekable;
use std::vec::IntoIter;

/// Where a finished cursor would resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Continuation {
    /// Nothing was read: resuming starts over.
    Begin,
    /// Every row was read.
    End,
}

/// Forward-only view over the rows of an executed plan.
#[derive(Debug)]
pub struct ResultCursor {
    rows: Peekable<IntoIter<DataValue>>,
    plan_hash: u64,
    /// rows read so far, counting from the position the cursor resumed at
    position: usize,
}

impl ResultCursor {
    pub fn new(rows: Vec<DataValue>, plan_hash: u64) -> Self {
        ResultCursor {
            rows: rows.into_iter().peekable(),
            plan_hash,
            position: 0,
        }
    }

    /// A cursor over rows that follow `position` rows already handed out.
    pub fn starting_at(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn has_next(&mut self) -> bool {
        self.rows.peek().is_some()
    }

    pub fn next_row(&mut self) -> Option<DataValue> {
        let row = self.rows.next()?;
        self.position += 1;
        Some(row)
    }

    /// Hash of the plan the rows came from.
    pub fn plan_hash(&self) -> u64 {
        self.plan_hash
    }

    /// Only available once every row has been read.
    pub fn continuation(&mut self) -> Result<Continuation, PlannerError> {
        if self.has_next() {
            return Err(PlannerError::UnsupportedOperation(
                "continuation before the cursor is exhausted",
            ));
        }

        Ok(if self.position == 0 {
            Continuation::Begin
        } else {
            Continuation::End
        })
    }

    pub fn close(&mut self) {}

    pub fn is_closed(&self) -> bool {
        false
    }
}

impl Iterator for ResultCursor {
    type Item = DataValue;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row()
    }
}
