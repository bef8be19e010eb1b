use std::fmt;

use tracing::debug;

use crate::error::QueryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Cities,
    Courses,
    Ranking,
}

impl Slot {
    pub fn service_label(self) -> &'static str {
        match self {
            Slot::Cities => "geography",
            Slot::Courses => "course catalogue",
            Slot::Ranking => "ranking",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Slot::Cities => "cities",
            Slot::Courses => "courses",
            Slot::Ranking => "ranking",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl Generation {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult<T> {
    Idle,
    Pending(Generation),
    Succeeded(T),
    Failed(QueryError),
}

impl<T> QueryResult<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryResult::Pending(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryResult::Succeeded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&QueryError> {
        match self {
            QueryResult::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    NotIssued,
    Applied,
    Superseded,
}

#[derive(Debug)]
pub struct QuerySlot<T> {
    slot: Slot,
    generation: Generation,
    result: QueryResult<T>,
}

impl<T> QuerySlot<T> {
    pub fn new(slot: Slot) -> Self {
        Self {
            slot,
            generation: Generation::default(),
            result: QueryResult::Idle,
        }
    }

    pub fn result(&self) -> &QueryResult<T> {
        &self.result
    }

    /// Starts a new request; anything still in flight for this slot becomes stale.
    pub fn begin(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.result = QueryResult::Pending(self.generation);
        self.generation
    }

    pub fn clear(&mut self) {
        self.generation = self.generation.next();
        self.result = QueryResult::Idle;
    }

    pub fn resolve(
        &mut self,
        generation: Generation,
        outcome: Result<T, QueryError>,
    ) -> FetchOutcome {
        if generation != self.generation {
            debug!(
                slot = %self.slot,
                stale = %generation,
                current = %self.generation,
                "query: discarding superseded response"
            );
            return FetchOutcome::Superseded;
        }

        self.result = match outcome {
            Ok(data) => QueryResult::Succeeded(data),
            Err(err) => QueryResult::Failed(err),
        };
        FetchOutcome::Applied
    }
}
