//! Movie persistence.
//!
//! # Responsibilities
//! - Define the storage contract handlers depend on
//! - Provide a process-local implementation
//!
//! # Design Decisions
//! - `NotFound` is a variant, so callers branch on it with `match`
//! - Updates carry the version the caller read; a stale version is rejected

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;

use crate::data::movie::Movie;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("edit conflict on record {id}: expected version {expected}, found {actual}")]
    EditConflict { id: i64, expected: i32, actual: i32 },
}

/// Storage operations for movies.
pub trait MovieStore: Send + Sync {
    /// Persist a new movie, assigning its `id` and initial `version`.
    fn insert(&self, movie: &mut Movie) -> Result<(), StoreError>;

    fn get(&self, id: i64) -> Result<Movie, StoreError>;

    /// Replace a stored movie and bump `movie.version`.
    fn update(&self, movie: &mut Movie) -> Result<(), StoreError>;

    fn delete(&self, id: i64) -> Result<(), StoreError>;
}

/// Thread-safe in-memory movie store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMovieStore {
    records: Arc<DashMap<i64, Movie>>,
    last_id: Arc<AtomicI64>,
}

impl InMemoryMovieStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl MovieStore for InMemoryMovieStore {
    fn insert(&self, movie: &mut Movie) -> Result<(), StoreError> {
        movie.id = self.last_id.fetch_add(1, Ordering::Relaxed) + 1;
        movie.version = 1;
        self.records.insert(movie.id, movie.clone());
        tracing::debug!(id = movie.id, "Movie inserted");
        Ok(())
    }

    fn get(&self, id: i64) -> Result<Movie, StoreError> {
        self.records
            .get(&id)
            .map(|record| record.value().clone())
            .ok_or(StoreError::NotFound)
    }

    fn update(&self, movie: &mut Movie) -> Result<(), StoreError> {
        match self.records.entry(movie.id) {
            Entry::Vacant(_) => Err(StoreError::NotFound),
            Entry::Occupied(mut record) => {
                let actual = record.get().version;
                if actual != movie.version {
                    return Err(StoreError::EditConflict {
                        id: movie.id,
                        expected: movie.version,
                        actual,
                    });
                }
                movie.version += 1;
                record.insert(movie.clone());
                tracing::debug!(id = movie.id, version = movie.version, "Movie updated");
                Ok(())
            }
        }
    }

    fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.records
            .remove(&id)
            .map(|_| tracing::debug!(id, "Movie deleted"))
            .ok_or(StoreError::NotFound)
    }
}
