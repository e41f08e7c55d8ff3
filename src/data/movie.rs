//! Movie entity, its wire input, and its validation rules.

use serde::{Deserialize, Serialize};

use crate::data::clock::Clock;
use crate::data::runtime::Runtime;
use crate::jsonio::Patch;
use crate::validator::{unique, Validator};

/// Year of the first film; earlier years are rejected.
pub const FIRST_FILM_YEAR: i32 = 1888;
pub const MAX_TITLE_BYTES: usize = 500;
pub const MAX_GENRES: usize = 5;

/// A catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub year: i32,
    #[serde(skip_serializing_if = "Runtime::is_zero")]
    pub runtime: Runtime,
    /// `None` when the client never supplied genres (or sent `null`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    pub version: i32,
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

/// Request body for creating or partially updating a movie.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MovieInput {
    pub title: Patch<String>,
    pub year: Patch<i32>,
    pub runtime: Patch<Runtime>,
    pub genres: Patch<Vec<String>>,
}

impl MovieInput {
    /// Build a new movie; absent and null fields start out unset.
    pub fn into_movie(self) -> Movie {
        let mut movie = Movie::default();
        self.apply_to(&mut movie);
        movie
    }

    /// Apply the fields the client sent. `null` clears a field.
    pub fn apply_to(self, movie: &mut Movie) {
        self.title.apply(&mut movie.title);
        self.year.apply(&mut movie.year);
        self.runtime.apply(&mut movie.runtime);
        match self.genres {
            Patch::Absent => {}
            Patch::Null => movie.genres = None,
            Patch::Present(genres) => movie.genres = Some(genres),
        }
    }
}

/// Check every movie invariant, reporting all invalid fields.
pub fn validate_movie(movie: &Movie, clock: &dyn Clock) -> Validator {
    let mut v = Validator::new();

    v.check(!movie.title.is_empty(), "title", "must be provided");
    v.check(
        movie.title.len() <= MAX_TITLE_BYTES,
        "title",
        "must not be more than 500 bytes long",
    );

    v.check(movie.year != 0, "year", "must be provided");
    v.check(movie.year >= FIRST_FILM_YEAR, "year", "must be greater than 1888");
    v.check(
        movie.year <= clock.current_year(),
        "year",
        "must not be in the future",
    );

    v.check(!movie.runtime.is_zero(), "runtime", "must be provided");
    v.check(movie.runtime.minutes() > 0, "runtime", "must be a positive integer");

    match &movie.genres {
        None => v.add_error("genres", "must be provided"),
        Some(genres) => {
            v.check(!genres.is_empty(), "genres", "must contain at least 1 genre");
            v.check(
                genres.len() <= MAX_GENRES,
                "genres",
                "must not contain more than 5 genres",
            );
            v.check(
                genres.iter().all(|genre| !genre.is_empty()),
                "genres",
                "must not contain empty values",
            );
            v.check(unique(genres), "genres", "must not contain duplicate values");
        }
    }

    v
}
