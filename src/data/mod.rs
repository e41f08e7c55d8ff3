//! Domain model subsystem.
//!
//! # Data Flow
//! ```text
//! MovieInput (decoded wire body)
//!     → movie.rs (adapt to Movie, validate_movie)
//!     → store.rs (MovieStore persistence)
//!     → Movie serialized back into the response envelope
//! ```

pub mod clock;
pub mod movie;
pub mod runtime;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use movie::{validate_movie, Movie, MovieInput};
pub use runtime::{Runtime, RuntimeError};
pub use store::{InMemoryMovieStore, MovieStore, StoreError};
