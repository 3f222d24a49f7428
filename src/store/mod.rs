//! PersonStore - a JSON file holding every person, mirrored in memory.
//!
//! The whole collection is loaded once on open. Every successful mutation
//! rewrites the full file, so the file always matches the in-memory
//! collection after a call returns `Ok`.
//!
//! ## Example
//!
//! ```no_run
//! use people_store::{Person, PersonStore};
//!
//! let store = PersonStore::open("person.json")?;
//! store.create(Person::new(1, "Ana", 30))?;
//! assert_eq!(store.get(1)?.name, "Ana");
//! # Ok::<(), people_store::StoreError>(())
//! ```

mod error;
mod file;

pub use error::StoreError;
pub use file::PersonStore;
