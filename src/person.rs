//! Person records and the persisted collection wrapper.
//!
//! The on-disk document is `{"people":[...]}` with records in insertion
//! order. Fields missing from incoming JSON take their zero value, so a body
//! without an `id` reaches the positivity check as `id == 0`.

use serde::{Deserialize, Serialize};

/// A single person record. The id is caller-assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub age: i64,
}

impl Person {
    pub fn new(id: i64, name: impl Into<String>, age: i64) -> Self {
        Self {
            id,
            name: name.into(),
            age,
        }
    }
}

/// The ordered collection of people, as stored on disk and returned by
/// `GET /person/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct People {
    #[serde(default)]
    pub people: Vec<Person>,
}

impl People {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Person> {
        self.people.iter()
    }

    /// Index of the first record with this id.
    pub(crate) fn position(&self, id: i64) -> Option<usize> {
        self.people.iter().position(|person| person.id == id)
    }
}

impl From<Vec<Person>> for People {
    fn from(people: Vec<Person>) -> Self {
        Self { people }
    }
}

impl<'a> IntoIterator for &'a People {
    type Item = &'a Person;
    type IntoIter = std::slice::Iter<'a, Person>;

    fn into_iter(self) -> Self::IntoIter {
        self.people.iter()
    }
}
