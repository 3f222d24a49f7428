use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::StoreError;
use crate::person::{People, Person};

/// File-backed person store.
///
/// The collection sits behind a single `Mutex`; every operation holds it for
/// its whole lookup, mutate and persist sequence. Share across threads with
/// `Arc<PersonStore>`.
#[derive(Debug)]
pub struct PersonStore {
    path: PathBuf,
    people: Mutex<People>,
}

impl PersonStore {
    /// Open the store at `path`, creating `{"people":[]}` if no file exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let people = match fs::read(&path) {
            Ok(bytes) => decode(&path, &bytes)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let people = People::new();
                write_file(&path, &people)?;
                info!(path = %path.display(), "created empty people file");
                people
            }
            Err(err) => return Err(StoreError::storage(&path, err)),
        };

        info!(path = %path.display(), count = people.len(), "loaded people");

        Ok(PersonStore {
            path,
            people: Mutex::new(people),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock("len")?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock("is_empty")?.is_empty())
    }

    /// Append a new person. Fails with `DuplicateId` if the id is taken.
    ///
    /// If the file write fails the person stays in memory and the error is
    /// returned; the next successful mutation brings the file back in sync.
    pub fn create(&self, person: Person) -> Result<(), StoreError> {
        let mut people = self.lock("create")?;
        if people.position(person.id).is_some() {
            return Err(StoreError::DuplicateId(person.id));
        }

        debug!(id = person.id, "creating person");
        people.people.push(person);
        self.persist(&people)
    }

    /// Snapshot of every person in insertion order.
    pub fn list(&self) -> Result<People, StoreError> {
        Ok(self.lock("list")?.clone())
    }

    pub fn get(&self, id: i64) -> Result<Person, StoreError> {
        let people = self.lock("get")?;
        people
            .iter()
            .find(|person| person.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Replace the record with `person.id` in place. No field merging.
    pub fn update(&self, person: Person) -> Result<(), StoreError> {
        let mut people = self.lock("update")?;
        let index = people
            .position(person.id)
            .ok_or(StoreError::NotFound(person.id))?;

        debug!(id = person.id, index, "updating person");
        people.people[index] = person;
        self.persist(&people)
    }

    /// Remove the record with `id`, keeping the order of the rest.
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut people = self.lock("delete")?;
        let index = people.position(id).ok_or(StoreError::NotFound(id))?;

        debug!(id, index, "deleting person");
        people.people.remove(index);
        self.persist(&people)
    }

    fn lock(&self, operation: &'static str) -> Result<MutexGuard<'_, People>, StoreError> {
        self.people
            .lock()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }

    fn persist(&self, people: &People) -> Result<(), StoreError> {
        write_file(&self.path, people).map_err(|err| {
            warn!(
                path = %self.path.display(),
                error = %err,
                "persist failed, file is behind memory until the next write"
            );
            err
        })?;
        debug!(path = %self.path.display(), count = people.len(), "persisted people");
        Ok(())
    }
}

fn decode(path: &Path, bytes: &[u8]) -> Result<People, StoreError> {
    let people: People =
        serde_json::from_slice(bytes).map_err(|err| StoreError::corrupt(path, err))?;

    let mut seen = HashSet::with_capacity(people.len());
    for person in people.iter() {
        if !seen.insert(person.id) {
            return Err(StoreError::corrupt(
                path,
                format!("duplicate id {}", person.id),
            ));
        }
    }

    Ok(people)
}

/// Write the whole collection to a temp file beside the target, then rename
/// it over the target. The temp file is removed if any step fails.
///
/// A symlinked `path` is resolved first so the link survives; a dangling link
/// is replaced by a regular file. An existing file keeps its permissions.
fn write_file(path: &Path, people: &People) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(people).map_err(|err| StoreError::storage(path, err))?;

    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let existing = fs::metadata(&target).ok().map(|meta| meta.permissions());

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|err| StoreError::storage(path, err))?;
    tmp.write_all(&bytes)
        .map_err(|err| StoreError::storage(path, err))?;
    tmp.as_file()
        .sync_all()
        .map_err(|err| StoreError::storage(path, err))?;

    let applied = match existing {
        Some(permissions) => tmp.as_file().set_permissions(permissions),
        None => set_new_file_permissions(tmp.as_file()),
    };
    applied.map_err(|err| StoreError::storage(path, err))?;

    tmp.persist(&target)
        .map_err(|err| StoreError::storage(path, err.error))?;
    Ok(())
}

#[cfg(unix)]
fn set_new_file_permissions(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_new_file_permissions(_file: &fs::File) -> io::Result<()> {
    Ok(())
}
