use std::path::Path;
use std::sync::Arc;
use async_trait::async_trait;
use log::info;
use crate::{Result, Error, Student, StudentFields, StudentReader, StudentWriter};
use crate::engine::Persistence;

/// The embedded Student Store.
///
/// There is no cache: every operation loads the collection from the backing file,
/// and every successful mutation rewrites it. Load and save are each serialized by
/// the [`Persistence`] lock, but an operation as a whole is not. Two concurrent
/// mutations can both load the same state, and the later save then discards the
/// earlier one's change.
#[derive(Clone)]
pub struct FileStore {
    persistence: Arc<Persistence>,
}

impl FileStore {
    pub fn new(persistence: Arc<Persistence>) -> Self {
        Self { persistence }
    }

    /// Opens (and if needed initializes) the backing file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Arc::new(Persistence::new(path)?)))
    }

    pub fn load(&self) -> Vec<Student> {
        self.persistence.load()
    }

    pub fn save(&self, students: &[Student]) -> Result<()> {
        self.persistence.save(students)
    }

    pub fn list(&self) -> Vec<Student> {
        self.load()
    }

    pub fn get(&self, id: &str) -> Result<Student> {
        let students = self.load();
        find_by_id(&students, id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Appends a new record built from `fields`.
    ///
    /// `id` and `name` must be present and not blank after trimming; the stored
    /// values are kept as given. Optional fields default to the empty string.
    pub fn create(&self, fields: StudentFields) -> Result<Student> {
        let (id, name) = match (required(fields.id), required(fields.name)) {
            (Some(id), Some(name)) => (id, name),
            _ => return Err(Error::Validation("id and name required".to_string())),
        };

        let mut students = self.load();
        if find_by_id(&students, &id).is_some() {
            return Err(Error::Conflict(id));
        }

        let student = Student {
            id,
            name,
            age: fields.age.unwrap_or_default(),
            course: fields.course.unwrap_or_default(),
            marks: fields.marks.unwrap_or_default(),
        };
        students.push(student.clone());
        self.save(&students)?;

        info!("Created student {}", student.id);
        Ok(student)
    }

    /// Overwrites each supplied mutable field of the record `id`.
    ///
    /// `fields.id` is ignored: a record's id never changes.
    pub fn update(&self, id: &str, fields: StudentFields) -> Result<Student> {
        let mut students = self.load();
        let idx = position(&students, id).ok_or_else(|| Error::NotFound(id.to_string()))?;

        let student = &mut students[idx];
        if let Some(name) = fields.name {
            student.name = name;
        }
        if let Some(age) = fields.age {
            student.age = age;
        }
        if let Some(course) = fields.course {
            student.course = course;
        }
        if let Some(marks) = fields.marks {
            student.marks = marks;
        }
        let updated = student.clone();
        self.save(&students)?;

        info!("Updated student {}", id);
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> Result<Student> {
        let mut students = self.load();
        let idx = position(&students, id).ok_or_else(|| Error::NotFound(id.to_string()))?;

        let removed = students.remove(idx);
        self.save(&students)?;

        info!("Deleted student {}", id);
        Ok(removed)
    }

    async fn run_blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(FileStore) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || op(store))
            .await
            .map_err(|e| Error::Internal(e.to_string()))?
    }
}

/// Returns the first record whose id equals `id`.
pub fn find_by_id<'a>(students: &'a [Student], id: &str) -> Option<&'a Student> {
    students.iter().find(|s| s.has_id(id))
}

fn position(students: &[Student], id: &str) -> Option<usize> {
    students.iter().position(|s| s.has_id(id))
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl StudentReader for FileStore {
    async fn list(&self) -> Result<Vec<Student>> {
        self.run_blocking(|store| Ok(FileStore::list(&store))).await
    }

    async fn get(&self, id: &str) -> Result<Student> {
        let id = id.to_string();
        self.run_blocking(move |store| FileStore::get(&store, &id)).await
    }
}

#[async_trait]
impl StudentWriter for FileStore {
    async fn create(&self, fields: StudentFields) -> Result<Student> {
        self.run_blocking(move |store| FileStore::create(&store, fields)).await
    }

    async fn update(&self, id: &str, fields: StudentFields) -> Result<Student> {
        let id = id.to_string();
        self.run_blocking(move |store| FileStore::update(&store, &id, fields)).await
    }

    async fn delete(&self, id: &str) -> Result<Student> {
        let id = id.to_string();
        self.run_blocking(move |store| FileStore::delete(&store, &id)).await
    }
}
