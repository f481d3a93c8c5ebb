use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One student's record.
///
/// On disk and on the wire a record is a five-element array of strings:
/// `[id, name, age, course, marks]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub age: String,
    pub course: String,
    pub marks: String,
}

impl Student {
    /// Builds a record from a raw JSON row, coercing every field to a string.
    ///
    /// Short rows are padded with empty strings and extra elements are dropped.
    /// Returns `None` for anything that is not an array, and for rows whose id
    /// is missing or blank.
    pub fn from_row(row: &Value) -> Option<Self> {
        let cells = row.as_array()?;
        let field = |i: usize| cells.get(i).map(value_to_string).unwrap_or_default();
        let id = field(0);
        if id.trim().is_empty() {
            return None;
        }
        Some(Self {
            id,
            name: field(1),
            age: field(2),
            course: field(3),
            marks: field(4),
        })
    }

    /// Whether this record's identity matches `id`.
    pub fn has_id(&self, id: &str) -> bool {
        self.id == id
    }
}

impl Serialize for Student {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (&self.id, &self.name, &self.age, &self.course, &self.marks).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Student {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let (id, name, age, course, marks) = <(String, String, String, String, String)>::deserialize(deserializer)?;
        Ok(Self { id, name, age, course, marks })
    }
}

/// Input for creating or updating a record.
///
/// Any JSON scalar is accepted for a field and kept in its string form.
/// `null` and missing keys both mean "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentFields {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub marks: Option<String>,
}

impl StudentFields {
    /// Fields for a new record with the two required values set.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_age(mut self, age: impl Into<String>) -> Self {
        self.age = Some(age.into());
        self
    }

    pub fn with_course(mut self, course: impl Into<String>) -> Self {
        self.course = Some(course.into());
        self
    }

    pub fn with_marks(mut self, marks: impl Into<String>) -> Self {
        self.marks = Some(marks.into());
        self
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_null()).map(|v| value_to_string(&v)))
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
