//! Transport-agnostic multipart body.
//!
//! The controller builds a [`MultipartBody`] from the live form; a
//! [`Transport`](crate::controller::transport::Transport) turns it into
//! whatever its HTTP client expects.

use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::fs::file_record::{FileRecord, FileSource};

/// Value of one extra field: a scalar, or a list sent as repeated `name[]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Many(Vec<String>),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl<S: Into<String>> From<Vec<S>> for FieldValue {
    fn from(values: Vec<S>) -> Self {
        Self::Many(values.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for FieldValue {
    fn from(values: [S; N]) -> Self {
        Self::Many(values.into_iter().map(Into::into).collect())
    }
}

/// Extra fields passed to `submit`, in insertion order.
pub type ExtraFields = IndexMap<String, FieldValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        filename: CompactString,
        content_type: &'static str,
        source: FileSource,
    },
}

impl Part {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    parts: Vec<Part>,
}

impl MultipartBody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parts.push(Part::Text {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Append what a record contributes: its file part, or, for an already
    /// uploaded file, its hidden fields.
    pub fn record(&mut self, input_name: &str, record: &FileRecord) {
        if record.is_remote() {
            for (name, value) in &record.hidden_fields {
                self.text(name.as_str(), value.as_str());
            }
        } else {
            self.parts.push(Part::File {
                name: input_name.to_string(),
                filename: record.name.clone(),
                content_type: record.media_type,
                source: record.source.clone(),
            });
        }
    }

    /// Append one extra field. Lists become one `name[]` part per item.
    pub fn field(&mut self, name: &str, value: &FieldValue) {
        match value {
            FieldValue::Single(value) => self.text(name, value.as_str()),
            FieldValue::Many(values) => {
                let key: String = format!("{name}[]");
                for value in values {
                    self.text(key.as_str(), value.as_str());
                }
            }
        }
    }

    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Values of every text part with this name, in order.
    pub fn text_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.parts.iter().filter_map(move |part| match part {
            Part::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            Part::File { filename, .. } => Some(filename.as_str()),
            Part::Text { .. } => None,
        })
    }
}

impl IntoIterator for MultipartBody {
    type Item = Part;
    type IntoIter = std::vec::IntoIter<Part>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::file_record::{ExistingFile, FileHandle};

    #[test]
    fn test_list_fields_repeat_with_brackets() {
        let mut body = MultipartBody::new();
        body.field("tags", &FieldValue::from(["a", "b"]));
        body.field("title", &FieldValue::from("hello"));

        let names: Vec<&str> = body.parts().iter().map(Part::name).collect();
        assert_eq!(names, ["tags[]", "tags[]", "title"]);
        assert_eq!(body.text_values("tags[]").collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn test_record_parts() {
        let mut body = MultipartBody::new();
        let local = FileRecord::from_handle(FileHandle::from_bytes("a.pdf", &b"%PDF"[..]));
        let remote = FileRecord::from_existing(ExistingFile {
            name: "b.pdf".into(),
            size: 3,
            link: None,
            fields: vec![("keep[]".into(), "9".to_string())],
        });

        body.record("files[]", &local);
        body.record("files[]", &remote);

        assert_eq!(
            body.parts()[0],
            Part::File {
                name: "files[]".to_string(),
                filename: "a.pdf".into(),
                content_type: "application/pdf",
                source: FileSource::Memory(bytes::Bytes::from_static(b"%PDF")),
            }
        );
        assert_eq!(body.text_values("keep[]").collect::<Vec<_>>(), ["9"]);
        assert_eq!(body.file_names().count(), 1);
    }

    #[test]
    fn test_field_value_deserializes_untagged() {
        let fields: ExtraFields =
            serde_json::from_str(r#"{"tags":["a","b"],"title":"x"}"#).unwrap();

        assert_eq!(fields["tags"], FieldValue::Many(vec!["a".into(), "b".into()]));
        assert_eq!(fields["title"], FieldValue::Single("x".into()));
    }
}
