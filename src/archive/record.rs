//! Archive record type

use serde::de::{Deserialize, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde_json::value::RawValue;
use std::fmt;

/// One file entry from a backup archive
///
/// The metadata is kept as the exact JSON text found in the archive. It is
/// never interpreted here, only handed back to the remote store.
///
/// Field names match case-insensitively (`Path`, `path`, `PATH`). A missing
/// or null path decodes as empty, missing metadata as `null`, and unknown
/// fields are skipped.
#[derive(Debug, Clone)]
pub struct ArchiveRecord {
    /// Logical path of the file in the store
    pub path: String,

    /// Opaque file metadata (size, hashes, chunk layout, ...)
    pub meta: Box<RawValue>,
}

impl ArchiveRecord {
    /// Build a record from a path and a JSON metadata document
    pub fn new(path: impl Into<String>, meta: &str) -> serde_json::Result<Self> {
        Ok(Self {
            path: path.into(),
            meta: RawValue::from_string(meta.to_string())?,
        })
    }

    /// Metadata as JSON text, ready to be used as a request body
    pub fn meta_json(&self) -> &str {
        self.meta.get()
    }
}

fn null_meta() -> Box<RawValue> {
    RawValue::from_string("null".to_string()).expect("null is valid JSON")
}

impl<'de> Deserialize<'de> for ArchiveRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = ArchiveRecord;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an archive record object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ArchiveRecord, A::Error> {
        let mut path = String::new();
        let mut meta = None;

        // Later duplicates overwrite earlier ones
        while let Some(key) = map.next_key::<String>()? {
            if key.eq_ignore_ascii_case("path") {
                if let Some(value) = map.next_value::<Option<String>>()? {
                    path = value;
                }
            } else if key.eq_ignore_ascii_case("meta") {
                meta = Some(map.next_value::<Box<RawValue>>()?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }

        Ok(ArchiveRecord {
            path,
            meta: meta.unwrap_or_else(null_meta),
        })
    }
}
