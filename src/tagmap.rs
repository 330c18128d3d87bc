use std::collections::BTreeMap;
use std::fmt;

/// The canonical tag fields this crate exposes, in table order. The ID3
/// frame-id tables map positionally onto this list.
pub const FIELD_NAMES: [&str; 7] = [
    "album",
    "artist",
    "comment",
    "date",
    "genre",
    "title",
    "tracknumber",
];

/// A tag value as it comes off disk: plain text for most fields, an
/// integer for an ID3v1 track number, an ordered list for a multi-code
/// ID3v2.2/2.3 genre frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Text(String),
    Int(u32),
    List(Vec<String>),
}

impl fmt::Display for TagValue {
    /// Stringified form used when serializing: integers in decimal, lists
    /// joined with `/`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Text(s) => f.write_str(s),
            TagValue::Int(n) => write!(f, "{}", n),
            TagValue::List(items) => f.write_str(&items.join("/")),
        }
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        TagValue::Text(s.to_string())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        TagValue::Text(s)
    }
}

impl From<u32> for TagValue {
    fn from(n: u32) -> Self {
        TagValue::Int(n)
    }
}

impl From<Vec<String>> for TagValue {
    fn from(items: Vec<String>) -> Self {
        TagValue::List(items)
    }
}

/// A mapping whose keys are lower-cased on every operation. Last write wins
/// for keys differing only in case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseInsensitiveMap {
    store: BTreeMap<String, TagValue>,
}

impl CaseInsensitiveMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<TagValue>) {
        self.store.insert(key.to_lowercase(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.store.get(&key.to_lowercase())
    }

    pub fn remove(&mut self, key: &str) -> Option<TagValue> {
        self.store.remove(&key.to_lowercase())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.store.contains_key(&key.to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.store.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

/// The restricted variant of [`CaseInsensitiveMap`]: inserts whose
/// lower-cased key is not one of [`FIELD_NAMES`] are silently dropped.
/// This is the interchange type all readers return and all writers accept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMap {
    store: BTreeMap<String, TagValue>,
}

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<TagValue>) {
        let key = key.to_lowercase();
        if FIELD_NAMES.contains(&key.as_str()) {
            self.store.insert(key, value.into());
        }
    }

    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.store.get(&key.to_lowercase())
    }

    pub fn remove(&mut self, key: &str) -> Option<TagValue> {
        self.store.remove(&key.to_lowercase())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.store.contains_key(&key.to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.store.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl From<CaseInsensitiveMap> for TagMap {
    fn from(map: CaseInsensitiveMap) -> Self {
        let mut tags = TagMap::new();
        for (key, value) in map.iter() {
            tags.insert(key, value.clone());
        }
        tags
    }
}
