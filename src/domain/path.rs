//! Dotted/bracketed paths into JSON content documents
//!
//! A `FieldPath` addresses one location inside a content document, e.g.
//! `leaflet.pages[2]` or `featured[0].avatarSrc`. Paths are parsed once into
//! a segment sequence and reused; reads are total, writes instantiate any
//! missing intermediate containers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Errors produced while parsing a raw path string
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// Empty key segment (leading/trailing/double dot)
    #[error("empty path segment at offset {0}")]
    EmptySegment(usize),

    /// `[` without a matching `]`
    #[error("unterminated index bracket at offset {0}")]
    UnterminatedIndex(usize),

    /// Non-numeric or overflowing array index
    #[error("invalid array index {0:?}")]
    InvalidIndex(String),

    /// Character that cannot start a segment (e.g. `a[0]x`)
    #[error("unexpected character {0:?} at offset {1}")]
    UnexpectedChar(char, usize),
}

/// One step of a path: an object key or an array index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// A parsed field path
///
/// The empty path addresses the document root: `get` returns the whole
/// document and `set` is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The empty path (document root)
    pub fn root() -> Self {
        Self::default()
    }

    /// Appends an object-key segment, builder style
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(Segment::Key(key.into()));
        self
    }

    /// Appends an array-index segment, builder style
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index(index));
        self
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parses the dotted/bracketed form, e.g. `group.leaflet.pages[2]`
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();
        let mut chars = raw.char_indices().peekable();
        // The empty string is the root path
        if raw.is_empty() {
            return Ok(Self::root());
        }

        let mut expect_segment = true;
        while let Some(&(offset, ch)) = chars.peek() {
            match ch {
                '.' => {
                    chars.next();
                    if expect_segment {
                        return Err(PathError::EmptySegment(offset));
                    }
                    expect_segment = true;
                }
                '[' => {
                    chars.next();
                    let mut digits = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        digits.push(c);
                    }
                    if !closed {
                        return Err(PathError::UnterminatedIndex(offset));
                    }
                    let index: usize = digits
                        .parse()
                        .map_err(|_| PathError::InvalidIndex(digits.clone()))?;
                    segments.push(Segment::Index(index));
                    expect_segment = false;
                }
                _ => {
                    if !expect_segment {
                        return Err(PathError::UnexpectedChar(ch, offset));
                    }
                    let mut key = String::new();
                    while let Some(&(_, c)) = chars.peek() {
                        if c == '.' || c == '[' {
                            break;
                        }
                        key.push(c);
                        chars.next();
                    }
                    if key.is_empty() {
                        return Err(PathError::EmptySegment(offset));
                    }
                    segments.push(Segment::Key(key));
                    expect_segment = false;
                }
            }
        }
        if expect_segment {
            return Err(PathError::EmptySegment(raw.len()));
        }

        Ok(Self { segments })
    }

    /// Reads the addressed value; `None` when any step is missing or the
    /// intermediate value is not a container of the right kind
    pub fn get<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let mut current = document;
        for segment in &self.segments {
            current = match segment {
                Segment::Key(key) => current.get(key.as_str())?,
                Segment::Index(index) => current.get(*index)?,
            };
        }
        Some(current)
    }

    /// Writes `value` at the addressed location, creating any missing
    /// intermediate containers
    ///
    /// A missing or wrong-kind intermediate is replaced by a fresh array when
    /// the following segment is an index, otherwise by a fresh object; arrays
    /// are padded with `null` up to the written index. The final segment
    /// overwrites unconditionally. The empty path is a no-op.
    pub fn set(&self, document: &mut Value, value: Value) {
        let Some((last, init)) = self.segments.split_last() else {
            return;
        };

        let mut current = document;
        for (position, segment) in init.iter().enumerate() {
            let wants_array = matches!(self.segments[position + 1], Segment::Index(_));
            current = step_into(current, segment, wants_array);
        }

        match last {
            Segment::Key(key) => {
                ensure_object(current).insert(key.clone(), value);
            }
            Segment::Index(index) => {
                let items = ensure_array(current, *index + 1);
                items[*index] = value;
            }
        }
    }
}

/// Descends one intermediate segment, instantiating the slot as the
/// container kind the *next* segment needs
fn step_into<'a>(current: &'a mut Value, segment: &Segment, wants_array: bool) -> &'a mut Value {
    let slot = match segment {
        Segment::Key(key) => ensure_object(current)
            .entry(key.clone())
            .or_insert(Value::Null),
        Segment::Index(index) => {
            let items = ensure_array(current, *index + 1);
            &mut items[*index]
        }
    };
    if wants_array {
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
    } else if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    slot
}

fn ensure_object(slot: &mut Value) -> &mut Map<String, Value> {
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just made an object"),
    }
}

fn ensure_array(slot: &mut Value, min_len: usize) -> &mut Vec<Value> {
    if !slot.is_array() {
        *slot = Value::Array(Vec::new());
    }
    match slot {
        Value::Array(items) => {
            if items.len() < min_len {
                items.resize(min_len, Value::Null);
            }
            items
        }
        _ => unreachable!("slot was just made an array"),
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) => {
                    if position > 0 {
                        write!(f, ".{key}")?;
                    } else {
                        write!(f, "{key}")?;
                    }
                }
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

// Paths travel over the wire in their string form
impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
