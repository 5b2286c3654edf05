/*!
The index definition model used by [`FT.CREATE`](https://redis.io/commands/ft.create/).

This is plain data. The only validation performed on it (a non-empty index
name) happens in the [client][crate::client::Client]; option applicability
(which options make sense for which field types) is left to the server.
*/

use std::{collections::HashMap, time::Duration};

use crate::token::Token;

/// The type of an indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Full-text search against the field's value.
    Text,

    /// Exact-match queries, such as categories or primary keys.
    Tag,

    /// Numeric range queries.
    Numeric,

    /// Geographic radius queries. The value must be a `"lon,lat"` string.
    Geo,
}

impl FieldType {
    /// The wire name of this type.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "TEXT",
            FieldType::Tag => "TAG",
            FieldType::Numeric => "NUMERIC",
            FieldType::Geo => "GEO",
        }
    }
}

/// A per-field indexing option. Options are passed to the server as-is, in
/// the order they were declared.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOption {
    /// `WEIGHT <w>`: importance of a text field when scoring. Sent with one
    /// decimal place.
    Weight(f32),

    /// `SORTABLE`: allow sorting results by this field.
    Sortable,

    /// `NOSTEM`: disable stemming when indexing a text field.
    NoStem,

    /// `NOINDEX`: store the field (for sorting) without indexing it.
    NoIndex,

    /// `PHONETIC <matcher>`: phonetic matching, such as `dm:en`.
    Phonetic(String),

    /// `SEPARATOR <c>`: how a tag field is split into individual tags.
    Separator(u8),
}

impl FieldOption {
    /// Append the tokens for this option to a command.
    pub fn push_tokens<'a>(&'a self, command: &mut Vec<Token<'a>>) {
        match self {
            FieldOption::Weight(weight) => {
                command.push("WEIGHT".into());
                command.push(Token::from(format!("{weight:.1}")));
            }
            FieldOption::Sortable => command.push("SORTABLE".into()),
            FieldOption::NoStem => command.push("NOSTEM".into()),
            FieldOption::NoIndex => command.push("NOINDEX".into()),
            FieldOption::Phonetic(matcher) => {
                command.push("PHONETIC".into());
                command.push(matcher.as_str().into());
            }
            FieldOption::Separator(separator) => {
                command.push("SEPARATOR".into());
                command.push(Token::Byte(*separator));
            }
        }
    }
}

/**
The schema of a single indexed field: its type and options.

# Example

```
use seredisearch::schema::{FieldSchema, FieldOption, FieldType};

let field = FieldSchema::new(FieldType::Numeric).option(FieldOption::Sortable);
assert_eq!(field.kind, FieldType::Numeric);
assert_eq!(field.options, [FieldOption::Sortable]);
```
*/
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    /// The field's type.
    pub kind: FieldType,

    /// The field's options, in declaration order.
    pub options: Vec<FieldOption>,
}

impl FieldSchema {
    /// Create a field schema with no options.
    #[inline]
    #[must_use]
    pub fn new(kind: FieldType) -> Self {
        Self {
            kind,
            options: Vec::new(),
        }
    }

    /// A `TEXT` field.
    #[inline]
    #[must_use]
    pub fn text() -> Self {
        Self::new(FieldType::Text)
    }

    /// A `TAG` field.
    #[inline]
    #[must_use]
    pub fn tag() -> Self {
        Self::new(FieldType::Tag)
    }

    /// A `NUMERIC` field.
    #[inline]
    #[must_use]
    pub fn numeric() -> Self {
        Self::new(FieldType::Numeric)
    }

    /// A `GEO` field.
    #[inline]
    #[must_use]
    pub fn geo() -> Self {
        Self::new(FieldType::Geo)
    }

    /// Add an option to this field.
    #[inline]
    #[must_use]
    pub fn option(mut self, option: FieldOption) -> Self {
        self.options.push(option);
        self
    }
}

/// Index-wide flags for `FT.CREATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFlag {
    /// `NOOFFSETS`: don't store term offsets (implies `NOHL`).
    NoOffsets,

    /// `NOHL`: disable highlighting support.
    NoHl,

    /// `NOFIELDS`: don't store field bits for each term.
    NoFields,

    /// `NOFREQS`: don't store term frequencies.
    NoFreqs,

    /// `SKIPINITIALSCAN`: don't scan existing keys when creating the index.
    SkipInitialScan,

    /// `MAXTEXTFIELDS`: encode the index as if it had more than 32 text fields.
    MaxTextFields,
}

impl IndexFlag {
    /// The wire name of this flag.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            IndexFlag::NoOffsets => "NOOFFSETS",
            IndexFlag::NoHl => "NOHL",
            IndexFlag::NoFields => "NOFIELDS",
            IndexFlag::NoFreqs => "NOFREQS",
            IndexFlag::SkipInitialScan => "SKIPINITIALSCAN",
            IndexFlag::MaxTextFields => "MAXTEXTFIELDS",
        }
    }
}

/**
The definition of a search index over hashes.

Every optional setting is omitted from the command when it's empty or zero.
Fields are stored in a map, so field names are unique, but the order of the
field blocks in the encoded `SCHEMA` is unspecified.

# Example

```
use seredisearch::schema::{IndexConfiguration, FieldSchema, FieldOption};

let config = IndexConfiguration::new("cities")
    .prefix("city:")
    .field("name", FieldSchema::text().option(FieldOption::Weight(2.0)))
    .field("population", FieldSchema::numeric().option(FieldOption::Sortable));

assert_eq!(config.name, "cities");
assert_eq!(config.schema.len(), 2);
```
*/
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexConfiguration {
    /// The index name. Required.
    pub name: String,

    /// Key prefixes to index. If empty, the server indexes every hash.
    pub prefixes: Vec<String>,

    /// A filter expression in the RediSearch aggregation language.
    pub filter: Option<String>,

    /// Default document language.
    pub language: Option<String>,

    /// The document field holding each document's language.
    pub language_field: Option<String>,

    /// Default document score; only sent if positive.
    pub score: Option<f64>,

    /// The document field holding each document's score.
    pub score_field: Option<String>,

    /// The document field holding each document's binary-safe payload.
    pub payload_field: Option<String>,

    /// Make this a temporary index that expires after this much inactivity.
    /// Sent in whole seconds, and only if that's at least one second.
    pub temporary: Option<Duration>,

    /// A custom stop-word list. If empty, the server's default list is used.
    pub stop_words: Vec<String>,

    /// Index-wide flags, sent in this order.
    pub flags: Vec<IndexFlag>,

    /// The indexed fields, by hash field name.
    pub schema: HashMap<String, FieldSchema>,
}

impl IndexConfiguration {
    /// Create an index configuration with just a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a key prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    /// Add a flag.
    #[must_use]
    pub fn flag(mut self, flag: IndexFlag) -> Self {
        self.flags.push(flag);
        self
    }

    /// Add (or replace) an indexed field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        self.schema.insert(name.into(), schema);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(option: &FieldOption) -> Vec<String> {
        let mut command = Vec::new();
        option.push_tokens(&mut command);
        command.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_option_tokens() {
        assert_eq!(render(&FieldOption::Weight(2.0)), ["WEIGHT", "2.0"]);
        assert_eq!(render(&FieldOption::Weight(0.75)), ["WEIGHT", "0.8"]);
        assert_eq!(render(&FieldOption::Sortable), ["SORTABLE"]);
        assert_eq!(render(&FieldOption::NoStem), ["NOSTEM"]);
        assert_eq!(render(&FieldOption::NoIndex), ["NOINDEX"]);
        assert_eq!(
            render(&FieldOption::Phonetic("dm:en".to_owned())),
            ["PHONETIC", "dm:en"]
        );
        assert_eq!(render(&FieldOption::Separator(b';')), ["SEPARATOR", ";"]);
    }

    #[test]
    fn test_field_replaced_by_name() {
        let config = IndexConfiguration::new("idx")
            .field("title", FieldSchema::text())
            .field("title", FieldSchema::tag());

        assert_eq!(config.schema.len(), 1);
        assert_eq!(config.schema["title"].kind, FieldType::Tag);
    }
}
