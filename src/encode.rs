/*!
Command encoders: turn the [schema] and [query] models into the ordered list
of [`Token`]s that make up a RediSearch command.

RediSearch arguments are positional, and there's no way to say "this option is
absent" other than not sending it. So the rule throughout is that an option
block is emitted *only* if its governing value is present and non-empty (or
non-zero), and blocks are always emitted in the same order.

[schema]: crate::schema
[query]: crate::query
*/

use crate::{
    query::{Highlight, NumericFilter, SearchRequest, Summarize},
    schema::IndexConfiguration,
    token::Token,
};

/// A complete command: the command name followed by its arguments.
pub type Command<'a> = Vec<Token<'a>>;

/// Push `keyword <count> items...`, if there are any items.
fn push_counted<'a>(command: &mut Command<'a>, keyword: &'static str, items: &'a [String]) {
    if !items.is_empty() {
        command.reserve(items.len() + 2);
        command.push(keyword.into());
        command.push(Token::count(items.len()));
        command.extend(items.iter().map(|item| Token::from(item.as_str())));
    }
}

/// Push `keyword value`, if the value is present and non-empty.
fn push_named<'a>(command: &mut Command<'a>, keyword: &'static str, value: Option<&'a str>) {
    if let Some(value) = value.filter(|value| !value.is_empty()) {
        command.push(keyword.into());
        command.push(value.into());
    }
}

/**
Encode an [`FT.CREATE`](https://redis.io/commands/ft.create/) command. Indexes
are always created `ON HASH`.

The field blocks following `SCHEMA` come from a map, so their relative order is
unspecified.

# Example

```
use seredisearch::{encode, schema::{IndexConfiguration, FieldSchema, FieldOption}};

let config = IndexConfiguration::new("cities")
    .prefix("city:")
    .field("population", FieldSchema::numeric().option(FieldOption::Sortable));

let command: Vec<String> = encode::create_index(&config)
    .iter()
    .map(ToString::to_string)
    .collect();

assert_eq!(command, [
    "FT.CREATE", "cities", "ON", "HASH",
    "PREFIX", "1", "city:",
    "SCHEMA", "population", "NUMERIC", "SORTABLE",
]);
```
*/
#[must_use]
pub fn create_index(config: &IndexConfiguration) -> Command<'_> {
    let mut command: Command<'_> = vec![
        "FT.CREATE".into(),
        config.name.as_str().into(),
        "ON".into(),
        "HASH".into(),
    ];

    push_counted(&mut command, "PREFIX", &config.prefixes);
    push_named(&mut command, "FILTER", config.filter.as_deref());
    push_named(&mut command, "LANGUAGE", config.language.as_deref());
    push_named(&mut command, "LANGUAGE_FIELD", config.language_field.as_deref());

    if let Some(score) = config.score.filter(|&score| score > 0.0) {
        command.push("SCORE".into());
        command.push(Token::Float(score));
    }

    push_named(&mut command, "SCORE_FIELD", config.score_field.as_deref());
    push_named(&mut command, "PAYLOAD_FIELD", config.payload_field.as_deref());

    if let Some(seconds) = config
        .temporary
        .map(|ttl| ttl.as_secs())
        .filter(|&seconds| seconds > 0)
    {
        command.push("TEMPORARY".into());
        command.push(seconds.into());
    }

    push_counted(&mut command, "STOPWORDS", &config.stop_words);
    command.extend(config.flags.iter().map(|flag| Token::from(flag.as_str())));

    if !config.schema.is_empty() {
        command.push("SCHEMA".into());

        for (name, field) in &config.schema {
            command.push(name.as_str().into());
            command.push(field.kind.as_str().into());
            field
                .options
                .iter()
                .for_each(|option| option.push_tokens(&mut command));
        }
    }

    command
}

fn push_filter<'a>(command: &mut Command<'a>, filter: &'a NumericFilter) {
    // An exclusive bound is written as `(value`
    let bound = |value: f64| match filter.exclusive {
        false => Token::Float(value),
        true => Token::from(format!("({}", Token::Float(value))),
    };

    command.push("FILTER".into());
    command.push(filter.field.as_str().into());
    command.push(bound(filter.min));
    command.push(bound(filter.max));
}

fn push_summarize<'a>(command: &mut Command<'a>, summarize: &'a Summarize) {
    command.push("SUMMARIZE".into());
    push_counted(command, "FIELDS", &summarize.fields);

    if let Some(fragments) = summarize.fragments.filter(|&n| n > 0) {
        command.push("FRAGS".into());
        command.push(fragments.into());
    }

    if let Some(length) = summarize.length.filter(|&n| n > 0) {
        command.push("LEN".into());
        command.push(length.into());
    }

    push_named(command, "SEPARATOR", summarize.separator.as_deref());
}

fn push_highlight<'a>(command: &mut Command<'a>, highlight: &'a Highlight) {
    command.push("HIGHLIGHT".into());
    push_counted(command, "FIELDS", &highlight.fields);

    let tags = highlight
        .tags
        .as_ref()
        .filter(|tags| !tags.open.is_empty() && !tags.close.is_empty());

    if let Some(tags) = tags {
        command.push("TAGS".into());
        command.push(tags.open.as_str().into());
        command.push(tags.close.as_str().into());
    }
}

/**
Encode an [`FT.SEARCH`](https://redis.io/commands/ft.search/) command.

Modifiers are emitted in this order, each only if set: flags, numeric
filters, the geo filter, `INKEYS`, `INFIELDS`, `RETURN`, `SUMMARIZE`,
`HIGHLIGHT`, `SLOP`, `LANGUAGE`, `EXPANDER`, `SCORER`, `PAYLOAD`, `SORTBY`,
`LIMIT`.

# Example

```
use seredisearch::{encode, query::{SearchRequest, SearchFlag, SortOrder}};

let request = SearchRequest::new("cities", "Popayan")
    .flag(SearchFlag::Verbatim)
    .sort_by("population", SortOrder::Descending)
    .limit(0, 5);

let command: Vec<String> = encode::search(&request)
    .iter()
    .map(ToString::to_string)
    .collect();

assert_eq!(command, [
    "FT.SEARCH", "cities", "Popayan",
    "VERBATIM",
    "SORTBY", "population", "DESC",
    "LIMIT", "0", "5",
]);
```
*/
#[must_use]
pub fn search(request: &SearchRequest) -> Command<'_> {
    let mut command: Command<'_> = vec![
        "FT.SEARCH".into(),
        request.index.as_str().into(),
        request.query.as_str().into(),
    ];

    command.extend(request.flags.iter().map(|flag| Token::from(flag.as_str())));

    request
        .filters
        .iter()
        .for_each(|filter| push_filter(&mut command, filter));

    if let Some(geo) = &request.geo_filter {
        command.extend([
            Token::from("GEOFILTER"),
            geo.field.as_str().into(),
            Token::Float(geo.longitude),
            Token::Float(geo.latitude),
            Token::Float(geo.radius),
            geo.unit.unwrap_or_default().as_str().into(),
        ]);
    }

    push_counted(&mut command, "INKEYS", &request.in_keys);
    push_counted(&mut command, "INFIELDS", &request.in_fields);
    push_counted(&mut command, "RETURN", &request.return_fields);

    if let Some(summarize) = &request.summarize {
        push_summarize(&mut command, summarize);
    }

    if let Some(highlight) = &request.highlight {
        push_highlight(&mut command, highlight);
    }

    if let Some(slop) = request.slop {
        command.push("SLOP".into());
        command.push(slop.into());
    }

    push_named(&mut command, "LANGUAGE", request.language.as_deref());
    push_named(&mut command, "EXPANDER", request.expander.as_deref());
    push_named(&mut command, "SCORER", request.scorer.as_deref());
    push_named(&mut command, "PAYLOAD", request.payload.as_deref());

    if let Some(sort) = &request.sort_by {
        command.extend([
            Token::from("SORTBY"),
            sort.field.as_str().into(),
            sort.order.as_str().into(),
        ]);
    }

    if let Some(limit) = request.limit {
        command.extend([Token::from("LIMIT"), limit.offset.into(), limit.num.into()]);
    }

    command
}

/// Encode an [`FT.DROPINDEX`](https://redis.io/commands/ft.dropindex/)
/// command. If `purge` is true, `DD` is appended, which makes the server
/// delete every indexed document along with the index.
#[must_use]
pub fn drop_index(name: &str, purge: bool) -> Command<'_> {
    let mut command: Command<'_> = vec!["FT.DROPINDEX".into(), name.into()];

    if purge {
        command.push("DD".into());
    }

    command
}

/// Encode an [`FT.INFO`](https://redis.io/commands/ft.info/) command, used
/// to check for an index's existence.
#[must_use]
pub fn index_info(name: &str) -> Command<'_> {
    vec!["FT.INFO".into(), name.into()]
}

/// Encode a `DEL` command for a single key.
#[must_use]
pub fn delete(key: &str) -> Command<'_> {
    vec!["DEL".into(), key.into()]
}

/// Encode an `HSET` command from a list of field-value pairs.
#[must_use]
pub fn set_fields<'a>(key: &'a str, fields: &'a [(String, Token<'_>)]) -> Command<'a> {
    let mut command: Command<'a> = Vec::with_capacity(fields.len() * 2 + 2);
    command.push("HSET".into());
    command.push(key.into());

    for (name, value) in fields {
        command.push(name.as_str().into());
        command.push(value.clone().into_owned());
    }

    command
}
