//! Names derived from a record type's base name
//!
//! `ManufacturingPlant` → repository `manufacturing_plants` → display title
//! `Manufacturing Plants`.

use regex::Regex;
use std::sync::LazyLock;

static WORD_START: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(.)([A-Z][a-z]+)").ok());
static LOWER_UPPER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").ok());

/// `HTTPServerLog` → `http_server_log`
pub fn camel_to_snake(name: &str) -> String {
    let mut out = name.to_string();
    for re in [&*WORD_START, &*LOWER_UPPER].into_iter().flatten() {
        out = re.replace_all(&out, "${1}_${2}").into_owned();
    }
    out.to_lowercase()
}

/// Append "s" unless the word already ends in "s".
pub fn pluralize(word: &str) -> String {
    if word.ends_with('s') {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

/// Repository name: pluralized, snake_case, lower-case.
pub fn repository_name(type_name: &str) -> String {
    pluralize(&camel_to_snake(type_name))
}

/// Title written above a record block.
pub fn display_name(type_name: &str) -> String {
    repository_name(type_name)
        .split('_')
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
