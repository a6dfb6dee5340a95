// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Positional-token identifier grammar (§6): `ID[_scala][:version]`.

use std::sync::LazyLock;

use regex::Regex;

// The pattern is a fixed literal checked by the parameterized tests below;
// a failure here is a build-time bug, not a runtime condition.
#[allow(clippy::expect_used)]
static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)(_(2\.\d{2}|3))?(:(.*))?$").expect("static regex is valid"));

/// A parsed positional identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub service_id: String,
    pub scala_variant: Option<String>,
    pub version: Option<String>,
}

/// Parse a single positional token into its service id, optional Scala
/// variant suffix, and optional explicit version.
pub fn parse(token: &str) -> Identifier {
    // The leading group is `(.*?)`, optional groups follow, and the whole
    // pattern is anchored start-to-end: every input matches, including "".
    #[allow(clippy::expect_used)]
    let caps = IDENTIFIER_RE
        .captures(token)
        .expect("regex matches every input, including the empty string");
    let service_id = caps.get(1).map(|m| m.as_str()).unwrap_or("").to_string();
    let scala_variant = caps.get(3).map(|m| format!("_{}", m.as_str()));
    let version = caps.get(5).map(|m| m.as_str().to_string());
    Identifier {
        service_id,
        scala_variant,
        version,
    }
}

/// Parse a list of positional tokens, deduplicating by service id while
/// preserving first-seen order (§6).
pub fn parse_all(tokens: &[String]) -> Vec<Identifier> {
    let mut seen = std::collections::HashSet::new();
    let mut result = Vec::new();
    for token in tokens {
        let id = parse(token);
        if seen.insert(id.service_id.clone()) {
            result.push(id);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        bare = { "FOO", "FOO", None, None },
        scala_212 = { "FOO_2.12", "FOO", Some("_2.12"), None },
        scala_3 = { "FOO_3", "FOO", Some("_3"), None },
        versioned = { "FOO:1.2.3", "FOO", None, Some("1.2.3") },
        both = { "FOO_2.12:1.2.3", "FOO", Some("_2.12"), Some("1.2.3") },
    )]
    fn parses_identifier_grammar(input: &str, id: &str, variant: Option<&str>, version: Option<&str>) {
        let parsed = parse(input);
        assert_eq!(parsed.service_id, id);
        assert_eq!(parsed.scala_variant.as_deref(), variant);
        assert_eq!(parsed.version.as_deref(), version);
    }

    #[test]
    fn spec_example_parses_to_foo_212_123() {
        let parsed = parse("FOO_2.12:1.2.3");
        assert_eq!(parsed.service_id, "FOO");
        assert_eq!(parsed.scala_variant.as_deref(), Some("_2.12"));
        assert_eq!(parsed.version.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn parse_all_deduplicates_preserving_order() {
        let tokens = vec!["FOO".to_string(), "BAR".to_string(), "FOO".to_string()];
        let parsed = parse_all(&tokens);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].service_id, "FOO");
        assert_eq!(parsed[1].service_id, "BAR");
    }
}
