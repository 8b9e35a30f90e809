//! Composition query normalization
//!
//! Turns a loose composition such as `"NiAl3"` or `"Al*"` into the pattern
//! the property search matches against, e.g. `"Al-3 Ni-1"` or `"%Al-1%"`.
//! Tokens are an element symbol optionally followed by `-` and a single
//! digit or `%`; a bare `*` is a wildcard for any further elements.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_RE.get_or_init(|| {
        Regex::new(r"([A-Z][a-z]?)-?([0-9%])?|\*").expect("composition token pattern is valid")
    })
}

/// A normalized composition search pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionQuery {
    /// Pattern sent as the composition parameter
    pub pattern: String,
    /// Exact number of element types, `None` when a wildcard leaves it open
    pub atom_types: Option<usize>,
}

impl CompositionQuery {
    /// Normalize a user-supplied composition
    ///
    /// # Examples
    /// ```
    /// use structdb_client::CompositionQuery;
    ///
    /// let query = CompositionQuery::parse("NiAl3");
    /// assert_eq!(query.pattern, "Al-3 Ni-1");
    /// assert_eq!(query.atom_types, Some(2));
    ///
    /// let open = CompositionQuery::parse("Al*");
    /// assert_eq!(open.pattern, "%Al-1%");
    /// assert_eq!(open.atom_types, None);
    /// ```
    pub fn parse(input: &str) -> Self {
        if input == "%" {
            return Self {
                pattern: "%".to_string(),
                atom_types: None,
            };
        }

        // Wildcards carry an empty element and sort first.
        let mut tokens: Vec<(String, String)> = token_regex()
            .captures_iter(input)
            .map(|caps| {
                let element = caps.get(1).map_or("", |m| m.as_str()).to_string();
                let count = caps.get(2).map_or("", |m| m.as_str()).to_string();
                (element, count)
            })
            .collect();
        tokens.sort_by(|a, b| a.0.cmp(&b.0));

        let mut parts = Vec::with_capacity(tokens.len());
        let mut wildcard = false;
        for (element, count) in tokens {
            if element.is_empty() {
                wildcard = true;
                continue;
            }
            let count = if count.is_empty() { "1".to_string() } else { count };
            parts.push(format!("{}-{}", element, count));
        }

        if wildcard {
            let pattern = format!("%{}%", parts.join("%")).replace("%%", "%");
            Self {
                pattern,
                atom_types: None,
            }
        } else {
            Self {
                atom_types: Some(parts.len()),
                pattern: parts.join(" "),
            }
        }
    }
}

impl fmt::Display for CompositionQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}
