use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat key/value extra parameters attached to a resource request.
pub type ExtraMap = BTreeMap<String, String>;

/// Arguments passed to a resource handler, built fresh per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceArgs {
    pub r#type: String,
    pub id: String,
    /// Decoded extra parameters; empty when the request has no extra
    /// segment, never absent.
    #[serde(default)]
    pub extra: ExtraMap,
}

/// Decodes the optional extra path segment into a flat key/value map.
///
/// The segment is a `/`-delimited sequence of `key=value` pairs, each pair
/// URL-encoded; `&`-joined pairs inside one segment are accepted as well.
/// A pair without `=` decodes to an empty value; undecodable segments are
/// skipped rather than failing the request.
pub fn parse_extra(raw: &str) -> ExtraMap {
    let mut extra = ExtraMap::new();

    for segment in raw.split('/') {
        if segment.is_empty() {
            continue;
        }
        match serde_urlencoded::from_str::<Vec<(String, String)>>(segment) {
            Ok(pairs) => extra.extend(pairs),
            Err(err) => {
                tracing::debug!(segment, error = %err, "skipping malformed extra segment");
            }
        }
    }

    extra
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_extra_yields_empty_map() {
        assert!(parse_extra("").is_empty());
    }

    #[test]
    fn slash_delimited_pairs() {
        let extra = parse_extra("a=1/b=2");
        assert_eq!(extra.get("a").map(String::as_str), Some("1"));
        assert_eq!(extra.get("b").map(String::as_str), Some("2"));
        assert_eq!(extra.len(), 2);
    }

    #[test]
    fn ampersand_joined_pairs() {
        let extra = parse_extra("genre=Action&skip=100");
        assert_eq!(extra.get("genre").map(String::as_str), Some("Action"));
        assert_eq!(extra.get("skip").map(String::as_str), Some("100"));
    }

    #[test]
    fn percent_decoding() {
        let extra = parse_extra("genre=Sci%20Fi");
        assert_eq!(extra.get("genre").map(String::as_str), Some("Sci Fi"));
    }

    #[test]
    fn pair_without_value_decodes_to_empty_string() {
        let extra = parse_extra("a=1/flag/b=2");
        assert_eq!(extra.len(), 3);
        assert_eq!(extra.get("flag").map(String::as_str), Some(""));
    }
}
