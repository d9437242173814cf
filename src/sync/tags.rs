//! Conversion between the header tag string (`Go:1.14,Python:3.7:3.8`) and the
//! structured tag list used on the wire.

use crate::error::{SyncError, SyncResult};
use crate::sync::model::Tag;

/// Parse a comma-joined tag string. Blank input yields no tags; an entry with
/// an empty name or an empty version segment is rejected.
pub fn encode(tag_string: &str) -> SyncResult<Vec<Tag>> {
    if tag_string.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut tags = Vec::new();
    for entry in tag_string.split(',') {
        let mut segments = entry.split(':').map(str::trim);
        let name = segments.next().unwrap_or_default();
        if name.is_empty() {
            return Err(SyncError::validation(format!(
                "tag entry `{}` in `{tag_string}` has an empty name",
                entry.trim()
            )));
        }
        let versions: Vec<String> = segments.map(ToOwned::to_owned).collect();
        if versions.iter().any(String::is_empty) {
            return Err(SyncError::validation(format!(
                "tag entry `{}` in `{tag_string}` has an empty version",
                entry.trim()
            )));
        }
        tags.push(Tag {
            name: name.to_string(),
            versions,
        });
    }
    Ok(tags)
}

pub fn decode(tags: &[Tag]) -> String {
    tags.iter()
        .map(|tag| {
            if tag.versions.is_empty() {
                tag.name.clone()
            } else {
                format!("{}:{}", tag.name, tag.versions.join(":"))
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};
    use crate::error::SyncError;
    use crate::sync::model::Tag;

    #[test]
    fn encode_splits_names_and_versions() {
        let got = encode("Go:1.12:1.13:1.14,Python:3.7:3.8").expect("encode");
        assert_eq!(
            got,
            vec![
                Tag::new("Go", &["1.12", "1.13", "1.14"]),
                Tag::new("Python", &["3.7", "3.8"]),
            ]
        );
    }

    #[test]
    fn encode_bare_name_has_empty_versions() {
        let got = encode("React, redux ,TypeScript").expect("encode");
        assert_eq!(got.len(), 3);
        assert_eq!(got[1], Tag::new("redux", &[]));
        assert!(got.iter().all(|t| t.versions.is_empty()));
    }

    #[test]
    fn encode_blank_string_is_no_tags() {
        assert!(encode("").expect("encode").is_empty());
        assert!(encode("   ").expect("encode").is_empty());
    }

    #[test]
    fn encode_rejects_empty_names() {
        assert!(matches!(encode("Go,,Rust"), Err(SyncError::Validation(_))));
        assert!(matches!(encode(":1.0"), Err(SyncError::Validation(_))));
        assert!(matches!(encode("Go,"), Err(SyncError::Validation(_))));
    }

    #[test]
    fn encode_rejects_empty_versions() {
        assert!(matches!(encode("Go::1.14"), Err(SyncError::Validation(_))));
        assert!(matches!(encode("Go:"), Err(SyncError::Validation(_))));
        assert!(matches!(encode("Rust,Go:1.14: "), Err(SyncError::Validation(_))));
    }

    #[test]
    fn decode_joins_versions_with_colons() {
        let tags = vec![
            Tag::new("Go", &["1.12", "1.13", "1.14"]),
            Tag::new("Python", &["3.7", "3.8"]),
            Tag::new("Rust", &[]),
        ];
        assert_eq!(decode(&tags), "Go:1.12:1.13:1.14,Python:3.7:3.8,Rust");
    }

    #[test]
    fn well_formed_strings_survive_encode_then_decode() {
        for s in ["Go", "Go:1.14", "a:1:2,b,c:3", "Ruby:0.0.1,Rails:6.0:6.1"] {
            assert_eq!(decode(&encode(s).expect("encode")), s);
        }
    }
}
