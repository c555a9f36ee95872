//! Safe field access for semi-structured resource records
//!
//! Resource records are kept as `serde_json::Value` trees. These helpers walk a
//! path of field names and short-circuit to an empty result on the first
//! missing key or wrongly shaped value, so collectors never have to
//! pattern-match on intermediate levels.

use serde_json::{Map, Value};

/// Walk `path` through nested objects, returning the value at the end
///
/// An empty path yields `doc` itself.
pub fn get_value<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(doc, |current, segment| current.as_object()?.get(*segment))
}

/// Get the object at `path`
///
/// Returns `None` if any segment is missing or any value along the way,
/// including the last one, is not an object. An empty path yields `doc`
/// itself when it is an object.
pub fn get_map<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Map<String, Value>> {
    get_value(doc, path)?.as_object()
}

/// Get the string at `path`, or `""` when absent or not a string
pub fn get_string<'a>(doc: &'a Value, path: &[&str]) -> &'a str {
    if path.is_empty() {
        return "";
    }
    get_value(doc, path).and_then(Value::as_str).unwrap_or("")
}

/// Get the list at `path`, or an empty slice when absent or not a list
pub fn get_list<'a>(doc: &'a Value, path: &[&str]) -> &'a [Value] {
    if path.is_empty() {
        return &[];
    }
    get_value(doc, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Uids of every entry in `metadata.ownerReferences`
///
/// Entries that are not objects, or that carry no uid, are skipped.
pub fn get_owners(doc: &Value) -> Vec<&str> {
    get_list(doc, &["metadata", "ownerReferences"])
        .iter()
        .map(|owner| get_string(owner, &["uid"]))
        .filter(|uid| !uid.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_value_stops_at_scalars() {
        let doc = json!({ "a": "leaf" });
        assert!(get_value(&doc, &["a", "b"]).is_none());
        assert_eq!(get_value(&doc, &[]), Some(&doc));
    }

    #[test]
    fn test_get_map_empty_path() {
        let doc = json!({ "a": 1 });
        assert_eq!(get_map(&doc, &[]).map(|m| m.len()), Some(1));
        assert!(get_map(&json!("scalar"), &[]).is_none());
    }

    #[test]
    fn test_get_owners_skips_malformed_entries() {
        let doc = json!({
            "metadata": {
                "ownerReferences": [
                    { "uid": "rs-1", "kind": "ReplicaSet" },
                    null,
                    "not-an-object",
                    { "kind": "Deployment" },
                    { "uid": 42 },
                    { "uid": "rs-2" }
                ]
            }
        });
        assert_eq!(get_owners(&doc), vec!["rs-1", "rs-2"]);
    }

    #[test]
    fn test_get_owners_absent() {
        assert!(get_owners(&json!({})).is_empty());
        assert!(get_owners(&json!({ "metadata": { "ownerReferences": {} } })).is_empty());
    }
}
