//! Dot/bracket path expressions.
//!
//! A key such as `http.users[1]` or `entries[2][3][0].name` is split on `.`;
//! each segment is first looked up verbatim, and only when that misses is a
//! trailing `[i][j]...` suffix interpreted as array indexes.

use serde_json::Value;

use super::coerce::parse_int;

/// Finds the value addressed by `key`, or `None` when nothing is there.
///
/// The empty key addresses `root` itself.
pub fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    if key.is_empty() {
        return Some(root);
    }

    let mut current = root;
    for segment in key.split('.') {
        let map = current.as_object()?;
        current = match map.get(segment) {
            Some(value) => value,
            None => {
                let (base, indexes) = split_indexed(segment)?;
                let mut value = map.get(base)?;
                for index in indexes {
                    value = element(value.as_array()?, index)?;
                }
                value
            }
        };
    }
    Some(current)
}

/// Mutable counterpart of [`lookup`].
pub fn lookup_mut<'a>(root: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    if key.is_empty() {
        return Some(root);
    }

    let mut current = root;
    for segment in key.split('.') {
        let map = current.as_object_mut()?;
        current = if map.contains_key(segment) {
            map.get_mut(segment)?
        } else {
            let (base, indexes) = split_indexed(segment)?;
            let mut value = map.get_mut(base)?;
            for index in indexes {
                let len = value.as_array()?.len();
                let position = checked_index(index, len)?;
                value = value.as_array_mut()?.get_mut(position)?;
            }
            value
        };
    }
    Some(current)
}

/// Splits `name[1][2]` into `("name", [1, 2])`.
///
/// Returns `None` if the segment has no bracket suffix, an empty base name,
/// or an index that is not an integer literal.
fn split_indexed(segment: &str) -> Option<(&str, Vec<i64>)> {
    let inner = segment.strip_suffix(']')?;
    let open = inner.find('[').filter(|&i| i > 0)?;
    let indexes = inner[open + 1..]
        .split("][")
        .map(parse_int)
        .collect::<Option<Vec<_>>>()?;
    Some((&segment[..open], indexes))
}

fn element(items: &[Value], index: i64) -> Option<&Value> {
    items.get(checked_index(index, items.len())?)
}

fn checked_index(index: i64, len: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|&i| i < len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_key_is_root() {
        let root = json!({"a": 1});
        assert_eq!(lookup(&root, ""), Some(&root));
    }

    #[test]
    fn test_dotted_keys() {
        let root = json!({"http": {"proxy": "proxy.example.com"}});
        assert_eq!(lookup(&root, "http.proxy"), Some(&json!("proxy.example.com")));
        assert_eq!(lookup(&root, "http.missing"), None);
        assert_eq!(lookup(&root, "http.proxy.deeper"), None);
    }

    #[test]
    fn test_array_index() {
        let root = json!({"a": [10, 20, 30]});
        assert_eq!(lookup(&root, "a[1]"), Some(&json!(20)));
        assert_eq!(lookup(&root, "a[5]"), None);
        assert_eq!(lookup(&root, "a[-1]"), None);
    }

    #[test]
    fn test_nested_indexes() {
        let root = json!({"a": [[1, 2], [3, 4]]});
        assert_eq!(lookup(&root, "a[1][0]"), Some(&json!(3)));
        assert_eq!(lookup(&root, "a[0][2]"), None);
        assert_eq!(lookup(&root, "a[0][0][0]"), None);
    }

    #[test]
    fn test_index_then_key() {
        let root = json!({"entries": [{"apple": {"name": "Apple"}}]});
        assert_eq!(lookup(&root, "entries[0].apple.name"), Some(&json!("Apple")));
    }

    #[test]
    fn test_prefixed_index_literals() {
        let root = json!({"a": [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17]});
        assert_eq!(lookup(&root, "a[0x10]"), Some(&json!(16)));
        assert_eq!(lookup(&root, "a[010]"), Some(&json!(8)));
        assert_eq!(lookup(&root, "a[0b11]"), Some(&json!(3)));
        assert_eq!(lookup(&root, "a[x]"), None);
    }

    #[test]
    fn test_verbatim_key_wins_over_index() {
        let root = json!({"a[0]": "literal", "a": ["indexed"]});
        assert_eq!(lookup(&root, "a[0]"), Some(&json!("literal")));
    }

    #[test]
    fn test_index_on_non_array() {
        let root = json!({"a": {"b": 1}});
        assert_eq!(lookup(&root, "a[0]"), None);
    }

    #[test]
    fn test_missing_base_name() {
        let root = json!({"a": [1]});
        assert_eq!(lookup(&root, "[0]"), None);
        assert_eq!(lookup(&root, "b[0]"), None);
    }

    #[test]
    fn test_root_must_be_object() {
        let root = json!([1, 2]);
        assert_eq!(lookup(&root, "a"), None);
    }

    #[test]
    fn test_lookup_mut_updates_element() {
        let mut root = json!({"a": [[1, 2], [3, 4]]});
        *lookup_mut(&mut root, "a[1][1]").unwrap() = json!(40);
        assert_eq!(root, json!({"a": [[1, 2], [3, 40]]}));
        assert!(lookup_mut(&mut root, "a[2]").is_none());
    }
}
