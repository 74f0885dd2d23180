//! Recursive discriminator-tag search over untyped JSON trees.
//!
//! API responses carry no stable shape: the object holding a tweet, a user,
//! or a pagination cursor can sit at any depth, identified only by a tag
//! field such as `__typename` or `cursorType`. `search` walks the whole tree
//! and returns every object whose tag matches, in document order, without
//! assuming anything else about the layout.

use serde_json::Value;

/// Find every object reachable from `value` whose own `key` field
/// stringifies equal to `target`.
///
/// Matches are returned in document traversal order: array elements in
/// sequence, object members in the order the document declared them. A
/// matching object is still descended into, since the platform nests
/// same-shaped entities (a quoted tweet carries a full tweet object
/// inside it). Scalars, `null`, and objects without `key` contribute
/// nothing.
#[must_use]
pub fn search<'a>(value: &'a Value, key: &str, target: &str) -> Vec<&'a Value> {
    let mut matches = Vec::new();
    collect(value, key, target, &mut matches);
    matches
}

fn collect<'a>(value: &'a Value, key: &str, target: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect(item, key, target, out);
            }
        }
        Value::Object(map) => {
            if map.get(key).is_some_and(|tag| tag_matches(tag, target)) {
                out.push(value);
            }
            for member in map.values() {
                collect(member, key, target, out);
            }
        }
        _ => {}
    }
}

/// Compare a tag value against its expected string form. Raw numeric and
/// boolean tags count as matching when their canonical string form equals
/// `target`.
fn tag_matches(tag: &Value, target: &str) -> bool {
    match tag {
        Value::String(s) => s == target,
        Value::Number(n) => n.to_string() == target,
        Value::Bool(b) => {
            if *b {
                target == "true"
            } else {
                target == "false"
            }
        }
        _ => false,
    }
}
