//! JSON-patch style diff/apply over document snapshots.
//!
//! History frames store two of these patches (forward and backward) instead
//! of whole-document snapshots, so a long session stays cheap to keep.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single patch operation against a JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    /// Insert a value at a path that does not yet exist.
    Add { path: String, value: Value },
    /// Remove the value at a path.
    Remove { path: String },
    /// Replace the value at an existing path.
    Replace { path: String, value: Value },
}

impl PatchOp {
    /// The path this operation targets.
    pub fn path(&self) -> &str {
        match self {
            PatchOp::Add { path, .. } => path,
            PatchOp::Remove { path } => path,
            PatchOp::Replace { path, .. } => path,
        }
    }
}

/// An ordered list of operations transforming one snapshot into another.
pub type Patch = Vec<PatchOp>;

/// Compute the patch that transforms `from` into `to`.
pub fn diff(from: &Value, to: &Value) -> Patch {
    let mut ops = Vec::new();
    diff_inner(from, to, String::new(), &mut ops);
    ops
}

fn diff_inner(from: &Value, to: &Value, path: String, ops: &mut Patch) {
    if from == to {
        return;
    }
    match (from, to) {
        (Value::Object(a), Value::Object(b)) => {
            for (key, from_val) in a {
                let child = format!("{path}/{}", escape(key));
                match b.get(key) {
                    Some(to_val) => diff_inner(from_val, to_val, child, ops),
                    None => ops.push(PatchOp::Remove { path: child }),
                }
            }
            for (key, to_val) in b {
                if !a.contains_key(key) {
                    ops.push(PatchOp::Add {
                        path: format!("{path}/{}", escape(key)),
                        value: to_val.clone(),
                    });
                }
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            let common = a.len().min(b.len());
            for i in 0..common {
                diff_inner(&a[i], &b[i], format!("{path}/{i}"), ops);
            }
            for (i, item) in b.iter().enumerate().skip(common) {
                ops.push(PatchOp::Add {
                    path: format!("{path}/{i}"),
                    value: item.clone(),
                });
            }
            // Excess elements removed back-to-front so indices stay valid
            for i in (common..a.len()).rev() {
                ops.push(PatchOp::Remove {
                    path: format!("{path}/{i}"),
                });
            }
        }
        _ => ops.push(PatchOp::Replace {
            path,
            value: to.clone(),
        }),
    }
}

/// Apply a patch to a value, returning the transformed copy.
pub fn apply(value: &Value, patch: &Patch) -> Result<Value> {
    let mut result = value.clone();
    for op in patch {
        apply_op(&mut result, op)?;
    }
    Ok(result)
}

fn apply_op(value: &mut Value, op: &PatchOp) -> Result<()> {
    let path = op.path();
    if path.is_empty() {
        return match op {
            PatchOp::Replace { value: v, .. } | PatchOp::Add { value: v, .. } => {
                *value = v.clone();
                Ok(())
            }
            PatchOp::Remove { .. } => Err(CoreError::Patch("cannot remove document root".into())),
        };
    }

    let segments: Vec<String> = path
        .split('/')
        .skip(1)
        .map(unescape)
        .collect();
    let (leaf, parents) = segments
        .split_last()
        .ok_or_else(|| CoreError::Patch(format!("empty path '{path}'")))?;

    let mut target = value;
    for seg in parents {
        target = descend(target, seg, path)?;
    }

    match (op, target) {
        (PatchOp::Add { value: v, .. }, Value::Object(map)) => {
            map.insert(leaf.clone(), v.clone());
        }
        (PatchOp::Add { value: v, .. }, Value::Array(arr)) => {
            let index = parse_index(leaf, path)?;
            if index > arr.len() {
                return Err(CoreError::Patch(format!("index {index} out of range at '{path}'")));
            }
            arr.insert(index, v.clone());
        }
        (PatchOp::Replace { value: v, .. }, Value::Object(map)) => {
            match map.get_mut(leaf.as_str()) {
                Some(slot) => *slot = v.clone(),
                None => return Err(CoreError::Patch(format!("missing key at '{path}'"))),
            }
        }
        (PatchOp::Replace { value: v, .. }, Value::Array(arr)) => {
            let index = parse_index(leaf, path)?;
            match arr.get_mut(index) {
                Some(slot) => *slot = v.clone(),
                None => return Err(CoreError::Patch(format!("index {index} out of range at '{path}'"))),
            }
        }
        (PatchOp::Remove { .. }, Value::Object(map)) => {
            if map.remove(leaf.as_str()).is_none() {
                return Err(CoreError::Patch(format!("missing key at '{path}'")));
            }
        }
        (PatchOp::Remove { .. }, Value::Array(arr)) => {
            let index = parse_index(leaf, path)?;
            if index >= arr.len() {
                return Err(CoreError::Patch(format!("index {index} out of range at '{path}'")));
            }
            arr.remove(index);
        }
        _ => {
            return Err(CoreError::Patch(format!("cannot patch scalar at '{path}'")));
        }
    }
    Ok(())
}

fn descend<'a>(value: &'a mut Value, segment: &str, path: &str) -> Result<&'a mut Value> {
    match value {
        Value::Object(map) => map
            .get_mut(segment)
            .ok_or_else(|| CoreError::Patch(format!("missing key '{segment}' at '{path}'"))),
        Value::Array(arr) => {
            let index = parse_index(segment, path)?;
            arr.get_mut(index)
                .ok_or_else(|| CoreError::Patch(format!("index {index} out of range at '{path}'")))
        }
        _ => Err(CoreError::Patch(format!("cannot descend into scalar at '{path}'"))),
    }
}

fn parse_index(segment: &str, path: &str) -> Result<usize> {
    segment
        .parse()
        .map_err(|_| CoreError::Patch(format!("invalid array index '{segment}' at '{path}'")))
}

// RFC 6901 escaping for path segments
fn escape(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_diff_equal_is_empty() {
        let value = json!({"shapes": [{"id": "a"}]});
        assert!(diff(&value, &value).is_empty());
    }

    #[test]
    fn test_diff_replace_scalar() {
        let from = json!({"zoom": 1.0});
        let to = json!({"zoom": 2.0});
        let patch = diff(&from, &to);
        assert_eq!(patch.len(), 1);
        assert_eq!(apply(&from, &patch).unwrap(), to);
    }

    #[test]
    fn test_diff_array_append_and_truncate() {
        let from = json!({"shapes": [{"id": "a"}]});
        let to = json!({"shapes": [{"id": "a"}, {"id": "b"}]});

        let forward = diff(&from, &to);
        assert_eq!(apply(&from, &forward).unwrap(), to);

        let backward = diff(&to, &from);
        assert_eq!(apply(&to, &backward).unwrap(), from);
    }

    #[test]
    fn test_diff_nested_change() {
        let from = json!({"shapes": [{"id": "a", "point": [0.0, 0.0]}]});
        let to = json!({"shapes": [{"id": "a", "point": [100.0, 50.0]}]});

        let patch = diff(&from, &to);
        // Only the two coordinates change, not the whole shape
        assert_eq!(patch.len(), 2);
        assert_eq!(apply(&from, &patch).unwrap(), to);
    }

    #[test]
    fn test_diff_key_add_remove() {
        let from = json!({"a": 1});
        let to = json!({"b": 2});
        let patch = diff(&from, &to);
        assert_eq!(apply(&from, &patch).unwrap(), to);
    }

    #[test]
    fn test_apply_bad_path_errors() {
        let value = json!({"shapes": []});
        let patch = vec![PatchOp::Replace {
            path: "/missing".into(),
            value: json!(1),
        }];
        assert!(apply(&value, &patch).is_err());
    }

    #[test]
    fn test_roundtrip_multi_element_removal() {
        let from = json!({"shapes": [{"id": "a"}, {"id": "b"}, {"id": "c"}]});
        let to = json!({"shapes": [{"id": "a"}]});
        let forward = diff(&from, &to);
        let backward = diff(&to, &from);
        assert_eq!(apply(&from, &forward).unwrap(), to);
        assert_eq!(apply(&to, &backward).unwrap(), from);
    }

    #[test]
    fn test_escaped_keys() {
        let from = json!({"a/b": 1});
        let to = json!({"a/b": 2});
        let patch = diff(&from, &to);
        assert_eq!(apply(&from, &patch).unwrap(), to);
    }
}
