use serde_json::Value;

/// Walks `path` through nested objects.
///
/// Yields `None` as soon as a key is missing or an intermediate value is not
/// an object, rather than failing.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |node, key| node.as_object()?.get(*key))
}

pub fn lookup_u64(value: &Value, path: &[&str]) -> Option<u64> {
    lookup(value, path)?.as_u64()
}

pub fn lookup_array<'a>(value: &'a Value, path: &[&str]) -> &'a [Value] {
    lookup(value, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}
