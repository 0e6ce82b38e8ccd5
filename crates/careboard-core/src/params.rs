use serde_json::Value;
use std::collections::BTreeMap;

/// Filter parameters attached to a dispatcher request.
///
/// A `BTreeMap` keeps the keys sorted regardless of insertion order, which
/// is what makes the cache-key serialization downstream canonical: two
/// parameter sets with the same key/value pairs always serialize to the
/// same string.
pub type Params = BTreeMap<String, Value>;

/// Renders params as query-string pairs, dropping explicit nulls.
///
/// A `null` value means "parameter intentionally unset" (e.g. the self-pay
/// billing scope); it is still visible to local resolvers but must never
/// appear in a real query string.
pub fn query_pairs(params: &Params) -> Vec<(String, String)> {
    params
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}
