//! Table-driven parameter binding (`spec.md` §9 "dynamic `**kwargs`
//! dispatch"): reads each field named by a tool's or prompt's
//! `input_schema`/`parameters` out of the client-supplied JSON object,
//! applies defaults for absent optional fields, and reports missing or
//! unrecognized fields as a single error string the dispatcher turns into
//! `-32602 Invalid params` (`spec.md` §4.6 step 3).

use kubectl_mcp_protocol::{InputSchema, ParamType};
use serde_json::Value;

fn type_matches(ty: ParamType, value: &Value) -> bool {
    match ty {
        ParamType::String => value.is_string(),
        ParamType::Integer => value.is_i64() || value.is_u64(),
        ParamType::Boolean => value.is_boolean(),
        ParamType::Object => value.is_object(),
        ParamType::Array => value.is_array(),
    }
}

/// Bind `input` against `schema`: every declared field is present in the
/// output (explicit value or default), every value matches its declared
/// type, and no field outside the schema survives.
pub fn bind(schema: &InputSchema, input: &Value) -> Result<Value, String> {
    let given = match input {
        Value::Object(map) => map.clone(),
        Value::Null => serde_json::Map::new(),
        other => return Err(format!("input must be a JSON object, got {other}")),
    };

    let mut bound = serde_json::Map::with_capacity(schema.len());
    for (key, spec) in schema {
        match given.get(key) {
            Some(value) => {
                if !type_matches(spec.ty, value) {
                    return Err(format!(
                        "parameter '{key}' has the wrong type (expected {:?})",
                        spec.ty
                    ));
                }
                bound.insert(key.clone(), value.clone());
            }
            None => {
                if spec.required {
                    return Err(format!("missing required parameter '{key}'"));
                }
                if let Some(default) = &spec.default {
                    bound.insert(key.clone(), default.clone());
                }
            }
        }
    }

    for key in given.keys() {
        if !schema.contains_key(key) {
            return Err(format!("unexpected parameter '{key}'"));
        }
    }

    Ok(Value::Object(bound))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubectl_mcp_protocol::ParamSpec;
    use serde_json::json;

    fn schema() -> InputSchema {
        [
            ("name".to_string(), ParamSpec::required(ParamType::String, "name")),
            ("replicas".to_string(), ParamSpec::optional(ParamType::Integer, json!(1), "count")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn fills_in_default_for_absent_optional_field() {
        let bound = bind(&schema(), &json!({ "name": "web" })).unwrap();
        assert_eq!(bound["replicas"], json!(1));
    }

    #[test]
    fn rejects_missing_required_field() {
        assert!(bind(&schema(), &json!({})).is_err());
    }

    #[test]
    fn rejects_wrong_type() {
        assert!(bind(&schema(), &json!({ "name": 5 })).is_err());
    }

    #[test]
    fn rejects_unexpected_field() {
        assert!(bind(&schema(), &json!({ "name": "web", "bogus": true })).is_err());
    }

    #[test]
    fn accepts_explicit_override_of_default() {
        let bound = bind(&schema(), &json!({ "name": "web", "replicas": 5 })).unwrap();
        assert_eq!(bound["replicas"], json!(5));
    }
}
