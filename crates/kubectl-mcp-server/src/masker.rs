//! Secret masker: scrubs anything outbound before it reaches the client
//! (`spec.md` §4.2, C2).

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

const MASK: &str = "[MASKED]";

const SENSITIVE_KEYS: &[&str] = &[
    "password", "passwd", "token", "secret", "api_key", "apikey", "bearer", "authorization",
];

// A run of >=20 base64-alphabet characters, anchored on word boundaries so
// it doesn't eat surrounding punctuation.
static BASE64_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9+/=_-]{20,}").expect("valid regex"));

// `key: value` or `"key": "value"` style lines for the sensitive key list,
// case-insensitive on the key, capturing the value portion only.
static KEY_VALUE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    let keys = SENSITIVE_KEYS.join("|");
    Regex::new(&format!(
        r#"(?i)("?(?:{keys})"?\s*[:=]\s*)("[^"]*"|'[^']*'|\S+)"#
    ))
    .expect("valid regex")
});

/// Mask a single string. Idempotent: `mask(mask(x)) == mask(x)`
/// (`spec.md` §4.2, §8) because a second pass finds `[MASKED]` is neither a
/// base64 run of the triggering length nor a sensitive key's value distinct
/// from `[MASKED]` itself.
pub fn mask_str(input: &str) -> String {
    let after_kv = KEY_VALUE_LINE.replace_all(input, |caps: &regex::Captures| {
        format!("{}{}", &caps[1], MASK)
    });
    BASE64_RUN.replace_all(&after_kv, MASK).into_owned()
}

/// Mask every string reachable inside a JSON value, including recursing
/// into `Secret.data`/`stringData` maps unconditionally (`spec.md` §4.2):
/// those are masked regardless of pattern match, since by construction
/// every value under those keys is sensitive.
pub fn mask_value(value: &Value) -> Value {
    mask_value_inner(value, false)
}

fn mask_value_inner(value: &Value, force_mask_all: bool) -> Value {
    match value {
        Value::String(s) => {
            if force_mask_all {
                Value::String(MASK.to_string())
            } else {
                Value::String(mask_str(s))
            }
        }
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| mask_value_inner(v, force_mask_all)).collect())
        }
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let is_secret_payload = k == "data" || k == "stringData";
                let child_force = force_mask_all || is_secret_payload && is_flat_string_map(v);
                out.insert(k.clone(), mask_value_inner(v, child_force));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

fn is_flat_string_map(v: &Value) -> bool {
    matches!(v, Value::Object(m) if m.values().all(|v| v.is_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_sensitive_key_value_pairs() {
        let input = r#"password: hunter2hunter2hunter2"#;
        let out = mask_str(input);
        assert!(out.contains("password"));
        assert!(!out.contains("hunter2hunter2hunter2"));
    }

    #[test]
    fn masks_long_base64_runs() {
        let blob = "A".repeat(40);
        let out = mask_str(&format!("data: {blob}"));
        assert!(!out.contains(&blob));
        assert!(out.contains(MASK));
    }

    #[test]
    fn leaves_short_strings_alone() {
        let input = "namespace: kube-system";
        assert_eq!(mask_str(input), input);
    }

    #[test]
    fn is_idempotent() {
        let input = r#"{"token": "abcdefghijklmnopqrstuvwxyz0123456789"}"#;
        let once = mask_str(input);
        let twice = mask_str(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn masks_secret_data_map_unconditionally() {
        let secret = serde_json::json!({
            "kind": "Secret",
            "data": { "short": "ab" }
        });
        let masked = mask_value(&secret);
        assert_eq!(masked["data"]["short"], serde_json::json!(MASK));
    }

    proptest::proptest! {
        #[test]
        fn mask_never_grows_beyond_mask_sized_replacements(s in ".{0,200}") {
            let masked = mask_str(&s);
            // Every replacement shrinks or preserves length relative to the
            // run it replaces; the output can only be longer than the input
            // by the (bounded) difference between MASK's length and the
            // shortest matchable run, never unbounded growth.
            proptest::prop_assert!(masked.len() <= s.len().max(MASK.len()) + MASK.len() * 4);
        }

        #[test]
        fn mask_is_idempotent_prop(s in ".{0,200}") {
            let once = mask_str(&s);
            let twice = mask_str(&once);
            proptest::prop_assert_eq!(once, twice);
        }
    }
}
