//! Feature tokenizer
//!
//! Turns arbitrary JSON-shaped content into a deterministic sequence of
//! feature tokens: bare word-like parts, adjacent-pair digrams with start
//! and end markers, field-path prefixed variants, and array lengths.
//! Tokenizing the same value twice yields the same sequence in the same
//! order; duplicate tokens are kept, they count as repeated evidence.

use serde_json::Value;

use crate::config::TokenizerConfig;

/// Characters that separate word-like parts inside a primitive value.
const BOUNDARY: &[char] = &[
    ' ', '\n', '\r', '\t', '<', '>', '/', '"', '\'', '.', ',', '!', '?', '(', ')', '[', ']', '&',
    ':', ';', '=', '\\', '{', '}', '|', '-', '_', '+', '@', '#',
];

/// Structured content → feature token sequence.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    config: TokenizerConfig,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        Tokenizer { config }
    }

    /// Extract the feature tokens of `value`, in document order.
    pub fn tokenize(&self, value: &Value) -> Vec<String> {
        self.tokenize_at(value, None)
    }

    /// Recursive worker; `path` is the dotted field path of `value` within
    /// the original document, `None` at the root. Array elements use the
    /// placeholder segment `N` so positions don't fragment the statistics.
    fn tokenize_at(&self, value: &Value, path: Option<&str>) -> Vec<String> {
        let mut tokens = Vec::new();

        if self.config.use_array_length {
            if let Value::Array(items) = value {
                let full = match path {
                    Some(p) => format!("{p}.length"),
                    None => "length".to_string(),
                };
                tokens.push(format!("{full}={}", items.len()));
            }
        }

        match value {
            Value::Array(items) => {
                let full = match path {
                    Some(p) => format!("{p}.N"),
                    None => "N".to_string(),
                };
                for item in items {
                    self.tokenize_field(item, &full, &mut tokens);
                }
            }
            Value::Object(fields) => {
                for (name, field) in fields {
                    let full = match path {
                        Some(p) => format!("{p}.{name}"),
                        None => name.clone(),
                    };
                    self.tokenize_field(field, &full, &mut tokens);
                }
            }
            _ => {}
        }

        tokens
    }

    fn tokenize_field(&self, value: &Value, full: &str, tokens: &mut Vec<String>) {
        match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                let text = primitive_text(value);
                let parts: Vec<&str> =
                    text.split(BOUNDARY).filter(|part| !part.is_empty()).collect();

                if self.config.use_bare {
                    tokens.extend(parts.iter().map(|part| part.to_string()));
                }

                let digrams = self.config.use_digrams.then(|| make_digrams(&parts));

                if let Some(digrams) = &digrams {
                    tokens.extend(digrams.iter().cloned());
                }

                if self.config.use_prefixes {
                    tokens.extend(parts.iter().map(|part| format!("{full}={part}")));
                    if let Some(digrams) = &digrams {
                        tokens.extend(digrams.iter().map(|digram| format!("{full}={digram}")));
                    }
                }
            }
            Value::Array(_) | Value::Object(_) => {
                tokens.extend(self.tokenize_at(value, Some(full)));
            }
            // Nulls carry no evidence.
            Value::Null => {}
        }
    }
}

/// String form of a primitive; strings are used as-is, numbers and
/// booleans via their display form.
fn primitive_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Adjacent-pair digrams over `parts`, with a `^first` start marker and a
/// `last^` end marker. A single part yields both markers; no parts yield
/// no digrams.
fn make_digrams(parts: &[&str]) -> Vec<String> {
    let mut digrams = Vec::new();

    for (i, part) in parts.iter().enumerate() {
        if i == 0 {
            digrams.push(format!("^{part}"));
        }
        if i == parts.len() - 1 {
            digrams.push(format!("{part}^"));
        } else {
            digrams.push(format!("{part}^{}", parts[i + 1]));
        }
    }

    digrams
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tokenize_is_deterministic() {
        let tokenizer = Tokenizer::default();
        let value = json!({ "a": "hello world", "b": { "c": [1, 2, 3] } });

        assert_eq!(tokenizer.tokenize(&value), tokenizer.tokenize(&value));
    }

    #[test]
    fn test_tokenize_simple_string_field() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize(&json!({ "a": "hello world" }));

        for expected in [
            "hello",
            "world",
            "^hello",
            "hello^world",
            "world^",
            "a=hello",
            "a=world",
            "a=^hello",
            "a=hello^world",
            "a=world^",
        ] {
            assert!(tokens.contains(&expected.to_string()), "missing {expected}");
        }
    }

    #[test]
    fn test_token_order_bare_digrams_prefixed() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize(&json!({ "a": "x y" }));

        assert_eq!(
            tokens,
            vec![
                "x", "y", "^x", "x^y", "y^", "a=x", "a=y", "a=^x", "a=x^y", "a=y^",
            ]
        );
    }

    #[test]
    fn test_single_part_gets_both_markers() {
        assert_eq!(make_digrams(&["abc"]), vec!["^abc", "abc^"]);
        assert!(make_digrams(&[]).is_empty());
    }

    #[test]
    fn test_boundary_characters_split_and_drop_empties() {
        let tokenizer = Tokenizer::new(TokenizerConfig {
            use_bare: true,
            use_digrams: false,
            use_prefixes: false,
            use_array_length: false,
        });
        let tokens = tokenizer.tokenize(&json!({ "a": "one--two..three  !?" }));

        assert_eq!(tokens, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_array_length_and_element_placeholder() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize(&json!({ "tags": ["spam", "eggs"] }));

        assert!(tokens.contains(&"tags.length=2".to_string()));
        assert!(tokens.contains(&"tags.N=spam".to_string()));
        assert!(tokens.contains(&"tags.N=eggs".to_string()));
    }

    #[test]
    fn test_root_array_length_token() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize(&json!(["a", "b"]));

        assert_eq!(tokens.first(), Some(&"length=2".to_string()));
        assert!(tokens.contains(&"N=a".to_string()));
    }

    #[test]
    fn test_nested_object_paths() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize(&json!({ "outer": { "inner": "deep" } }));

        assert!(tokens.contains(&"outer.inner=deep".to_string()));
        assert!(tokens.contains(&"deep".to_string()));
    }

    #[test]
    fn test_numbers_and_booleans_stringified() {
        let tokenizer = Tokenizer::new(TokenizerConfig {
            use_bare: true,
            use_digrams: false,
            use_prefixes: false,
            use_array_length: false,
        });
        let tokens = tokenizer.tokenize(&json!({ "n": 42, "b": true }));

        assert_eq!(tokens, vec!["42", "true"]);
    }

    #[test]
    fn test_null_and_primitive_root_emit_nothing() {
        let tokenizer = Tokenizer::default();

        assert!(tokenizer.tokenize(&json!({ "a": null })).is_empty());
        assert!(tokenizer.tokenize(&json!("bare string")).is_empty());
    }

    #[test]
    fn test_options_disable_token_kinds() {
        let tokenizer = Tokenizer::new(TokenizerConfig {
            use_bare: false,
            use_digrams: false,
            use_prefixes: true,
            use_array_length: false,
        });
        let tokens = tokenizer.tokenize(&json!({ "a": "x y" }));

        assert_eq!(tokens, vec!["a=x", "a=y"]);
    }
}
