//! Manifest decoding
//!
//! Turns caller-supplied text holding one or more YAML documents (separated
//! by `---`) or concatenated JSON objects into a lazy sequence of untyped
//! resources. Input starting with `{` is read as a JSON stream, anything else
//! as YAML. Both end up as the same `DynamicObject` representation.
//!
//! The sequence is single pass. Running out of documents ends iteration
//! (`None`); a document that fails to decode yields one `Err` and then the
//! decoder stops.

use crate::error::TektonError;
use crate::mapper::split_api_version;
use kube::api::DynamicObject;
use serde::Deserialize;
use serde_json::Value;

type JsonStream<'a> = serde_json::StreamDeserializer<'a, serde_json::de::StrRead<'a>, Value>;

enum Documents<'a> {
    Yaml(serde_yaml::Deserializer<'a>),
    Json(JsonStream<'a>),
}

/// Lazy decoder over a multi-document manifest
pub struct ManifestDecoder<'a> {
    documents: Documents<'a>,
    index: usize,
    done: bool,
}

impl std::fmt::Debug for ManifestDecoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestDecoder")
            .field("index", &self.index)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<'a> ManifestDecoder<'a> {
    /// Decoder over `input`, JSON when it starts with `{`
    pub fn new(input: &'a str) -> Self {
        let documents = if input.trim_start().starts_with('{') {
            Documents::Json(serde_json::Deserializer::from_str(input).into_iter::<Value>())
        } else {
            Documents::Yaml(serde_yaml::Deserializer::from_str(input))
        };
        Self {
            documents,
            index: 0,
            done: false,
        }
    }

    /// Next raw document, skipping empty ones
    fn next_value(&mut self) -> Option<Result<Value, TektonError>> {
        loop {
            let value = match &mut self.documents {
                Documents::Yaml(docs) => {
                    let doc = docs.next()?;
                    yaml_to_json(doc).map_err(|e| {
                        TektonError::Decode(format!("document {}: {e}", self.index))
                    })
                }
                Documents::Json(stream) => stream.next()?.map_err(|e| {
                    TektonError::Decode(format!("document {}: {e}", self.index))
                }),
            };
            match value {
                Ok(Value::Null) => continue,
                other => return Some(other),
            }
        }
    }
}

impl Iterator for ManifestDecoder<'_> {
    type Item = Result<DynamicObject, TektonError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self
            .next_value()?
            .and_then(|value| to_raw_resource(value, self.index));
        self.index += 1;
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

/// Read one YAML document, expanding `<<` merge keys
fn yaml_to_json(doc: serde_yaml::Deserializer<'_>) -> Result<Value, Box<dyn std::error::Error>> {
    let mut value = serde_yaml::Value::deserialize(doc)?;
    value.apply_merge()?;
    Ok(serde_json::to_value(value)?)
}

/// Decode every document up front, failing on the first bad one
pub fn decode_all(input: &str) -> Result<Vec<DynamicObject>, TektonError> {
    ManifestDecoder::new(input).collect()
}

/// Validate the type fields of a document and convert it to a `DynamicObject`
fn to_raw_resource(value: Value, index: usize) -> Result<DynamicObject, TektonError> {
    let Value::Object(fields) = &value else {
        return Err(TektonError::Decode(format!(
            "document {index}: expected a mapping, found {}",
            type_name(&value)
        )));
    };

    let api_version = match fields.get("apiVersion") {
        Some(Value::String(s)) if !s.is_empty() => s,
        _ => {
            return Err(TektonError::Decode(format!(
                "document {index}: Object 'apiVersion' is missing or not a string"
            )));
        }
    };
    if split_api_version(api_version).is_none() {
        return Err(TektonError::Decode(format!(
            "document {index}: malformed apiVersion '{api_version}'"
        )));
    }
    match fields.get("kind") {
        Some(Value::String(s)) if !s.is_empty() => {}
        _ => {
            return Err(TektonError::Decode(format!(
                "document {index}: Object 'Kind' is missing or not a string"
            )));
        }
    }

    serde_json::from_value(value)
        .map_err(|e| TektonError::Decode(format!("document {index}: {e}")))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::ResourceExt;

    const TWO_TASKS: &str = r#"
apiVersion: tekton.dev/v1
kind: Task
metadata:
  name: first
  namespace: default
spec:
  steps:
  - name: echo
    image: alpine
---
apiVersion: tekton.dev/v1
kind: Task
metadata:
  name: second
spec: {}
"#;

    #[test]
    fn decodes_yaml_documents_in_order() {
        let objects = decode_all(TWO_TASKS).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].name_any(), "first");
        assert_eq!(objects[0].namespace().as_deref(), Some("default"));
        assert_eq!(objects[1].name_any(), "second");
        assert_eq!(objects[1].namespace(), None);
        assert_eq!(
            objects[0].types.as_ref().map(|t| t.kind.as_str()),
            Some("Task")
        );
        assert_eq!(objects[0].data["spec"]["steps"][0]["image"], "alpine");
    }

    #[test]
    fn decodes_concatenated_json_objects() {
        let input = r#"{"apiVersion":"tekton.dev/v1","kind":"Pipeline","metadata":{"name":"a"},"spec":{}}
{"apiVersion":"tekton.dev/v1","kind":"Pipeline","metadata":{"name":"b"},"spec":{}}"#;
        let names: Vec<String> = ManifestDecoder::new(input)
            .map(|r| r.unwrap().name_any())
            .collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn yaml_and_json_normalize_identically() {
        let yaml = "apiVersion: tekton.dev/v1\nkind: Task\nmetadata:\n  name: t\nspec:\n  params:\n  - name: ARGS\n    type: array\n";
        let json = r#"{"apiVersion":"tekton.dev/v1","kind":"Task","metadata":{"name":"t"},"spec":{"params":[{"name":"ARGS","type":"array"}]}}"#;
        let a = decode_all(yaml).unwrap();
        let b = decode_all(json).unwrap();
        assert_eq!(
            serde_json::to_value(&a[0]).unwrap(),
            serde_json::to_value(&b[0]).unwrap()
        );
    }

    #[test]
    fn empty_input_and_empty_documents_are_skipped() {
        assert!(decode_all("").unwrap().is_empty());
        let input = format!("---\n{TWO_TASKS}\n---\n");
        assert_eq!(decode_all(&input).unwrap().len(), 2);
    }

    #[test]
    fn missing_kind_fails_that_document() {
        let input = "apiVersion: tekton.dev/v1\nmetadata:\n  name: x\n";
        let err = decode_all(input).unwrap_err();
        assert!(matches!(err, TektonError::Decode(ref m) if m.contains("Kind")));
    }

    #[test]
    fn malformed_api_version_fails_that_document() {
        let input = "apiVersion: tekton.dev/v1/extra\nkind: Task\nmetadata:\n  name: x\n";
        let err = decode_all(input).unwrap_err();
        assert!(matches!(err, TektonError::Decode(ref m) if m.contains("malformed apiVersion")));
    }

    #[test]
    fn decoder_stops_after_the_first_error() {
        let input = format!("{TWO_TASKS}\n---\nkind: Task\nmetadata: {{}}\n---\n{TWO_TASKS}");
        let mut decoder = ManifestDecoder::new(&input);
        assert!(decoder.next().unwrap().is_ok());
        assert!(decoder.next().unwrap().is_ok());
        assert!(decoder.next().unwrap().is_err());
        assert!(decoder.next().is_none());
    }

    #[test]
    fn merge_keys_are_expanded() {
        let input = "apiVersion: tekton.dev/v1
kind: Task
metadata:
  name: merged
  labels: &labels
    app: merged
  annotations:
    <<: *labels
    team: ci
spec: {}
";
        let objects = decode_all(input).unwrap();
        let annotations = objects[0].annotations();
        assert_eq!(annotations.get("app").map(String::as_str), Some("merged"));
        assert_eq!(annotations.get("team").map(String::as_str), Some("ci"));
        assert!(!annotations.contains_key("<<"));
        assert_eq!(objects[0].labels().get("app").map(String::as_str), Some("merged"));
    }

    #[test]
    fn scalar_document_is_rejected() {
        let err = decode_all("just a string").unwrap_err();
        assert!(matches!(err, TektonError::Decode(ref m) if m.contains("a string")));
    }
}
