//! Wire shapes of the W3C Web Annotation data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use anno_types::{Creator, Extensions};

/// JSON-LD context of every W3C annotation.
pub const ANNO_CONTEXT: &str = "http://www.w3.org/ns/anno.jsonld";

fn default_context() -> Value {
    Value::String(ANNO_CONTEXT.to_string())
}

fn default_annotation_type() -> String {
    "Annotation".to_string()
}

/// A field that holds either one value or an array of values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn len(&self) -> usize {
        match self {
            Self::Many(items) => items.len(),
            Self::One(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Self::Many(items) => items.iter(),
            Self::One(item) => std::slice::from_ref(item).iter(),
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    /// A single-element vector collapses to [`OneOrMany::One`].
    fn from(mut items: Vec<T>) -> Self {
        if items.len() == 1 {
            if let Some(item) = items.pop() {
                return Self::One(item);
            }
        }
        Self::Many(items)
    }
}

/// A W3C annotation body. Unlike store bodies, the id is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct W3cBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Creator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// A W3C annotation record.
///
/// Targets are kept as raw JSON: W3C allows either a bare IRI string or a
/// specific resource object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct W3cAnnotation {
    #[serde(rename = "@context", default = "default_context")]
    pub context: Value,
    #[serde(rename = "type", default = "default_annotation_type")]
    pub annotation_type: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "OneOrMany::is_empty")]
    pub body: OneOrMany<W3cBody>,
    #[serde(default)]
    pub target: OneOrMany<Value>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl W3cAnnotation {
    /// An annotation record with the standard context and no body.
    pub fn new(id: impl Into<String>, target: Value) -> Self {
        Self {
            context: default_context(),
            annotation_type: default_annotation_type(),
            id: id.into(),
            body: OneOrMany::default(),
            target: OneOrMany::One(target),
            extensions: Extensions::new(),
        }
    }
}
