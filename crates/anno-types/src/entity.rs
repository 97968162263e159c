//! Annotation, body, and target records.
//!
//! Every record has a fixed set of known fields plus an [`Extensions`] map
//! holding any other attributes verbatim. Extensions are flattened on the
//! wire, so unknown JSON keys survive a deserialize/serialize cycle.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque extension attributes, preserved through every mutation.
pub type Extensions = BTreeMap<String, Value>;

/// Author of a body.
///
/// Either a bare identifier string or an agent record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Creator {
    Id(String),
    Agent {
        id: String,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        agent_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl Creator {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Agent { id, .. } => id,
        }
    }
}

/// A semantic payload attached to one annotation (comment, tag, ...).
///
/// Body ids are unique across the whole store, not only within their
/// annotation. The `annotation` field is a back-reference that the store
/// stamps during sanitization; caller-supplied values are overwritten.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: String,
    #[serde(default)]
    pub annotation: String,
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

impl Body {
    /// Create a bare body belonging to `annotation`.
    pub fn new(id: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            annotation: annotation.into(),
            body_type: None,
            purpose: None,
            value: None,
            creator: None,
            created: None,
            extensions: Extensions::new(),
        }
    }

    pub fn with_type(mut self, body_type: impl Into<String>) -> Self {
        self.body_type = Some(body_type.into());
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_creator(mut self, creator: Creator) -> Self {
        self.creator = Some(creator);
        self
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    /// The `(id, annotation)` pair addressing this body inside a store.
    pub fn to_ref(&self) -> BodyRef {
        BodyRef::new(&self.id, &self.annotation)
    }
}

/// Address of a body: its id plus the id of the annotation holding it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyRef {
    pub id: String,
    pub annotation: String,
}

impl BodyRef {
    pub fn new(id: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            annotation: annotation.into(),
        }
    }
}

/// The subject an annotation refers to.
///
/// The selector payload is opaque to the store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub annotation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<Value>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Target {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Default::default()
        }
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = annotation.into();
        self
    }

    pub fn with_selector(mut self, selector: Value) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    /// Shallow merge: fields present on `patch` override fields on `self`.
    ///
    /// Absent fields on the patch keep the current value. Extension keys are
    /// merged key by key. The back-reference always stays `self.annotation`.
    pub fn merged_with(&self, patch: &Target) -> Target {
        let mut extensions = self.extensions.clone();
        extensions.extend(patch.extensions.iter().map(|(k, v)| (k.clone(), v.clone())));

        Target {
            annotation: self.annotation.clone(),
            source: patch.source.clone().or_else(|| self.source.clone()),
            selector: patch.selector.clone().or_else(|| self.selector.clone()),
            extensions,
        }
    }
}

/// Root entity: a target plus an insertion-ordered sequence of bodies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    #[serde(default)]
    pub bodies: Vec<Body>,
    pub target: Target,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Annotation {
    /// Look up a body of this annotation by id.
    pub fn body(&self, id: &str) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn body_ids(&self) -> impl Iterator<Item = &str> {
        self.bodies.iter().map(|b| b.id.as_str())
    }
}

/// Partial annotation as supplied by callers.
///
/// Missing pieces are filled in by [`crate::sanitize`]: an id from the
/// store's [`crate::IdSource`], an empty body list, an empty target.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bodies: Option<Vec<Body>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl AnnotationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Append a body. The body's back-reference is irrelevant here.
    pub fn with_body(mut self, body: Body) -> Self {
        self.bodies.get_or_insert_with(Vec::new).push(body);
        self
    }

    pub fn with_bodies(mut self, bodies: Vec<Body>) -> Self {
        self.bodies = Some(bodies);
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }
}

impl From<Annotation> for AnnotationDraft {
    fn from(a: Annotation) -> Self {
        Self {
            id: Some(a.id),
            bodies: Some(a.bodies),
            target: Some(a.target),
            extensions: a.extensions,
        }
    }
}
