//! Conversions between store entities and W3C records.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use anno_types::{Annotation, Body, Target};

use crate::error::{W3cError, W3cResult};
use crate::model::{OneOrMany, W3cAnnotation, W3cBody};

const BODY_ID_DOMAIN: &[u8] = b"anno-w3c-body-v1:";

/// Deterministic id for a body that arrived without one.
///
/// `"h:"` followed by the first 16 hex characters of a BLAKE3 hash over the
/// owning annotation id, the body's canonical JSON (object keys sorted, no
/// whitespace), and `occurrence`: the number of earlier bodies in the same
/// record with identical content. Equal bodies on different annotations,
/// or repeated within one annotation, get distinct ids, while
/// re-importing the same record yields the same ids.
pub fn body_content_id(annotation_id: &str, body: &W3cBody, occurrence: usize) -> W3cResult<String> {
    Ok(hash_body(annotation_id, &canonical_body(body)?, occurrence))
}

fn canonical_body(body: &W3cBody) -> W3cResult<String> {
    let value = serde_json::to_value(body)?;
    let mut canonical = String::new();
    write_canonical(&value, &mut canonical);
    Ok(canonical)
}

fn hash_body(annotation_id: &str, canonical: &str, occurrence: usize) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(BODY_ID_DOMAIN);
    hasher.update(annotation_id.as_bytes());
    hasher.update(b"\0");
    hasher.update(canonical.as_bytes());
    hasher.update(&(occurrence as u64).to_le_bytes());
    format!("h:{}", hex::encode(&hasher.finalize().as_bytes()[..8]))
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Convert W3C bodies to store bodies owned by `annotation_id`.
///
/// Bodies without an id get [`body_content_id`]. Unknown attributes are
/// kept as extensions.
pub fn parse_w3c_bodies(body: &OneOrMany<W3cBody>, annotation_id: &str) -> W3cResult<Vec<Body>> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut bodies = Vec::with_capacity(body.len());

    for w3c in body.iter() {
        let id = match w3c.id {
            Some(ref id) => id.clone(),
            None => {
                let canonical = canonical_body(w3c)?;
                let occurrence = seen.entry(canonical.clone()).or_insert(0);
                let id = hash_body(annotation_id, &canonical, *occurrence);
                *occurrence += 1;
                debug!(annotation = %annotation_id, body = %id, "derived body id from content");
                id
            }
        };
        bodies.push(Body {
            id,
            annotation: annotation_id.to_string(),
            body_type: w3c.body_type.clone(),
            purpose: w3c.purpose.clone(),
            value: w3c.value.clone(),
            creator: w3c.creator.clone(),
            created: w3c.created,
            extensions: w3c.extensions.clone(),
        });
    }
    Ok(bodies)
}

/// Convert store bodies to W3C bodies.
///
/// Both the back-reference and the body id are dropped, so re-importing
/// the output derives ids from content again.
pub fn serialize_w3c_bodies(bodies: &[Body]) -> Vec<W3cBody> {
    bodies
        .iter()
        .map(|b| W3cBody {
            id: None,
            body_type: b.body_type.clone(),
            purpose: b.purpose.clone(),
            value: b.value.clone(),
            creator: b.creator.clone(),
            created: b.created,
            extensions: b.extensions.clone(),
        })
        .collect()
}

fn parse_target(id: &str, raw: Value) -> W3cResult<Target> {
    let target = match raw {
        Value::String(source) => Target::new(source),
        Value::Object(_) => {
            serde_json::from_value::<Target>(raw).map_err(|e| W3cError::InvalidTarget {
                id: id.to_string(),
                reason: e.to_string(),
            })?
        }
        other => {
            return Err(W3cError::InvalidTarget {
                id: id.to_string(),
                reason: format!("expected a string or an object, got {other}"),
            })
        }
    };
    Ok(target.with_annotation(id))
}

/// Convert a W3C record into a store annotation.
pub fn parse_w3c_annotation(record: W3cAnnotation) -> W3cResult<Annotation> {
    let id = record.id;
    let mut targets = record.target.into_vec();
    let raw_target = match targets.len() {
        0 => return Err(W3cError::MissingTarget { id }),
        1 => targets.remove(0),
        count => return Err(W3cError::MultipleTargets { id, count }),
    };

    let bodies = parse_w3c_bodies(&record.body, &id)?;
    let target = parse_target(&id, raw_target)?;
    Ok(Annotation {
        id,
        bodies,
        target,
        extensions: record.extensions,
    })
}

/// Convert a store annotation into a W3C record.
///
/// A target with a source and no other attributes is written as a bare
/// IRI string.
pub fn serialize_w3c_annotation(annotation: &Annotation) -> W3cResult<W3cAnnotation> {
    let target = &annotation.target;
    let raw_target = match (&target.source, &target.selector) {
        (Some(source), None) if target.extensions.is_empty() => Value::String(source.clone()),
        _ => {
            let mut value = serde_json::to_value(target)?;
            if let Value::Object(ref mut map) = value {
                map.remove("annotation");
            }
            value
        }
    };

    let mut record = W3cAnnotation::new(annotation.id.clone(), raw_target);
    record.body = serialize_w3c_bodies(&annotation.bodies).into();
    record.extensions = annotation.extensions.clone();
    Ok(record)
}

/// Parse a JSON document holding one W3C record or an array of them.
///
/// Records that cannot be read or converted are skipped with a warning;
/// malformed JSON fails the whole document.
pub fn parse_w3c_json(input: &str) -> W3cResult<Vec<Annotation>> {
    let records: OneOrMany<Value> = serde_json::from_str(input)?;
    let mut annotations = Vec::with_capacity(records.len());
    for (position, raw) in records.into_vec().into_iter().enumerate() {
        let id = raw
            .get("id")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| format!("#{position}"));
        let converted = serde_json::from_value::<W3cAnnotation>(raw)
            .map_err(W3cError::from)
            .and_then(parse_w3c_annotation);
        match converted {
            Ok(annotation) => annotations.push(annotation),
            Err(e) => warn!(annotation = %id, error = %e, "skipping W3C record"),
        }
    }
    Ok(annotations)
}

/// Serialize annotations as a pretty-printed JSON array of W3C records.
pub fn to_w3c_json(annotations: &[Annotation]) -> W3cResult<String> {
    let records = annotations
        .iter()
        .map(serialize_w3c_annotation)
        .collect::<W3cResult<Vec<_>>>()?;
    Ok(serde_json::to_string_pretty(&records)?)
}
