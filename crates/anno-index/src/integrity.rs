//! Cross-checks between the primary and secondary index.
//!
//! [`DualIndex::check_integrity`] re-derives what the secondary index ought
//! to contain from the primary one and reports every discrepancy. A healthy
//! index yields an empty list.

use std::collections::HashMap;
use std::fmt;

use crate::dual::DualIndex;

/// A single discrepancy between the two maps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// A primary key differs from the id of the annotation stored under it.
    KeyMismatch { key: String, annotation: String },
    /// A live body has no secondary-index entry.
    MissingBodyEntry { body: String, annotation: String },
    /// A secondary entry names the wrong owner.
    WrongOwner {
        body: String,
        indexed: String,
        actual: String,
    },
    /// A secondary entry names an owner that does not hold the body.
    DanglingBody { body: String, owner: String },
    /// The same body id is held by more than one annotation (or twice by one).
    DuplicateBody { body: String },
    /// A body's back-reference disagrees with its holder.
    BodyBackReference {
        body: String,
        annotation: String,
        found: String,
    },
    /// A target's back-reference disagrees with its holder.
    TargetBackReference { annotation: String, found: String },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyMismatch { key, annotation } => {
                write!(f, "primary key {key} holds annotation {annotation}")
            }
            Self::MissingBodyEntry { body, annotation } => {
                write!(f, "body {body} of {annotation} missing from body index")
            }
            Self::WrongOwner {
                body,
                indexed,
                actual,
            } => write!(f, "body {body} indexed under {indexed}, held by {actual}"),
            Self::DanglingBody { body, owner } => {
                write!(f, "body {body} indexed under {owner} but not present in it")
            }
            Self::DuplicateBody { body } => write!(f, "body {body} held more than once"),
            Self::BodyBackReference {
                body,
                annotation,
                found,
            } => write!(f, "body {body} in {annotation} points back to {found}"),
            Self::TargetBackReference { annotation, found } => {
                write!(f, "target of {annotation} points back to {found}")
            }
        }
    }
}

impl DualIndex {
    /// Verify the four store invariants and return every violation found.
    pub fn check_integrity(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();
        let mut holders: HashMap<&str, &str> = HashMap::new();

        for (key, annotation) in &self.annotations {
            if key != &annotation.id {
                issues.push(IntegrityIssue::KeyMismatch {
                    key: key.clone(),
                    annotation: annotation.id.clone(),
                });
            }
            if annotation.target.annotation != annotation.id {
                issues.push(IntegrityIssue::TargetBackReference {
                    annotation: annotation.id.clone(),
                    found: annotation.target.annotation.clone(),
                });
            }

            for body in &annotation.bodies {
                if holders.insert(&body.id, &annotation.id).is_some() {
                    issues.push(IntegrityIssue::DuplicateBody {
                        body: body.id.clone(),
                    });
                }
                if body.annotation != annotation.id {
                    issues.push(IntegrityIssue::BodyBackReference {
                        body: body.id.clone(),
                        annotation: annotation.id.clone(),
                        found: body.annotation.clone(),
                    });
                }
                match self.bodies.get(&body.id) {
                    None => issues.push(IntegrityIssue::MissingBodyEntry {
                        body: body.id.clone(),
                        annotation: annotation.id.clone(),
                    }),
                    Some(owner) if owner != &annotation.id => {
                        issues.push(IntegrityIssue::WrongOwner {
                            body: body.id.clone(),
                            indexed: owner.clone(),
                            actual: annotation.id.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        for (body, owner) in &self.bodies {
            if !holders.contains_key(body.as_str()) {
                issues.push(IntegrityIssue::DanglingBody {
                    body: body.clone(),
                    owner: owner.clone(),
                });
            }
        }

        issues
    }
}
