use crate::entity::{Annotation, AnnotationDraft};
use crate::identity::IdSource;

/// Normalize a partial annotation into a complete, self-consistent one.
///
/// - Assigns an id from `ids` when the draft has none.
/// - Defaults a missing body list to empty and a missing target to an
///   empty target.
/// - Stamps the annotation id onto every body's and the target's
///   `annotation` back-reference, overwriting whatever the caller supplied.
///
/// Pure: touches no index and has no side effects beyond drawing an id.
pub fn sanitize(draft: AnnotationDraft, ids: &dyn IdSource) -> Annotation {
    let id = draft.id.unwrap_or_else(|| ids.next_id());

    let bodies = draft
        .bodies
        .unwrap_or_default()
        .into_iter()
        .map(|mut body| {
            body.annotation = id.clone();
            body
        })
        .collect();

    let mut target = draft.target.unwrap_or_default();
    target.annotation = id.clone();

    Annotation {
        id,
        bodies,
        target,
        extensions: draft.extensions,
    }
}
