use serde::{Deserialize, Serialize};

use anno_types::Origin;

use crate::event::{ChangeEvent, ChangeKind};

/// Event shapes an observer can opt out of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ignore {
    /// Skip events consisting solely of body updates.
    BodyOnly,
    /// Skip events consisting solely of target updates.
    TargetOnly,
}

/// Filter for subscribing to a subset of change events.
///
/// Every `Some` field narrows the subscription; all must match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserveOptions {
    /// If set, only events with this origin are delivered.
    pub origin: Option<Origin>,
    /// If set, only events carrying at least one of these kinds are delivered.
    pub kinds: Option<Vec<ChangeKind>>,
    /// If set, only events touching at least one of these annotation ids.
    pub annotations: Option<Vec<String>>,
    /// If set, events of the given shape are skipped.
    pub ignore: Option<Ignore>,
}

impl ObserveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn kinds(mut self, kinds: impl IntoIterator<Item = ChangeKind>) -> Self {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    pub fn annotations<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.annotations = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn ignore(mut self, ignore: Ignore) -> Self {
        self.ignore = Some(ignore);
        self
    }

    /// Returns `true` if the given event passes this filter.
    pub fn matches(&self, event: &ChangeEvent) -> bool {
        if let Some(origin) = self.origin {
            if event.origin != origin {
                return false;
            }
        }
        if let Some(ref kinds) = self.kinds {
            if !event.changes.kinds().iter().any(|k| kinds.contains(k)) {
                return false;
            }
        }
        if let Some(ref ids) = self.annotations {
            if !ids.iter().any(|id| event.changes.touches(id)) {
                return false;
            }
        }
        match self.ignore {
            Some(Ignore::BodyOnly) if event.changes.is_body_only() => false,
            Some(Ignore::TargetOnly) if event.changes.is_target_only() => false,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ChangeSet;
    use anno_diff::Update;
    use anno_types::{Annotation, Body, Extensions, Target};

    fn annotation(id: &str) -> Annotation {
        Annotation {
            id: id.into(),
            bodies: vec![],
            target: Target::new("img").with_annotation(id),
            extensions: Extensions::new(),
        }
    }

    fn event(origin: Origin, changes: ChangeSet) -> ChangeEvent {
        ChangeEvent::new(origin, changes, vec![])
    }

    #[test]
    fn default_matches_everything() {
        let opts = ObserveOptions::default();
        assert!(opts.matches(&event(Origin::Local, ChangeSet::created(vec![annotation("a")]))));
        assert!(opts.matches(&event(Origin::Remote, ChangeSet::deleted(vec![annotation("a")]))));
    }

    #[test]
    fn origin_filter() {
        let opts = ObserveOptions::new().origin(Origin::Remote);
        assert!(!opts.matches(&event(Origin::Local, ChangeSet::created(vec![annotation("a")]))));
        assert!(opts.matches(&event(Origin::Remote, ChangeSet::created(vec![annotation("a")]))));
    }

    #[test]
    fn kind_filter() {
        let opts = ObserveOptions::new().kinds([ChangeKind::Deleted]);
        assert!(!opts.matches(&event(Origin::Local, ChangeSet::created(vec![annotation("a")]))));
        assert!(opts.matches(&event(Origin::Local, ChangeSet::deleted(vec![annotation("a")]))));
    }

    #[test]
    fn annotation_filter() {
        let opts = ObserveOptions::new().annotations(["a2"]);
        assert!(!opts.matches(&event(Origin::Local, ChangeSet::created(vec![annotation("a1")]))));
        assert!(opts.matches(&event(
            Origin::Local,
            ChangeSet::created(vec![annotation("a1"), annotation("a2")])
        )));
    }

    #[test]
    fn ignore_body_only() {
        let old = annotation("a1");
        let mut new = old.clone();
        new.bodies.push(Body::new("b1", "a1"));
        let update = Update::new(old, new.clone()).with_bodies_created(new.bodies.clone());

        let opts = ObserveOptions::new().ignore(Ignore::BodyOnly);
        assert!(!opts.matches(&event(Origin::Local, ChangeSet::updated(vec![update.clone()]))));

        let mut mixed = ChangeSet::updated(vec![update]);
        mixed.created.push(annotation("a2"));
        assert!(opts.matches(&event(Origin::Local, mixed)));

        let target_opts = ObserveOptions::new().ignore(Ignore::TargetOnly);
        assert!(target_opts.matches(&event(
            Origin::Local,
            ChangeSet::created(vec![annotation("a3")])
        )));
    }
}
