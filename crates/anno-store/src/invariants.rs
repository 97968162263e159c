//! Randomized operation sequences checked against the index invariants.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use anno_fabric::ObserveOptions;
use anno_types::{Annotation, Body, BodyRef, Origin, Target};

use crate::error::StoreResult;
use crate::store::AnnotationStore;
use crate::testing::{draft, fixture_store, Recorder};

#[derive(Clone, Debug)]
enum Op {
    Add { id: u8, bodies: Vec<u8> },
    Rename { from: u8, to: u8 },
    Update { id: u8, bodies: Vec<u8> },
    Upsert { id: u8, bodies: Vec<u8> },
    Delete(u8),
    AddBody { annotation: u8, body: u8 },
    DeleteBody { annotation: u8, body: u8 },
    RenameBody { annotation: u8, from: u8, to: u8 },
    UpdateTarget(u8),
    BulkAdd { ids: Vec<u8>, replace: bool },
    BulkDelete(Vec<u8>),
    BulkUpsert(Vec<(u8, Vec<u8>)>),
    BulkUpdateBody(Vec<(u8, u8)>),
    BulkUpdateTarget(Vec<u8>),
    Clear,
}

fn a(n: u8) -> String {
    format!("a{n}")
}

fn b(n: u8) -> String {
    format!("b{n}")
}

fn body_ids(bodies: &[u8]) -> Vec<String> {
    bodies.iter().map(|n| b(*n)).collect()
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..6, prop::collection::vec(0u8..12, 0..3))
            .prop_map(|(id, bodies)| Op::Add { id, bodies }),
        2 => (0u8..6, 0u8..6).prop_map(|(from, to)| Op::Rename { from, to }),
        2 => (0u8..6, prop::collection::vec(0u8..12, 0..3))
            .prop_map(|(id, bodies)| Op::Update { id, bodies }),
        2 => (0u8..6, prop::collection::vec(0u8..12, 0..3))
            .prop_map(|(id, bodies)| Op::Upsert { id, bodies }),
        2 => (0u8..6).prop_map(Op::Delete),
        3 => (0u8..6, 0u8..12).prop_map(|(annotation, body)| Op::AddBody { annotation, body }),
        2 => (0u8..6, 0u8..12).prop_map(|(annotation, body)| Op::DeleteBody { annotation, body }),
        2 => (0u8..6, 0u8..12, 0u8..12)
            .prop_map(|(annotation, from, to)| Op::RenameBody { annotation, from, to }),
        1 => (0u8..6).prop_map(Op::UpdateTarget),
        1 => (prop::collection::vec(0u8..6, 0..4), any::<bool>())
            .prop_map(|(ids, replace)| Op::BulkAdd { ids, replace }),
        1 => prop::collection::vec(0u8..6, 0..4).prop_map(Op::BulkDelete),
        1 => prop::collection::vec((0u8..6, prop::collection::vec(0u8..12, 0..3)), 0..4)
            .prop_map(Op::BulkUpsert),
        1 => prop::collection::vec((0u8..6, 0u8..12), 0..4).prop_map(Op::BulkUpdateBody),
        1 => prop::collection::vec(0u8..6, 0..4).prop_map(Op::BulkUpdateTarget),
        1 => Just(Op::Clear),
    ]
}

fn apply(store: &AnnotationStore, op: &Op) -> StoreResult<()> {
    let origin = Origin::Local;
    match op {
        Op::Add { id, bodies } => {
            let bodies = body_ids(bodies);
            let refs: Vec<&str> = bodies.iter().map(String::as_str).collect();
            store.add(draft(&a(*id), &refs), origin).map(drop)
        }
        Op::Rename { from, to } => {
            let Some(current) = store.get_annotation(&a(*from)) else {
                return Ok(());
            };
            let renamed = anno_types::AnnotationDraft::from(current).with_id(a(*to));
            store.update_by_id(&a(*from), renamed, origin).map(drop)
        }
        Op::Update { id, bodies } => {
            let id = a(*id);
            let replacement = Annotation {
                bodies: bodies
                    .iter()
                    .map(|n| Body::new(b(*n), id.clone()).with_value("updated"))
                    .collect(),
                target: Target::new("img1").with_annotation(id.clone()),
                extensions: Default::default(),
                id,
            };
            store.update(replacement, origin).map(drop)
        }
        Op::Upsert { id, bodies } => {
            let bodies = body_ids(bodies);
            let refs: Vec<&str> = bodies.iter().map(String::as_str).collect();
            store.upsert(draft(&a(*id), &refs), origin).map(drop)
        }
        Op::Delete(id) => store.delete(&a(*id), origin).map(drop),
        Op::AddBody { annotation, body } => store
            .add_body(Body::new(b(*body), a(*annotation)), origin)
            .map(drop),
        Op::DeleteBody { annotation, body } => store
            .delete_body(&BodyRef::new(b(*body), a(*annotation)), origin)
            .map(drop),
        Op::RenameBody { annotation, from, to } => store
            .update_body(
                &BodyRef::new(b(*from), a(*annotation)),
                Body::new(b(*to), a(*annotation)).with_value("renamed"),
                origin,
            )
            .map(drop),
        Op::UpdateTarget(id) => store
            .update_target(Target::new("moved").with_annotation(a(*id)), origin)
            .map(drop),
        Op::BulkAdd { ids, replace } => {
            let drafts = ids.iter().map(|n| draft(&a(*n), &[])).collect();
            store.bulk_add(drafts, *replace, origin).map(drop)
        }
        Op::BulkDelete(ids) => store.bulk_delete(ids.iter().map(|n| a(*n)), origin).map(drop),
        Op::BulkUpsert(records) => {
            let drafts = records
                .iter()
                .map(|(id, bodies)| {
                    let bodies = body_ids(bodies);
                    let refs: Vec<&str> = bodies.iter().map(String::as_str).collect();
                    draft(&a(*id), &refs)
                })
                .collect();
            store.bulk_upsert(drafts, origin).map(drop)
        }
        Op::BulkUpdateBody(pairs) => {
            let bodies = pairs
                .iter()
                .map(|(annotation, body)| Body::new(b(*body), a(*annotation)).with_value("bulk"))
                .collect();
            store.bulk_update_body(bodies, origin).map(drop)
        }
        Op::BulkUpdateTarget(ids) => {
            let targets: Vec<Target> = ids
                .iter()
                .map(|n| Target::new("bulk-moved").with_annotation(a(*n)))
                .collect();
            store.bulk_update_target(&targets, origin).map(drop)
        }
        Op::Clear => store.clear(origin).map(drop),
    }
}

/// Body index as derived from the annotations themselves.
fn derived_body_owners(store: &AnnotationStore) -> BTreeMap<String, String> {
    store
        .all()
        .into_iter()
        .flat_map(|ann| {
            ann.bodies
                .into_iter()
                .map(move |body| (body.id, ann.id.clone()))
                .collect::<Vec<_>>()
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn indices_stay_consistent(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let store = fixture_store();
        let recorder = Recorder::attach(&store, ObserveOptions::default());

        for op in &ops {
            let before = store.all();
            let events_before = recorder.count();

            let result = apply(&store, op);

            if result.is_err() {
                prop_assert_eq!(store.all(), before, "hard failure mutated state: {:?}", op);
                prop_assert_eq!(recorder.count(), events_before);
            }
            prop_assert!(store.verify_integrity().is_empty(), "after {:?}", op);

            let ids: BTreeSet<String> = store.all().into_iter().map(|x| x.id).collect();
            prop_assert_eq!(ids.len(), store.len());

            let index = store.index.borrow();
            let indexed: BTreeMap<String, String> = index
                .body_entries()
                .map(|(body, owner)| (body.to_string(), owner.to_string()))
                .collect();
            drop(index);
            prop_assert_eq!(indexed, derived_body_owners(&store));

            if recorder.count() > events_before {
                prop_assert_eq!(recorder.last().state, store.all());
            }
        }
    }
}
