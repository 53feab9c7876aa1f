use lwv_shared::{
    domain::PrimitiveId,
    geometry::{Net, Point, Primitive},
    protocol::{SettingsPatch, VariationStats, WireStats},
};

use super::*;

fn nets(ids: &[i64]) -> Vec<Net> {
    vec![Net {
        name: "GND".to_string(),
        primitives: ids
            .iter()
            .map(|id| Primitive {
                id: PrimitiveId::Int(*id),
                kind: "Path".to_string(),
                layer: "TOP".to_string(),
                width: 0.1,
                points: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            })
            .collect(),
    }]
}

fn stats(id: i64) -> VariationStats {
    VariationStats::from_wire(
        PrimitiveId::Int(id),
        WireStats {
            s: vec![0.0, 1.0],
            w_s: vec![95.0, 105.0],
            mu_w: 100.0,
        },
    )
    .expect("decode")
    .expect("present")
}

#[test]
fn fresh_store_starts_empty_with_defaults() {
    let store = SessionStore::default();
    let snapshot = store.snapshot();
    assert!(snapshot.nets.is_empty());
    assert_eq!(snapshot.selected, None);
    assert_eq!(snapshot.stats, None);
    assert!(!snapshot.loading);
    assert_eq!(snapshot.settings, Settings::default());
}

#[test]
fn selecting_none_clears_stats_synchronously() {
    let store = SessionStore::default();
    store.replace_nets(nets(&[1]), SelectionPolicy::Clear);
    let ticket = store
        .select_primitive(Some(PrimitiveId::Int(1)))
        .expect("ticket");
    assert!(store.set_stats(&ticket, Some(stats(1))));
    assert!(store.snapshot().stats.is_some());

    assert_eq!(store.select_primitive(None), None);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.selected, None);
    assert_eq!(snapshot.stats, None);
}

#[test]
fn stale_ticket_cannot_write_stats() {
    let store = SessionStore::default();
    let first = store
        .select_primitive(Some(PrimitiveId::Int(1)))
        .expect("first");
    let second = store
        .select_primitive(Some(PrimitiveId::Int(2)))
        .expect("second");

    assert!(!store.set_stats(&first, Some(stats(1))));
    assert!(store.set_stats(&second, Some(stats(2))));
    assert!(!store.is_current(&first));
    assert_eq!(
        store.snapshot().stats.map(|s| s.primitive_id().clone()),
        Some(PrimitiveId::Int(2))
    );
}

#[test]
fn reselecting_the_same_primitive_is_a_no_op() {
    let store = SessionStore::default();
    let ticket = store
        .select_primitive(Some(PrimitiveId::Int(4)))
        .expect("ticket");
    assert!(store.set_stats(&ticket, Some(stats(4))));

    assert_eq!(store.select_primitive(Some(PrimitiveId::Int(4))), None);
    assert!(store.snapshot().stats.is_some());
    assert!(store.is_current(&ticket));
}

#[test]
fn replacing_nets_invalidates_outstanding_tickets() {
    let store = SessionStore::default();
    store.replace_nets(nets(&[1, 2]), SelectionPolicy::Clear);
    let ticket = store
        .select_primitive(Some(PrimitiveId::Int(2)))
        .expect("ticket");
    let revision = store.nets_revision();

    store.replace_nets(nets(&[1, 2]), SelectionPolicy::Keep);

    assert_ne!(store.nets_revision(), revision);
    assert_eq!(store.selected(), Some(PrimitiveId::Int(2)));
    assert!(!store.set_stats(&ticket, Some(stats(2))));
    let fresh = store.stats_ticket().expect("fresh ticket");
    assert!(store.set_stats(&fresh, Some(stats(2))));
}

#[test]
fn clear_policy_drops_selection_and_stats() {
    let store = SessionStore::default();
    store.replace_nets(nets(&[1]), SelectionPolicy::Clear);
    let ticket = store
        .select_primitive(Some(PrimitiveId::Int(1)))
        .expect("ticket");
    store.set_stats(&ticket, Some(stats(1)));

    store.replace_nets(nets(&[7]), SelectionPolicy::Clear);

    let snapshot = store.snapshot();
    assert_eq!(snapshot.selected, None);
    assert_eq!(snapshot.stats, None);
    assert_eq!(snapshot.nets[0].primitives[0].id, PrimitiveId::Int(7));
}

#[test]
fn partial_settings_update_keeps_other_fields() {
    let store = SessionStore::default();
    let before = store.settings();
    let after = store.update_settings(&SettingsPatch {
        sigma_w: Some(15.0),
        ..SettingsPatch::default()
    });

    assert_eq!(after.sigma_w, 15.0);
    assert_eq!(after.l_c, before.l_c);
    assert_eq!(after.model, before.model);
    assert_eq!(after.ds_arc, before.ds_arc);
    assert_eq!(after.n_resample, before.n_resample);
    assert_eq!(after.w_min, before.w_min);
    assert_eq!(after.w_max, before.w_max);
    assert_eq!(store.settings(), after);
}

#[test]
fn subscribers_observe_every_applied_action() {
    let store = SessionStore::default();
    let mut updates = store.subscribe();
    let start = *updates.borrow_and_update();

    store.set_loading(true);
    assert!(updates.has_changed().expect("sender alive"));
    let after_loading = *updates.borrow_and_update();
    assert_ne!(after_loading, start);

    store.set_loading(true);
    assert!(!updates.has_changed().expect("sender alive"));

    store.clear_stats();
    assert!(updates.has_changed().expect("sender alive"));
}

#[test]
fn clones_share_state() {
    let store = SessionStore::default();
    let handle = store.clone();
    handle.replace_nets(nets(&[3]), SelectionPolicy::Clear);
    assert_eq!(store.snapshot().nets.len(), 1);
}
