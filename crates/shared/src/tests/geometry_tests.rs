use super::*;
use crate::protocol::NetsPayload;

fn wire(json: &str) -> Vec<WireNet> {
    serde_json::from_str::<NetsPayload>(json)
        .expect("nets payload")
        .nets
}

#[test]
fn sentinel_matches_within_tolerance_only() {
    assert!(is_sentinel(Point::new(0.0, f64::MAX)));
    assert!(is_sentinel(Point::new(3.5, f64::MAX - 1e19)));
    assert!(!is_sentinel(Point::new(0.0, 1.0e300)));
    assert!(!is_sentinel(Point::new(0.0, 0.0)));
    assert!(!is_sentinel(Point::new(f64::MAX, 0.0)));
}

#[test]
fn sentinel_x_carries_arc_height() {
    assert_eq!(Point::new(-0.25, SENTINEL_Y).arc_height(), Some(-0.25));
    assert_eq!(Point::new(1.0, 2.0).arc_height(), None);
}

#[test]
fn decodes_mixed_id_forms_and_sentinels() {
    let nets = decode_nets(wire(
        r#"{"nets":[{"name":"DDR_DQ0","primitives":[
            {"id":17,"type":"Path","layer":"TOP","width":0.0001,
             "points":[[0.0,0.0],[1.0,1.0],[0.5,1.7976931348623157e308],[2.0,2.0]]},
            {"id":"p-2","type":"Path","layer":"L3","width":0.0002,"points":[]}
        ]}]}"#,
    ))
    .expect("decode");

    assert_eq!(nets.len(), 1);
    let net = &nets[0];
    assert_eq!(net.name, "DDR_DQ0");
    let first = net.primitive(&PrimitiveId::Int(17)).expect("primitive 17");
    assert_eq!(first.kind, "Path");
    assert_eq!(first.points.len(), 4);
    assert_eq!(first.break_count(), 1);
    assert!(first.points[2].is_sentinel());

    let second = net.primitive(&PrimitiveId::from("p-2")).expect("primitive p-2");
    assert!(!second.has_geometry());
    assert_eq!(primitive_count(&nets), 2);
}

#[test]
fn rejects_points_that_are_not_pairs() {
    let err = decode_nets(wire(
        r#"{"nets":[{"name":"N1","primitives":[
            {"id":1,"type":"Path","layer":"TOP","width":1.0,"points":[[0.0,0.0],[1.0,2.0,3.0]]}
        ]}]}"#,
    ))
    .expect_err("three coordinates");

    assert_eq!(
        err,
        DecodeError::MalformedPoint {
            net: "N1".to_string(),
            primitive: PrimitiveId::Int(1),
            index: 1,
            arity: 3,
        }
    );
}

#[test]
fn rejects_duplicate_primitive_ids_within_a_net() {
    let err = decode_nets(wire(
        r#"{"nets":[{"name":"N1","primitives":[
            {"id":4,"type":"Path","layer":"TOP","width":1.0,"points":[]},
            {"id":4,"type":"Path","layer":"BOT","width":1.0,"points":[]}
        ]}]}"#,
    ))
    .expect_err("duplicate id");

    assert!(matches!(err, DecodeError::DuplicatePrimitiveId { .. }));
}

#[test]
fn same_id_in_different_nets_is_allowed() {
    let nets = decode_nets(wire(
        r#"{"nets":[
            {"name":"A","primitives":[{"id":4,"type":"Path","layer":"TOP","width":1.0,"points":[]}]},
            {"name":"B","primitives":[{"id":4,"type":"Path","layer":"TOP","width":1.0,"points":[]}]}
        ]}"#,
    ))
    .expect("decode");

    let (net, _) = find_primitive(&nets, &PrimitiveId::Int(4)).expect("found");
    assert_eq!(net.name, "A");
}

#[test]
fn polylines_split_on_sentinels_and_skip_empty_runs() {
    let primitive = Primitive {
        id: PrimitiveId::Int(1),
        kind: "Path".to_string(),
        layer: "TOP".to_string(),
        width: 1.0,
        points: vec![
            Point::sentinel(),
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::sentinel(),
            Point::sentinel(),
            Point::new(5.0, 5.0),
            Point::sentinel(),
        ],
    };

    let runs: Vec<&[Point]> = primitive.polylines().collect();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0], &[Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
    assert_eq!(runs[1], &[Point::new(5.0, 5.0)]);
}
