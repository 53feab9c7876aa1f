use super::*;

#[test]
fn load_response_distinguishes_error_shape() {
    let failed: LoadEdbResponse =
        serde_json::from_str(r#"{"error":"license server unreachable"}"#).expect("error shape");
    assert!(
        matches!(failed, LoadEdbResponse::Failed { ref error } if error == "license server unreachable")
    );

    let loaded: LoadEdbResponse =
        serde_json::from_str(r#"{"nets":[{"name":"N","primitives":[]}]}"#).expect("nets shape");
    match loaded {
        LoadEdbResponse::Loaded(payload) => assert_eq!(payload.nets.len(), 1),
        LoadEdbResponse::Failed { .. } => panic!("expected nets"),
    }
}

#[test]
fn empty_object_decodes_as_no_nets() {
    let loaded: LoadEdbResponse = serde_json::from_str("{}").expect("empty object");
    assert!(matches!(loaded, LoadEdbResponse::Loaded(ref p) if p.nets.is_empty()));
}

#[test]
fn settings_serialize_with_engine_field_names() {
    let value = serde_json::to_value(Settings::default()).expect("serialize");
    assert_eq!(value["sigma_w"], 10.0);
    assert_eq!(value["L_c"], 0.002);
    assert_eq!(value["model"], "matern32");
    assert_eq!(value["ds_arc"], 2e-4);
    assert_eq!(value["n_resample"], 1200);
    assert_eq!(value["w_min"], 80.0);
    assert_eq!(value["w_max"], 120.0);
}

#[test]
fn partial_update_keeps_untouched_fields() {
    let patch = SettingsPatch {
        sigma_w: Some(15.0),
        ..SettingsPatch::default()
    };
    let merged = Settings::default().merged(&patch);

    assert_eq!(
        merged,
        Settings {
            sigma_w: 15.0,
            ..Settings::default()
        }
    );
}

#[test]
fn parses_operator_assignments() {
    assert_eq!(
        SettingsPatch::parse_assignment("sigma_w=15").expect("sigma"),
        SettingsPatch {
            sigma_w: Some(15.0),
            ..SettingsPatch::default()
        }
    );
    assert_eq!(
        SettingsPatch::parse_assignment(" model = band_limited ")
            .expect("model")
            .model,
        Some(VariationModel::BandLimited)
    );
    assert_eq!(
        SettingsPatch::parse_assignment("n_resample=600.4")
            .expect("n_resample")
            .n_resample,
        Some(600)
    );
}

#[test]
fn rejects_bad_operator_input() {
    assert_eq!(
        SettingsPatch::parse_assignment("sigma_w"),
        Err(SettingsInputError::MissingValue("sigma_w".to_string()))
    );
    assert_eq!(
        SettingsPatch::parse_assignment("seed=7"),
        Err(SettingsInputError::UnknownField("seed".to_string()))
    );
    assert!(matches!(
        SettingsPatch::parse_assignment("L_c=abc"),
        Err(SettingsInputError::InvalidValue { field: "L_c", .. })
    ));
    assert!(matches!(
        SettingsPatch::parse_assignment("model=cubic"),
        Err(SettingsInputError::InvalidValue { field: "model", .. })
    ));
    assert!(matches!(
        SettingsPatch::parse_assignment("n_resample=-3"),
        Err(SettingsInputError::InvalidValue { field: "n_resample", .. })
    ));
}

#[test]
fn stats_with_no_samples_are_absent() {
    let stats = VariationStats::from_wire(
        PrimitiveId::Int(3),
        WireStats {
            s: Vec::new(),
            w_s: Vec::new(),
            mu_w: 1.0,
        },
    )
    .expect("decode");
    assert!(stats.is_none());
}

#[test]
fn stats_length_mismatch_is_a_decode_error() {
    let err = VariationStats::from_wire(
        PrimitiveId::Int(3),
        WireStats {
            s: vec![0.0, 1.0],
            w_s: vec![1.0],
            mu_w: 1.0,
        },
    )
    .expect_err("mismatch");
    assert!(matches!(
        err,
        DecodeError::StatsLengthMismatch { s_len: 2, w_len: 1, .. }
    ));
}

#[test]
fn stats_summaries() {
    let stats: WireStats =
        serde_json::from_str(r#"{"s":[0.0,0.5,1.5],"w_s":[1.0,1.2,0.9],"mu_w":1.0}"#)
            .expect("stats");
    let stats = VariationStats::from_wire(PrimitiveId::Int(3), stats)
        .expect("decode")
        .expect("present");

    assert_eq!(stats.len(), 3);
    assert_eq!(stats.width_range(), (0.9, 1.2));
    assert_eq!(stats.arc_length(), 1.5);
    assert_eq!(stats.primitive_id(), &PrimitiveId::Int(3));
}

#[test]
fn primitive_id_round_trips_both_forms() {
    let ids: Vec<PrimitiveId> = serde_json::from_str(r#"[12, "12", "via-3"]"#).expect("ids");
    assert_eq!(ids[0], PrimitiveId::Int(12));
    assert_eq!(ids[1], PrimitiveId::Text("12".to_string()));
    assert_ne!(ids[0], ids[1]);
    assert_eq!(PrimitiveId::parse_input(" 12 "), Some(PrimitiveId::Int(12)));
    assert_eq!(PrimitiveId::parse_input(""), None);
}
