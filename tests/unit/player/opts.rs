use super::*;

#[test]
fn defaults_validate() {
    PlayerOpts::default().validate().unwrap();
}

#[test]
fn partial_json_fills_defaults() {
    let opts = PlayerOpts::from_json_str(r#"{ "initial_rate": 1.5, "decode_mode": "inline" }"#)
        .unwrap();
    assert_eq!(opts.initial_rate, 1.5);
    assert_eq!(opts.decode_mode, DecodeMode::Inline);
    assert_eq!(opts.max_rate, 4.0);
    assert_eq!(opts.theme, Theme::default());
}

#[test]
fn json_roundtrip_preserves_options() {
    let mut opts = PlayerOpts::default();
    opts.theme.playhead_width = 3.0;
    let s = opts.to_json_string().unwrap();
    assert_eq!(PlayerOpts::from_json_str(&s).unwrap(), opts);
}

#[test]
fn invalid_values_are_rejected() {
    assert!(matches!(
        PlayerOpts::from_json_str(r#"{ "initial_rate": 0.0 }"#),
        Err(WaveplayError::Validation(_))
    ));
    assert!(matches!(
        PlayerOpts::from_json_str(r#"{ "min_rate": 2.0, "max_rate": 1.0 }"#),
        Err(WaveplayError::Validation(_))
    ));
    assert!(matches!(
        PlayerOpts::from_json_str(r#"{ "rate_presets": [0.1] }"#),
        Err(WaveplayError::Validation(_))
    ));
    assert!(matches!(
        PlayerOpts::from_json_str("{ not json"),
        Err(WaveplayError::Serde(_))
    ));
}

#[test]
fn from_path_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("player.json");
    std::fs::write(&path, r#"{ "end_epsilon_secs": 0.01 }"#).unwrap();
    assert_eq!(PlayerOpts::from_path(&path).unwrap().end_epsilon_secs, 0.01);
    assert!(PlayerOpts::from_path(&dir.path().join("missing.json")).is_err());
}
