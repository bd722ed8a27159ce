use scriptorium_quality::QualityConfig;

#[test]
fn defaults() {
    let config = QualityConfig::default();
    assert_eq!(*config.threshold(), 0.70);
    assert_eq!(*config.max_regenerate_attempts(), 2);
    assert!(*config.regenerate_with_different_provider());
    assert!(config.validate().is_ok());
}

#[test]
fn missing_fields_take_defaults() {
    let config: QualityConfig = toml::from_str("threshold = 0.8").unwrap();
    assert_eq!(*config.threshold(), 0.8);
    assert_eq!(*config.max_regenerate_attempts(), 2);
}

#[test]
fn threshold_out_of_range_is_rejected() {
    let config = QualityConfig::builder().threshold(1.5).build().unwrap();
    assert!(config.validate().is_err());

    let config = QualityConfig::builder()
        .threshold(0.0)
        .max_regenerate_attempts(0u32)
        .build()
        .unwrap();
    assert!(config.validate().is_ok());
}
