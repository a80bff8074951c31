mod common;

use common::*;
use dicebox::{DetectionError, EdgeMethod};
use std::io::Write;

fn write_config(json: &str) -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
    file.write_all(json.as_bytes())?;
    Ok(file)
}

#[test]
fn test_defaults_are_valid() -> anyhow::Result<()> {
    let config = DetectionConfig::default();
    config.validate()?;

    assert_eq!(config.blur_radius, 1);
    assert_eq!(config.canny_low, 100);
    assert_eq!(config.canny_high(), 300.0);
    assert_eq!(config.min_area, 0);
    assert_eq!(config.mode, RegionMode::Merge);
    assert_eq!(config.expansion, Expansion::uniform(2));
    Ok(())
}

#[test]
fn test_out_of_range_values_are_rejected() {
    let cases = [
        ("blur_radius", DetectionConfig { blur_radius: 0, ..Default::default() }),
        ("blur_radius", DetectionConfig { blur_radius: 101, ..Default::default() }),
        ("canny_low", DetectionConfig { canny_low: 101, ..Default::default() }),
        ("min_area", DetectionConfig { min_area: 3001, ..Default::default() }),
        (
            "expansion.width",
            DetectionConfig { expansion: Expansion::new(101, 2), ..Default::default() },
        ),
    ];

    for (expected, config) in cases {
        match config.validate() {
            Err(DetectionError::InvalidConfig { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected InvalidConfig for {}, got {:?}", expected, other),
        }
    }
}

#[test]
fn test_mode_parses_from_name_or_index() -> anyhow::Result<()> {
    assert_eq!("raw".parse::<RegionMode>()?, RegionMode::Raw);
    assert_eq!("HULL".parse::<RegionMode>()?, RegionMode::Hull);
    assert_eq!("2".parse::<RegionMode>()?, RegionMode::Merge);
    assert_eq!(RegionMode::try_from(1u8)?, RegionMode::Hull);

    assert!(matches!(
        "square".parse::<RegionMode>(),
        Err(DetectionError::UnknownMode(_))
    ));
    assert!(matches!(
        RegionMode::try_from(3u8),
        Err(DetectionError::UnknownMode(_))
    ));
    Ok(())
}

#[test]
fn test_load_fills_missing_fields_with_defaults() -> anyhow::Result<()> {
    let file = write_config(r#"{ "mode": "raw", "min_area": 120, "edge_method": "threshold" }"#)?;

    let config = DetectionConfig::load(file.path())?;

    assert_eq!(config.mode, RegionMode::Raw);
    assert_eq!(config.min_area, 120);
    assert_eq!(config.edge_method, EdgeMethod::Threshold);
    assert_eq!(config.blur_radius, 1);
    assert_eq!(config.merge_method, MergeMethod::Raster);
    Ok(())
}

#[test]
fn test_load_rejects_invalid_files() -> anyhow::Result<()> {
    let zero_blur = write_config(r#"{ "blur_radius": 0 }"#)?;
    assert!(matches!(
        DetectionConfig::load(zero_blur.path()),
        Err(DetectionError::InvalidConfig { field: "blur_radius", .. })
    ));

    let bad_mode = write_config(r#"{ "mode": "triangle" }"#)?;
    assert!(matches!(
        DetectionConfig::load(bad_mode.path()),
        Err(DetectionError::ConfigParse(_))
    ));
    Ok(())
}
