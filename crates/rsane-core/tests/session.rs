//! Session tests against the emulated test device

use rsane_core::acquisition::AcquisitionState;
use rsane_core::frame::{ColorMode, ReadStatus};
use rsane_core::option::{SetInfo, Value};
use rsane_core::raster::{ColorModel, Pixel};
use rsane_core::{Context, Error, NoProgress};
use rsane_test::{Counters, Faults, TestBackend, TestConfig, TestPicture};
use std::sync::Arc;

fn context(config: TestConfig) -> (Context, Arc<Counters>) {
    let backend = TestBackend::new(config);
    let counters = backend.counters();
    (Context::new(Box::new(backend)).unwrap(), counters)
}

fn picture(picture: TestPicture) -> TestConfig {
    TestConfig {
        picture,
        ..TestConfig::default()
    }
}

#[test]
fn test_color_scan_by_hand() {
    let (ctx, counters) = context(TestConfig::default());
    let mut session = ctx.open("test").unwrap();

    let info = session.set_value("mode", "Color").unwrap();
    assert!(info.contains(SetInfo::RELOAD_PARAMS));
    session.refresh_options().unwrap();

    let params = session.start().unwrap();
    assert_eq!(params.mode, ColorMode::Color);
    assert_eq!(session.state(), AcquisitionState::Started);
    assert_eq!(session.frame_parameters(), Some(&params));

    let mut buf = [0u8; 1000];
    let mut total = 0;
    loop {
        match session.read_chunk(&mut buf).unwrap() {
            ReadStatus::Data(n) => total += n,
            ReadStatus::EndOfFrame => break,
        }
    }
    assert_eq!(Some(total), params.frame_len());
    assert_eq!(session.state(), AcquisitionState::Done);
    assert_eq!(Counters::load(&counters.cancels), 1);

    // Cancelling a finished frame leaves the device alone
    session.cancel();
    assert_eq!(session.state(), AcquisitionState::Idle);
    assert_eq!(Counters::load(&counters.cancels), 1);
    session.close();
}

#[test]
fn test_start_again_after_clean_finish() {
    let (ctx, counters) = context(TestConfig::default());
    let mut session = ctx.open("test").unwrap();

    session.start().unwrap();
    let mut buf = [0u8; 4096];
    while let ReadStatus::Data(_) = session.read_chunk(&mut buf).unwrap() {}
    assert_eq!(session.state(), AcquisitionState::Done);

    let params = session.start().unwrap();
    assert_eq!(session.state(), AcquisitionState::Started);
    assert_eq!(session.frame_parameters(), Some(&params));
    assert_eq!(Counters::load(&counters.starts), 2);
    session.cancel();
    assert_eq!(Counters::load(&counters.cancels), 2);
}

#[test]
fn test_parameters_frozen_during_acquisition() {
    let (ctx, _) = context(TestConfig::default());
    let mut session = ctx.open("").unwrap();

    let params = session.start().unwrap();
    assert_eq!(params.mode, ColorMode::Gray);
    // The device refuses option changes mid-frame; the frozen copy stays put
    assert!(session.set_value("mode", "Color").is_err());
    assert_eq!(session.frame_parameters(), Some(&params));
    session.cancel();
    assert_eq!(session.frame_parameters(), None);
}

#[test]
fn test_option_values_match_declared_types() {
    let (ctx, _) = context(TestConfig::default());
    let mut session = ctx.open("test").unwrap();

    let active: Vec<_> = session
        .options()
        .iter()
        .filter(|d| d.is_active())
        .map(|d| (d.name.clone(), d.value_type))
        .collect();
    assert!(active.len() > 10);

    for (name, value_type) in active {
        let value = session.get_value(&name).unwrap();
        assert!(
            value_type.accepts(&value),
            "{} declared {} but read {:?}",
            name,
            value_type,
            value
        );
    }
}

#[test]
fn test_inactive_option_skips_device() {
    let (ctx, counters) = context(TestConfig::default());
    let mut session = ctx.open("test").unwrap();

    let before = Counters::load(&counters.gets);
    assert!(matches!(
        session.get_value("read-limit-size"),
        Err(Error::InactiveOption { name }) if name == "read-limit-size"
    ));
    assert_eq!(Counters::load(&counters.gets), before);
}

#[test]
fn test_unknown_option() {
    let (ctx, _) = context(TestConfig::default());
    let mut session = ctx.open("test").unwrap();
    assert!(matches!(
        session.get_value("brightness"),
        Err(Error::UnknownOption { .. })
    ));
    assert!(matches!(
        session.set_value("brightness", 3),
        Err(Error::UnknownOption { .. })
    ));
}

#[test]
fn test_constraint_violation_keeps_value() {
    let (ctx, counters) = context(TestConfig::default());
    let mut session = ctx.open("test").unwrap();

    let sets = Counters::load(&counters.sets);
    assert!(matches!(
        session.set_value("resolution", 5000),
        Err(Error::ConstraintViolation { .. })
    ));
    assert!(matches!(
        session.set_value("mode", "Infrared"),
        Err(Error::ConstraintViolation { .. })
    ));
    assert_eq!(Counters::load(&counters.sets), sets);
    assert_eq!(session.get_value("resolution").unwrap(), Value::Int(50));
    assert_eq!(session.get_value("mode").unwrap(), Value::from("Gray"));
}

#[test]
fn test_set_type_mismatch() {
    let (ctx, _) = context(TestConfig::default());
    let mut session = ctx.open("test").unwrap();
    assert!(matches!(
        session.set_value("resolution", "high"),
        Err(Error::TypeMismatch { .. })
    ));
    // Integers are accepted for float options
    session.set_value("br-x", 100).unwrap();
    assert_eq!(session.get_value("br-x").unwrap(), Value::Float(100.0));
}

#[test]
fn test_buttons_are_read_only() {
    let (ctx, _) = context(TestConfig::default());
    let mut session = ctx.open("test").unwrap();
    assert!(matches!(
        session.set_value("scan", true),
        Err(Error::ReadOnly { .. })
    ));
    assert_eq!(session.get_value("scan").unwrap(), Value::Bool(false));
}

#[test]
fn test_device_value_of_wrong_type() {
    let config = TestConfig {
        faults: Faults {
            wrong_type: Some("resolution".into()),
            ..Faults::default()
        },
        ..TestConfig::default()
    };
    let (ctx, _) = context(config);
    let mut session = ctx.open("test").unwrap();
    assert!(matches!(
        session.get_value("resolution"),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_gray_black_frame() {
    let (ctx, _) = context(TestConfig::default());
    let mut session = ctx.open("test").unwrap();

    let image = session.scan(&mut NoProgress).unwrap();
    assert_eq!((image.width(), image.height()), (79, 59));
    assert_eq!(image.color_model(), ColorModel::Gray);
    assert!(image.pixels().all(|p| p == Pixel::Gray(0)));
    assert_eq!(session.state(), AcquisitionState::Idle);
}

#[test]
fn test_lineart_black_and_white() {
    for (test_picture, expected) in [
        (TestPicture::SolidBlack, Pixel::Gray(0)),
        (TestPicture::SolidWhite, Pixel::Gray(255)),
    ] {
        let (ctx, _) = context(picture(test_picture));
        let mut session = ctx.open("test").unwrap();

        let info = session.set_value("mode", "Lineart").unwrap();
        assert!(info.contains(SetInfo::RELOAD_OPTIONS));
        session.refresh_options().unwrap();
        assert!(!session.option("depth").unwrap().is_active());

        let image = session.scan(&mut NoProgress).unwrap();
        assert_eq!(image.width(), 79);
        assert!(image.pixels().all(|p| p == expected));
    }
}

#[test]
fn test_color_white_frame() {
    let (ctx, _) = context(picture(TestPicture::SolidWhite));
    let mut session = ctx.open("test").unwrap();
    session.set_value("mode", "Color").unwrap();

    let image = session.scan(&mut NoProgress).unwrap();
    assert_eq!(image.color_model(), ColorModel::Rgb);
    assert_eq!(image.pixel(0, 0), Some(Pixel::white(ColorModel::Rgb)));
    assert!(image.pixels().all(|p| p == Pixel::Rgb([255, 255, 255])));
    assert_eq!(image.pixel(image.width(), 0), None);
}

#[test]
fn test_color_pattern_bands() {
    let (ctx, _) = context(picture(TestPicture::ColorPattern));
    let mut session = ctx.open("test").unwrap();
    session.set_value("mode", "Color").unwrap();

    let image = session.scan(&mut NoProgress).unwrap();
    let last = image.width() - 1;
    assert_eq!(image.pixel(0, 0), Some(Pixel::Rgb([255, 0, 0])));
    assert_eq!(image.pixel(last / 2, 3), Some(Pixel::Rgb([0, 255, 0])));
    assert_eq!(image.pixel(last, 7), Some(Pixel::Rgb([0, 0, 255])));
}

#[test]
fn test_line_padding_skipped() {
    let config = TestConfig {
        picture: TestPicture::SolidWhite,
        line_padding: 3,
        ..TestConfig::default()
    };
    let (ctx, _) = context(config);
    let mut session = ctx.open("test").unwrap();

    let params = session.parameters().unwrap();
    assert_eq!(params.bytes_per_line, params.pixels_per_line + 3);

    let image = session.scan(&mut NoProgress).unwrap();
    assert_eq!(image.width(), params.pixels_per_line);
    assert!(image.pixels().all(|p| p == Pixel::Gray(255)));
}

#[test]
fn test_small_reads_split_lines() {
    let scan_with = |max_read: usize| {
        let config = TestConfig {
            picture: TestPicture::ColorPattern,
            max_read,
            ..TestConfig::default()
        };
        let (ctx, _) = context(config);
        let mut session = ctx.open("test").unwrap();
        let image = session.scan(&mut NoProgress).unwrap();
        image
    };
    assert_eq!(scan_with(7).as_bytes(), scan_with(64 * 1024).as_bytes());
}

#[test]
fn test_hand_scanner_unknown_height() {
    let (ctx, _) = context(TestConfig::default());
    let mut session = ctx.open("test").unwrap();

    session.set_value("hand-scanner", true).unwrap();
    session.refresh_options().unwrap();
    assert!(matches!(
        session.get_value("br-y"),
        Err(Error::InactiveOption { .. })
    ));
    assert_eq!(session.parameters().unwrap().lines, None);

    let image = session.scan(&mut NoProgress).unwrap();
    assert_eq!(image.height(), 59);
}

#[test]
fn test_unsupported_depth_releases_device() {
    let (ctx, counters) = context(TestConfig::default());
    let mut session = ctx.open("test").unwrap();
    session.set_value("depth", 16).unwrap();

    assert!(matches!(
        session.scan(&mut NoProgress),
        Err(Error::UnsupportedDepth { depth: 16 })
    ));
    assert_eq!(session.state(), AcquisitionState::Idle);
    assert_eq!(Counters::load(&counters.starts), 1);
    assert_eq!(Counters::load(&counters.cancels), 1);

    // The device is usable again
    session.set_value("depth", 8).unwrap();
    assert!(session.scan(&mut NoProgress).is_ok());
}

#[test]
fn test_read_failure_aborts_scan() {
    let config = TestConfig {
        faults: Faults {
            read_after: Some(100),
            ..Faults::default()
        },
        ..TestConfig::default()
    };
    let (ctx, counters) = context(config);
    let mut session = ctx.open("test").unwrap();

    assert!(matches!(session.scan(&mut NoProgress), Err(Error::Io(_))));
    assert_eq!(session.state(), AcquisitionState::Idle);
    assert_eq!(Counters::load(&counters.cancels), 1);
}

#[test]
fn test_one_session_per_device() {
    let (ctx, _) = context(TestConfig::default());
    let first = ctx.open("test").unwrap();
    assert!(matches!(
        ctx.open("test").err(),
        Some(Error::AlreadyOpen { name }) if name == "test"
    ));
    drop(first);
    assert!(ctx.open("test").is_ok());
}

#[test]
fn test_open_unknown_device() {
    let (ctx, _) = context(TestConfig::default());
    assert!(matches!(
        ctx.open("epson:libusb:001:002").err(),
        Some(Error::DeviceNotFound { .. })
    ));
}

#[test]
fn test_open_first_with_no_devices() {
    let config = TestConfig {
        devices: Vec::new(),
        ..TestConfig::default()
    };
    let (ctx, _) = context(config);
    assert!(ctx.devices().unwrap().is_empty());
    assert!(matches!(ctx.open("").err(), Some(Error::NoDevices)));
}

#[test]
fn test_enumeration_failure() {
    let config = TestConfig {
        faults: Faults {
            enumeration: true,
            ..Faults::default()
        },
        ..TestConfig::default()
    };
    let (ctx, _) = context(config);
    assert!(matches!(ctx.devices(), Err(Error::Enumeration(_))));
    assert!(matches!(ctx.open("").err(), Some(Error::Enumeration(_))));
}
