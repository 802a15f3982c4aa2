use std::sync::Arc;

use crate::{
    drivers::lego,
    input::{
        controller::Controller,
        detector::{build_controller, group_by_ids, DeviceDetector, Detector},
        profile::{ControllerProfile, DeviceIds, LegionGoProfile, ProfileRegistry, XboxProfile},
        source::{DeviceType, InputDeviceHwInfo},
    },
};

fn node(path: &str, vendor: u16, product: u16, device_type: DeviceType) -> InputDeviceHwInfo {
    InputDeviceHwInfo {
        name: "Test Controller".to_string(),
        path: path.to_string(),
        vendor,
        product,
        device_type,
    }
}

#[test]
fn test_group_by_ids() {
    let legion_go = (lego::driver::VID, lego::driver::XINPUT_PID);
    let infos = vec![
        node("/dev/hidraw3", legion_go.0, legion_go.1, DeviceType::Hidraw),
        node("/dev/input/event7", 0x045e, 0x0b12, DeviceType::Evdev),
        node("/dev/input/event5", legion_go.0, legion_go.1, DeviceType::Evdev),
        node("/dev/hidraw1", legion_go.0, legion_go.1, DeviceType::Hidraw),
    ];

    let groups = group_by_ids(infos);
    assert_eq!(groups.len(), 2);

    let nodes = &groups[&DeviceIds::new(legion_go.0, legion_go.1)];
    let paths: Vec<&str> = nodes.iter().map(|n| n.path.as_str()).collect();
    // Evdev nodes come first, then hidraw, each sorted by path
    assert_eq!(
        paths,
        vec!["/dev/input/event5", "/dev/hidraw1", "/dev/hidraw3"]
    );

    let nodes = &groups[&DeviceIds::new(0x045e, 0x0b12)];
    assert_eq!(nodes.len(), 1);
}

#[test]
fn test_build_controller_without_hidraw() {
    let nodes = vec![
        node("/dev/input/event7", 0x045e, 0x0b12, DeviceType::Evdev),
        node("/dev/hidraw2", 0x045e, 0x0b12, DeviceType::Hidraw),
    ];
    let Some(controller) = build_controller(Arc::new(XboxProfile), nodes) else {
        panic!("Xbox controller should be built from its evdev node");
    };
    assert_eq!(controller.paths(), vec!["/dev/input/event7".to_string()]);
    assert!(controller.owns_path("/dev/input/event7"));
    assert!(!controller.owns_path("/dev/hidraw2"));

    // Nothing left once the hidraw node is dropped
    let nodes = vec![node("/dev/hidraw2", 0x045e, 0x0b12, DeviceType::Hidraw)];
    assert!(build_controller(Arc::new(XboxProfile), nodes).is_none());
}

#[test]
fn test_build_controller_with_hidraw() {
    let (vid, pid) = (lego::driver::VID, lego::driver::XINPUT_PID);
    let nodes = vec![
        node("/dev/input/event5", vid, pid, DeviceType::Evdev),
        node("/dev/hidraw1", vid, pid, DeviceType::Hidraw),
    ];
    let Some(controller) = build_controller(Arc::new(LegionGoProfile), nodes) else {
        panic!("Legion Go controller should be built");
    };
    assert_eq!(controller.devices().len(), 2);
    assert_eq!(controller.name(), LegionGoProfile.name());
}

#[test]
fn test_detect_nothing() {
    let input_dir = std::env::temp_dir().join(format!("padbridge-detect-{}", std::process::id()));
    std::fs::create_dir_all(&input_dir).unwrap();
    let dir = input_dir.to_string_lossy().to_string();

    let detector = DeviceDetector::new(
        ProfileRegistry::default(),
        &dir,
        &dir,
        "/nonexistent/product_name",
    );
    let result = detector.detect().unwrap();
    assert!(result.is_none());

    // Missing directories are not an error either
    let detector = DeviceDetector::new(
        ProfileRegistry::default(),
        "/nonexistent/input",
        "/nonexistent/dev",
        "/nonexistent/product_name",
    );
    assert!(detector.detect().unwrap().is_none());

    std::fs::remove_dir_all(&input_dir).unwrap();
}

#[test]
fn test_candidate_order() {
    let dir = std::env::temp_dir().join(format!("padbridge-order-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let product_path = dir.join("product_name");
    let product = product_path.to_string_lossy().to_string();

    let legion_go = DeviceIds::new(lego::driver::VID, lego::driver::XINPUT_PID);
    let xbox = DeviceIds::new(0x045e, 0x0b12);
    let dualsense = DeviceIds::new(0x054c, 0x0ce6);
    let groups = group_by_ids(vec![
        node("/dev/input/event5", 0x17ef, 0x6182, DeviceType::Evdev),
        node("/dev/input/event7", 0x045e, 0x0b12, DeviceType::Evdev),
        node("/dev/input/event9", 0x054c, 0x0ce6, DeviceType::Evdev),
    ]);
    let detector =
        DeviceDetector::new(ProfileRegistry::default(), "/dev/input", "/dev", &product);

    // The built-in controller is tried first on a Legion Go
    std::fs::write(&product_path, "83E1\n").unwrap();
    assert_eq!(
        detector.candidate_order(&groups),
        vec![legion_go, xbox, dualsense]
    );

    // Elsewhere ids are tried in order
    std::fs::write(&product_path, "ROG Ally RC71L\n").unwrap();
    assert_eq!(
        detector.candidate_order(&groups),
        vec![xbox, dualsense, legion_go]
    );

    std::fs::remove_dir_all(&dir).unwrap();
}
