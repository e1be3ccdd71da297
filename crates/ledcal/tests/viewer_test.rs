//! Headless tests of the viewer: loading, selection, picking and the camera animation.
//!
//! No window or GPU is involved. Pointer input is fed as normalized device
//! coordinates through `Viewer::point_at`, which projects a world point with the
//! viewer camera.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use glam::Vec3;
use ledcal::{
    ids, DataDirSource, HostPage, LedcalError, NavKey, PageEvent, Viewer, ViewerConfig,
    ViewerState, NO_LED_SELECTED,
};
use tempfile::TempDir;

const CALIBRATION_ID: &str = "7";

/// Two LEDs left and right of the camera axis, one sphere between them and the camera.
const ARTIFACT: &str = r#"{
    "leds": [
        {
            "name": "led_0000.jpg",
            "position": [-4.0, 0.0, 30.0],
            "directions": [[0.1, 0.0, 1.0]]
        },
        {
            "name": "led_0001.jpg",
            "position": [4.0, 0.0, 30.0],
            "directions": [[-0.1, 0.0, 1.0]]
        }
    ],
    "spheres": [[0.0, 0.0, 20.0]],
    "plane": { "normal": [0.0, 0.0, 1.0], "alpha": 20.0 }
}"#;

/// Render-space positions of the two LEDs.
const LED_0: Vec3 = Vec3::new(0.0, 4.0, 30.0);
const LED_1: Vec3 = Vec3::new(0.0, -4.0, 30.0);

fn write_artifact(dir: &Path, text: &str) {
    let run_dir = dir.join("calibrations").join(CALIBRATION_ID);
    fs::create_dir_all(&run_dir).unwrap();
    fs::write(run_dir.join("calibration.json"), text).unwrap();
}

fn viewer_for(dir: &Path) -> Viewer {
    let config = ViewerConfig::new(CALIBRATION_ID, dir);
    let page = HostPage::standard(&config.options);
    let source = Arc::new(DataDirSource::new(dir));
    let mut viewer = Viewer::new(config, page, source).unwrap();
    viewer.on_resize(800.0, 600.0);
    viewer
}

fn loaded_viewer(text: &str) -> (TempDir, Viewer) {
    let dir = TempDir::new().unwrap();
    write_artifact(dir.path(), text);
    let mut viewer = viewer_for(dir.path());
    viewer.begin_fetch();
    viewer.wait_for_fetch();
    (dir, viewer)
}

fn click_at(viewer: &mut Viewer, world: Vec3) {
    viewer.point_at(world);
    viewer.frame();
    viewer.on_pointer_up();
}

#[test]
fn test_loads_calibration_scene() {
    let (_dir, viewer) = loaded_viewer(ARTIFACT);

    assert_eq!(viewer.state(), ViewerState::Ready);
    assert!(viewer.is_section_visible(ids::VISUALIZER));
    assert!(!viewer.is_section_visible(ids::FAILED));
    assert!(!viewer.is_section_visible(ids::SKIPPED));
    assert_eq!(viewer.scene_revision(), 1);

    let leds = viewer.leds().unwrap();
    assert_eq!(leds.len(), 2);
    assert_eq!(leds.current(), None);
    assert!((leds.get(0).unwrap().position() - LED_0).length() < 1e-5);
    assert!((leds.get(1).unwrap().position() - LED_1).length() < 1e-5);
    assert!(leds.is_depth_light_enabled(viewer.scene()));

    assert_eq!(viewer.label(), NO_LED_SELECTED);
    assert!(viewer.photo().is_none());

    let pose = viewer.return_pose().unwrap();
    assert_eq!(pose.position, Vec3::ZERO);
    assert!((pose.target - Vec3::new(0.0, 0.0, 20.0)).length() < 1e-5);

    // Framed from behind the physical camera, looking down +Z.
    assert!(viewer.camera().position.z < 0.0);
    assert!(viewer.camera().forward().z > 0.9);
}

#[test]
fn test_failure_shows_failed_section() {
    let (_dir, viewer) = loaded_viewer("\"failure\"");

    assert_eq!(viewer.state(), ViewerState::Failed);
    assert!(viewer.is_section_visible(ids::FAILED));
    assert!(!viewer.is_section_visible(ids::VISUALIZER));
    assert!(viewer.leds().is_none());
}

#[test]
fn test_skipped_shows_skipped_section() {
    let (_dir, viewer) = loaded_viewer("\"skipped\"");

    assert_eq!(viewer.state(), ViewerState::Skipped);
    assert!(viewer.is_section_visible(ids::SKIPPED));
    assert!(!viewer.is_section_visible(ids::FAILED));
    assert!(!viewer.is_section_visible(ids::VISUALIZER));
}

#[test]
fn test_missing_artifact_stays_loading() {
    let dir = TempDir::new().unwrap();
    let mut viewer = viewer_for(dir.path());
    viewer.begin_fetch();
    viewer.wait_for_fetch();

    assert_eq!(viewer.state(), ViewerState::Loading);
    assert!(!viewer.is_section_visible(ids::VISUALIZER));
    assert!(!viewer.is_section_visible(ids::FAILED));
    assert_eq!(viewer.scene_revision(), 0);
}

#[test]
fn test_refetch_builds_scene_once() {
    let dir = TempDir::new().unwrap();
    write_artifact(dir.path(), ARTIFACT);
    let mut viewer = viewer_for(dir.path());

    viewer.begin_fetch();
    viewer.begin_fetch();
    viewer.wait_for_fetch();
    viewer.frame();

    assert_eq!(viewer.state(), ViewerState::Ready);
    assert_eq!(viewer.scene_revision(), 1);
}

fn visible_sections(viewer: &Viewer) -> Vec<&'static str> {
    [ids::FAILED, ids::SKIPPED, ids::VISUALIZER]
        .into_iter()
        .filter(|id| viewer.is_section_visible(id))
        .collect()
}

#[test]
fn test_refetch_shows_only_latest_outcome() {
    let dir = TempDir::new().unwrap();
    let mut viewer = viewer_for(dir.path());

    write_artifact(dir.path(), "\"failure\"");
    viewer.begin_fetch();
    viewer.wait_for_fetch();
    assert_eq!(viewer.state(), ViewerState::Failed);
    assert_eq!(visible_sections(&viewer), vec![ids::FAILED]);

    write_artifact(dir.path(), ARTIFACT);
    viewer.begin_fetch();
    viewer.wait_for_fetch();
    assert_eq!(viewer.state(), ViewerState::Ready);
    assert_eq!(visible_sections(&viewer), vec![ids::VISUALIZER]);
    click_at(&mut viewer, LED_0);
    click_at(&mut viewer, Vec3::new(0.2, 0.1, 1.0));
    assert!(viewer.animation().is_some());
    let loaded_revision = viewer.scene_revision();

    write_artifact(dir.path(), "\"skipped\"");
    viewer.begin_fetch();
    viewer.wait_for_fetch();
    assert_eq!(viewer.state(), ViewerState::Skipped);
    assert_eq!(visible_sections(&viewer), vec![ids::SKIPPED]);
    assert!(viewer.leds().is_none());
    assert!(viewer.camera_representation().is_none());
    assert!(viewer.animation().is_none());
    assert!(viewer.scene_revision() > loaded_revision);
    assert_eq!(viewer.label(), NO_LED_SELECTED);
    assert!(viewer.photo().is_none());

    // Input aimed at the dropped scene does nothing.
    viewer.on_key_up(NavKey::Down);
    assert_eq!(viewer.label(), NO_LED_SELECTED);
}

#[test]
fn test_missing_element_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = ViewerConfig::new(CALIBRATION_ID, dir.path());
    let page = HostPage::new()
        .container(ids::CONTAINER)
        .section(ids::VISUALIZER, "")
        .end_section();
    let source = Arc::new(DataDirSource::new(dir.path()));

    let result = Viewer::new(config, page, source);
    assert!(matches!(result, Err(LedcalError::MissingElement(_))));
}

#[test]
fn test_wrong_element_kind_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = ViewerConfig::new(CALIBRATION_ID, dir.path());
    let page = HostPage::new()
        .section(ids::FAILED, "")
        .end_section()
        .section(ids::SKIPPED, "")
        .end_section()
        .section(ids::VISUALIZER, "")
        .container(ids::CONTAINER)
        .checkbox(ids::SHOW_LINES, "Show rays", true)
        .checkbox(ids::SHOW_PLANE, "Show plane", true)
        // Label declared as an image.
        .image(ids::LED_LABEL)
        .image(ids::LED_PHOTO)
        .end_section();
    let source = Arc::new(DataDirSource::new(dir.path()));

    let result = Viewer::new(config, page, source);
    assert!(matches!(
        result,
        Err(LedcalError::WrongElementKind { ref id, .. }) if id == ids::LED_LABEL
    ));
}

#[test]
fn test_click_toggles_led() {
    let (dir, mut viewer) = loaded_viewer(ARTIFACT);

    click_at(&mut viewer, LED_0);
    let leds = viewer.leds().unwrap();
    assert_eq!(leds.current(), Some(0));
    assert!(leds.get(0).unwrap().is_on());
    assert!(!leds.is_depth_light_enabled(viewer.scene()));
    assert_eq!(viewer.label(), "led_0000 (1/2)");
    let expected = dir
        .path()
        .join("calibrations")
        .join(CALIBRATION_ID)
        .join("led_0000.jpg");
    assert_eq!(viewer.photo(), Some(expected.as_path()));

    click_at(&mut viewer, LED_1);
    let leds = viewer.leds().unwrap();
    assert_eq!(leds.current(), Some(1));
    assert!(!leds.get(0).unwrap().is_on());
    assert_eq!(viewer.label(), "led_0001 (2/2)");

    click_at(&mut viewer, LED_1);
    let leds = viewer.leds().unwrap();
    assert_eq!(leds.current(), None);
    assert!(leds.iter().all(|led| !led.is_on()));
    assert!(leds.is_depth_light_enabled(viewer.scene()));
    assert_eq!(viewer.label(), NO_LED_SELECTED);
    assert!(viewer.photo().is_none());
}

#[test]
fn test_click_on_empty_space_changes_nothing() {
    let (_dir, mut viewer) = loaded_viewer(ARTIFACT);

    click_at(&mut viewer, Vec3::new(0.0, 12.0, 30.0));

    assert_eq!(viewer.leds().unwrap().current(), None);
    assert!(viewer.animation().is_none());
}

#[test]
fn test_arrow_keys_cycle_leds() {
    let (_dir, mut viewer) = loaded_viewer(ARTIFACT);
    let current = |viewer: &Viewer| viewer.leds().unwrap().current();

    viewer.on_key_up(NavKey::Down);
    assert_eq!(current(&viewer), Some(0));
    viewer.on_key_up(NavKey::Right);
    assert_eq!(current(&viewer), Some(1));
    viewer.on_key_up(NavKey::Down);
    assert_eq!(current(&viewer), Some(0));
    viewer.on_key_up(NavKey::Up);
    assert_eq!(current(&viewer), Some(1));
    viewer.on_key_up(NavKey::Left);
    assert_eq!(current(&viewer), Some(0));
    assert_eq!(viewer.label(), "led_0000 (1/2)");

    let on = viewer.leds().unwrap().iter().filter(|led| led.is_on()).count();
    assert_eq!(on, 1);
}

#[test]
fn test_keys_before_load_are_ignored() {
    let dir = TempDir::new().unwrap();
    let mut viewer = viewer_for(dir.path());

    viewer.on_key_up(NavKey::Down);
    viewer.on_pointer_up();
    viewer.frame();

    assert_eq!(viewer.state(), ViewerState::Loading);
    assert!(viewer.leds().is_none());
}

#[test]
fn test_hover_follows_pointer() {
    let (_dir, mut viewer) = loaded_viewer(ARTIFACT);

    viewer.point_at(LED_1);
    viewer.frame();
    let leds = viewer.leds().unwrap();
    assert!(leds.get(1).unwrap().is_hovered());
    assert!(!leds.get(0).unwrap().is_hovered());

    viewer.point_at(LED_0);
    viewer.frame();
    let leds = viewer.leds().unwrap();
    assert!(leds.get(0).unwrap().is_hovered());
    assert!(!leds.get(1).unwrap().is_hovered());
}

#[test]
fn test_show_lines_checkbox() {
    let (_dir, mut viewer) = loaded_viewer(ARTIFACT);

    viewer.on_key_up(NavKey::Down);
    let lines = viewer.leds().unwrap().get(0).unwrap().lines_node();
    assert!(viewer.scene().is_visible(lines));

    let checkbox = viewer.page().resolve_checkbox(ids::SHOW_LINES).unwrap();
    viewer.handle_page_event(PageEvent::CheckboxChanged {
        checkbox,
        checked: false,
    });
    assert!(!viewer.scene().is_visible(lines));

    // The preference carries over to the next LED.
    viewer.on_key_up(NavKey::Down);
    let next_lines = viewer.leds().unwrap().get(1).unwrap().lines_node();
    assert!(!viewer.scene().is_visible(next_lines));
    assert!(!viewer.scene().is_visible(lines));
}

#[test]
fn test_show_plane_checkbox() {
    let (_dir, mut viewer) = loaded_viewer(ARTIFACT);
    let plane = viewer.plane_node().unwrap();
    assert!(viewer.scene().is_visible(plane));

    let checkbox = viewer.page().resolve_checkbox(ids::SHOW_PLANE).unwrap();
    viewer.handle_page_event(PageEvent::CheckboxChanged {
        checkbox,
        checked: false,
    });
    assert!(!viewer.scene().is_visible(plane));
    assert!(!viewer.page().is_checked(checkbox));

    viewer.set_show_plane(true);
    assert!(viewer.scene().is_visible(plane));
}

#[test]
fn test_camera_click_flies_back() {
    let (_dir, mut viewer) = loaded_viewer(ARTIFACT);
    let start = viewer.camera().pose();

    click_at(&mut viewer, Vec3::new(0.2, 0.1, 1.0));
    let animation = viewer.animation().expect("camera click starts an animation");
    assert_eq!(animation.start(), start);

    for _ in 0..200 {
        if viewer.animation().is_none() {
            break;
        }
        viewer.frame();
    }
    assert!(viewer.animation().is_none());
    assert_eq!(viewer.camera().pose(), viewer.return_pose().unwrap());
}

#[test]
fn test_camera_not_hovered_from_inside() {
    let (_dir, mut viewer) = loaded_viewer(ARTIFACT);
    let pose = viewer.return_pose().unwrap();
    viewer.camera_mut().set_pose(pose);

    viewer.point_at(Vec3::new(0.0, 0.0, 20.0));
    viewer.frame();
    assert!(!viewer.camera_representation().unwrap().is_hovered());

    viewer.on_pointer_up();
    assert!(viewer.animation().is_none());
}

#[test]
fn test_camera_hovered_from_afar() {
    let (_dir, mut viewer) = loaded_viewer(ARTIFACT);

    viewer.point_at(Vec3::new(0.2, 0.1, 1.0));
    viewer.frame();
    assert!(viewer.camera_representation().unwrap().is_hovered());

    viewer.point_at(Vec3::new(0.0, 12.0, 30.0));
    viewer.frame();
    assert!(!viewer.camera_representation().unwrap().is_hovered());
}

#[test]
fn test_pointer_move_maps_to_ndc() {
    let dir = TempDir::new().unwrap();
    let mut viewer = viewer_for(dir.path());

    viewer.on_pointer_move(400.0, 300.0);
    assert!(viewer.pointer_ndc().length() < 1e-6);

    viewer.on_pointer_move(0.0, 0.0);
    assert!((viewer.pointer_ndc() - glam::Vec2::new(-1.0, 1.0)).length() < 1e-6);

    viewer.on_pointer_move(800.0, 600.0);
    assert!((viewer.pointer_ndc() - glam::Vec2::new(1.0, -1.0)).length() < 1e-6);
}
