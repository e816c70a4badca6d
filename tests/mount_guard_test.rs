use std::cell::Cell;

use galaxy_scene::{
    GalaxyError,
    mount::{Mount, NativeMount, locate_container, mount_renderer},
};
use log::Level;
use winit::window::WindowAttributes;

use crate::common::log_capture;

mod common;

/// A document holding elements by id that counts attachments.
struct Page {
    ids: Vec<&'static str>,
    attached: Cell<usize>,
}

impl Page {
    fn with(ids: &[&'static str]) -> Self {
        Self {
            ids: ids.to_vec(),
            attached: Cell::new(0),
        }
    }
}

impl Mount for Page {
    type Container = &'static str;

    fn find(&self, id: &str) -> Option<&'static str> {
        self.ids.iter().copied().find(|candidate| *candidate == id)
    }

    fn attach(&self, _: &&'static str) -> anyhow::Result<WindowAttributes> {
        self.attached.set(self.attached.get() + 1);
        Ok(WindowAttributes::default())
    }
}

struct Broken;

impl Mount for Broken {
    type Container = ();

    fn find(&self, _: &str) -> Option<()> {
        Some(())
    }

    fn attach(&self, _: &()) -> anyhow::Result<WindowAttributes> {
        anyhow::bail!("canvas rejected")
    }
}

#[test]
fn missing_container_renders_nothing() {
    log_capture::install();
    log_capture::take(Level::Error);

    let page = Page::with(&["header", "footer"]);
    let result = mount_renderer(&page, "container");
    assert!(matches!(result, Err(GalaxyError::MissingContainer(ref id)) if id == "container"));
    assert_eq!(page.attached.get(), 0);

    let errors = log_capture::take(Level::Error);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("container"));
}

#[test]
fn existing_container_is_attached_once() {
    log_capture::install();
    log_capture::take(Level::Error);

    let page = Page::with(&["container"]);
    assert!(mount_renderer(&page, "container").is_ok());
    assert_eq!(page.attached.get(), 1);
    assert!(log_capture::take(Level::Error).is_empty());
}

#[test]
fn locating_a_missing_container_logs_once() {
    log_capture::install();
    log_capture::take(Level::Error);

    let page = Page::with(&[]);
    assert!(locate_container(&page, "container").is_err());
    assert!(locate_container(&Page::with(&["container"]), "container").is_ok());
    assert_eq!(log_capture::take(Level::Error).len(), 1);
}

#[test]
fn attach_failure_is_reported() {
    let result = mount_renderer(&Broken, "container");
    match result {
        Err(GalaxyError::Attach { id, reason }) => {
            assert_eq!(id, "container");
            assert!(reason.contains("canvas rejected"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn native_windows_always_mount() {
    let mount = NativeMount {
        title: "Galaxy".into(),
    };
    assert!(mount_renderer(&mount, "anything").is_ok());
}
