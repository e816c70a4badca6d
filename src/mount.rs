//! Locating the place the renderer attaches to.
//!
//! On the web the galaxy renders into a canvas appended to a container element
//! looked up by id. Natively the "container" is simply a new window. A missing
//! container is not fatal: it is logged and no renderer is created.

use winit::window::WindowAttributes;

use crate::error::GalaxyError;

/// Something that can host the renderer's output surface.
pub trait Mount {
    type Container;

    fn find(&self, id: &str) -> Option<Self::Container>;

    /// Attaches a drawing surface to `container` and describes the window
    /// winit should create on top of it.
    fn attach(&self, container: &Self::Container) -> anyhow::Result<WindowAttributes>;
}

/// Looks up the container, logging an error if it is absent.
pub fn locate_container<M: Mount>(mount: &M, id: &str) -> Result<M::Container, GalaxyError> {
    mount.find(id).ok_or_else(|| {
        let err = GalaxyError::MissingContainer(id.to_string());
        log::error!("{err}");
        err
    })
}

/// Looks up the container and attaches the renderer to it.
///
/// Never panics. When the container is absent nothing is attached and
/// [`GalaxyError::MissingContainer`] is returned after being logged.
pub fn mount_renderer<M: Mount>(mount: &M, id: &str) -> Result<WindowAttributes, GalaxyError> {
    let container = locate_container(mount, id)?;
    mount.attach(&container).map_err(|e| {
        let err = GalaxyError::Attach {
            id: id.to_string(),
            reason: e.to_string(),
        };
        log::error!("{err}");
        err
    })
}

/// Native hosting: every id resolves to a fresh top level window.
#[derive(Debug, Default)]
pub struct NativeMount {
    pub title: String,
}

impl Mount for NativeMount {
    type Container = ();

    fn find(&self, _id: &str) -> Option<()> {
        Some(())
    }

    fn attach(&self, _: &()) -> anyhow::Result<WindowAttributes> {
        Ok(winit::window::Window::default_attributes().with_title(self.title.clone()))
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::DocumentMount;

#[cfg(target_arch = "wasm32")]
mod web {
    use anyhow::anyhow;
    use wasm_bindgen::JsCast;
    use winit::platform::web::WindowAttributesExtWebSys;
    use winit::window::WindowAttributes;

    use super::Mount;

    /// Mounts into an element of the current document.
    #[derive(Debug)]
    pub struct DocumentMount {
        document: web_sys::Document,
    }

    impl DocumentMount {
        pub fn current() -> Option<Self> {
            let document = web_sys::window()?.document()?;
            Some(Self { document })
        }
    }

    impl Mount for DocumentMount {
        type Container = web_sys::Element;

        fn find(&self, id: &str) -> Option<web_sys::Element> {
            self.document.get_element_by_id(id)
        }

        fn attach(&self, container: &web_sys::Element) -> anyhow::Result<WindowAttributes> {
            let canvas: web_sys::HtmlCanvasElement = self
                .document
                .create_element("canvas")
                .map_err(|e| anyhow!("{e:?}"))?
                .dyn_into()
                .map_err(|_| anyhow!("created element is not a canvas"))?;
            // Fill the container so its size drives the surface size
            canvas
                .set_attribute("style", "width: 100%; height: 100%; display: block;")
                .map_err(|e| anyhow!("{e:?}"))?;
            container
                .append_child(&canvas)
                .map_err(|e| anyhow!("{e:?}"))?;
            Ok(winit::window::Window::default_attributes().with_canvas(Some(canvas)))
        }
    }
}
