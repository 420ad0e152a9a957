//! What the widget needs from the page it runs in.
//!
//! The browser build implements these over `web-sys`; tests and the CLI use
//! [`HeadlessPage`](super::HeadlessPage). Methods take `&self` because DOM
//! handles are shared references with interior mutability.

use super::mount::IframeSpec;
use crate::Result;

/// Minimal DOM surface used by mounting and the two message channels.
pub trait HostPage {
    /// Handle to an element of this page
    type Element: Clone;

    /// Look an element up by id, at call time.
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// Remove every child of `element`.
    fn clear_children(&self, element: &Self::Element);

    /// Create a detached iframe configured from `spec`.
    fn create_iframe(&self, spec: &IframeSpec) -> Result<Self::Element>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&self, parent: &Self::Element, child: &Self::Element) -> Result<()>;

    /// Set one inline style property.
    fn set_style(&self, element: &Self::Element, property: &str, value: &str);

    /// Current `src` of an iframe, `None` when `element` is not an iframe.
    fn frame_src(&self, element: &Self::Element) -> Option<String>;

    /// Navigate an iframe to `src`.
    fn set_frame_src(&self, element: &Self::Element, src: &str);
}

/// Access to the third-party resize library (`iFrameResize`).
pub trait ResizerHost {
    /// Whether the library's global entry point is already defined.
    fn resizer_present(&self) -> bool;

    /// Start loading the library from `url`.
    ///
    /// Completion is reported back through
    /// [`Widget::resizer_loaded`](super::Widget::resizer_loaded) or
    /// [`Widget::resizer_failed`](super::Widget::resizer_failed). An error
    /// means the request could not even be issued.
    fn load_resizer(&self, url: &str) -> Result<()>;

    /// Bind the library to the iframe element with id `iframe_id`, with
    /// origin checks and logging off, forwarding its messages to
    /// [`Widget::handle_resizer_message`](super::Widget::handle_resizer_message).
    /// A frame that is no longer in the page is an error.
    fn attach_resizer(&self, iframe_id: &str) -> Result<()>;
}
