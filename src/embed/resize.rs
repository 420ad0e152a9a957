//! Resize bridge: keeps the iframe as tall as the document inside it.
//!
//! The embedded view lives on another origin, so the host cannot measure it.
//! The `iframe-resizer` library relays the height across the boundary; this
//! module loads that library at most once per page and applies the heights
//! it reports.
//!
//! # Loader states
//!
//! ```text
//!  Idle ──library present──────────────────────▶ Ready
//!   │                                              ▲
//!   └──load requested──▶ Loading{waiting} ──loaded─┘
//!                              │
//!                              └──failed──▶ Unavailable (no retry)
//! ```
//!
//! Mounts that arrive while a load is in flight join the waiting list and are
//! attached together when it completes.

use serde_json::Value;

use super::host::{HostPage, ResizerHost};
use super::message::{ControlMessage, css_pixels};

/// Pinned CDN build of `iframe-resizer`.
pub const DEFAULT_RESIZER_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/iframe-resizer/4.3.6/iframeResizer.min.js";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoaderState {
    /// Nothing requested yet
    #[default]
    Idle,
    /// Script requested; these iframe ids attach once it arrives
    Loading { waiting: Vec<String> },
    /// Library available
    Ready,
    /// Script failed to load; sizing stays static for this page
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct ResizeBridge {
    library_url: String,
    state: LoaderState,
}

impl ResizeBridge {
    pub fn new(library_url: impl Into<String>) -> Self {
        Self {
            library_url: library_url.into(),
            state: LoaderState::Idle,
        }
    }

    pub fn state(&self) -> &LoaderState {
        &self.state
    }

    /// Attach auto-resizing to `iframe_id`, loading the library first if needed.
    pub fn attach<H: ResizerHost>(&mut self, host: &H, iframe_id: &str) {
        match &mut self.state {
            LoaderState::Idle if host.resizer_present() => {
                self.state = LoaderState::Ready;
                bind(host, iframe_id);
            }
            LoaderState::Idle => {
                tracing::debug!(url = %self.library_url, "loading resize library");
                match host.load_resizer(&self.library_url) {
                    Ok(()) => {
                        self.state = LoaderState::Loading {
                            waiting: vec![iframe_id.to_string()],
                        };
                    }
                    Err(e) => {
                        tracing::warn!(
                            url = %self.library_url,
                            error = %e,
                            "could not request resize library"
                        );
                        self.state = LoaderState::Unavailable;
                    }
                }
            }
            LoaderState::Loading { waiting } => {
                if !waiting.iter().any(|id| id == iframe_id) {
                    waiting.push(iframe_id.to_string());
                }
            }
            LoaderState::Ready => bind(host, iframe_id),
            LoaderState::Unavailable => {
                tracing::debug!(iframe_id, "resize library unavailable, keeping static height");
            }
        }
    }

    /// The library script finished loading.
    pub fn library_loaded<H: ResizerHost>(&mut self, host: &H) {
        let previous = std::mem::replace(&mut self.state, LoaderState::Ready);
        if let LoaderState::Loading { waiting } = previous {
            for iframe_id in &waiting {
                bind(host, iframe_id);
            }
        }
    }

    /// The library script could not be loaded.
    pub fn library_failed(&mut self) {
        if let LoaderState::Loading { waiting } = &self.state {
            tracing::warn!(
                url = %self.library_url,
                pending = waiting.len(),
                "resize library failed to load; embeds keep their configured height"
            );
        }
        self.state = LoaderState::Unavailable;
    }
}

fn bind<H: ResizerHost>(host: &H, iframe_id: &str) {
    if let Err(e) = host.attach_resizer(iframe_id) {
        tracing::warn!(iframe_id, error = %e, "could not attach resize library");
    }
}

/// Apply a message received through the resize library's callback.
///
/// Only `testify-height-update` is acted on. The iframe is looked up by id
/// now, not when the callback was registered, so a remounted frame is the
/// one resized. Returns whether a height was applied.
pub fn apply_height_update<P: HostPage>(page: &P, iframe_id: &str, message: &Value) -> bool {
    let Some(ControlMessage::HeightUpdate { height }) = ControlMessage::from_value(message) else {
        return false;
    };
    if !height.is_finite() || height < 0.0 {
        tracing::debug!(iframe_id, height, "ignoring invalid height");
        return false;
    }
    match page.element_by_id(iframe_id) {
        Some(frame) => {
            page.set_style(&frame, "height", &css_pixels(height));
            true
        }
        None => {
            tracing::debug!(iframe_id, "height update for a frame that is gone");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::headless::HeadlessPage;
    use serde_json::json;

    /// Page holding one iframe per id.
    fn page_with_frames(ids: &[&str]) -> HeadlessPage {
        let page = HeadlessPage::new();
        for id in ids {
            page.add_element(&page.body(), "iframe", id);
        }
        page
    }

    #[test]
    fn test_attach_when_library_present() {
        let page = page_with_frames(&["testify-carousel-acme"]).with_resizer_loaded();
        let mut bridge = ResizeBridge::new(DEFAULT_RESIZER_URL);

        bridge.attach(&page, "testify-carousel-acme");

        assert_eq!(bridge.state(), &LoaderState::Ready);
        assert!(page.script_loads().is_empty());
        assert_eq!(page.attached_resizers(), vec!["testify-carousel-acme"]);
    }

    #[test]
    fn test_single_load_for_concurrent_attaches() {
        let page = page_with_frames(&[
            "testify-carousel-acme",
            "testify-wall-acme",
            "testify-carousel-other",
        ]);
        let mut bridge = ResizeBridge::new(DEFAULT_RESIZER_URL);

        bridge.attach(&page, "testify-carousel-acme");
        bridge.attach(&page, "testify-wall-acme");
        bridge.attach(&page, "testify-carousel-acme");

        assert_eq!(page.script_loads(), vec![DEFAULT_RESIZER_URL]);
        assert!(page.attached_resizers().is_empty());
        assert_eq!(
            bridge.state(),
            &LoaderState::Loading {
                waiting: vec![
                    "testify-carousel-acme".to_string(),
                    "testify-wall-acme".to_string()
                ]
            }
        );

        bridge.library_loaded(&page);
        assert_eq!(bridge.state(), &LoaderState::Ready);
        assert_eq!(
            page.attached_resizers(),
            vec!["testify-carousel-acme", "testify-wall-acme"]
        );

        bridge.attach(&page, "testify-carousel-other");
        assert_eq!(page.script_loads().len(), 1);
        assert_eq!(page.attached_resizers().len(), 3);
    }

    #[test]
    fn test_stale_waiting_id_does_not_block_others() {
        let page = page_with_frames(&["testify-wall-acme"]);
        let mut bridge = ResizeBridge::new(DEFAULT_RESIZER_URL);

        bridge.attach(&page, "testify-carousel-gone");
        bridge.attach(&page, "testify-wall-acme");
        bridge.library_loaded(&page);

        assert_eq!(bridge.state(), &LoaderState::Ready);
        assert_eq!(page.attached_resizers(), vec!["testify-wall-acme"]);
    }

    #[test]
    fn test_failed_load_never_retries() {
        let page = HeadlessPage::new();
        let mut bridge = ResizeBridge::new("https://cdn.invalid/resizer.js");

        bridge.attach(&page, "testify-carousel-acme");
        bridge.library_failed();
        bridge.attach(&page, "testify-carousel-acme");

        assert_eq!(bridge.state(), &LoaderState::Unavailable);
        assert_eq!(page.script_loads().len(), 1);
        assert!(page.attached_resizers().is_empty());
    }

    #[test]
    fn test_height_update_sets_pixels() {
        let page = HeadlessPage::with_container("host");
        let host = page.element_by_id("host").unwrap();
        let frame = page.add_element(&host, "iframe", "testify-carousel-acme");

        let applied = apply_height_update(
            &page,
            "testify-carousel-acme",
            &json!({"type": "testify-height-update", "height": 742}),
        );

        assert!(applied);
        assert_eq!(page.style(&frame, "height").as_deref(), Some("742px"));
    }

    #[test]
    fn test_height_update_ignores_other_messages() {
        let page = HeadlessPage::with_container("host");
        let host = page.element_by_id("host").unwrap();
        let frame = page.add_element(&host, "iframe", "testify-carousel-acme");

        let theme = json!({"type": "testify-theme-change", "theme": "dark"});
        assert!(!apply_height_update(&page, "testify-carousel-acme", &theme));
        let negative = json!({"type": "testify-height-update", "height": -5});
        assert!(!apply_height_update(&page, "testify-carousel-acme", &negative));
        assert_eq!(page.style(&frame, "height"), None);
    }

    #[test]
    fn test_height_update_missing_frame_is_noop() {
        let page = HeadlessPage::new();
        let msg = json!({"type": "testify-height-update", "height": 300});
        assert!(!apply_height_update(&page, "testify-wall-gone", &msg));
    }

    struct NoScripts;

    impl ResizerHost for NoScripts {
        fn resizer_present(&self) -> bool {
            false
        }

        fn load_resizer(&self, _url: &str) -> crate::Result<()> {
            Err(crate::Error::Dom("scripts are blocked".to_string()))
        }

        fn attach_resizer(&self, _iframe_id: &str) -> crate::Result<()> {
            panic!("nothing to attach to");
        }
    }

    #[test]
    fn test_unissuable_load_marks_unavailable() {
        let mut bridge = ResizeBridge::new(DEFAULT_RESIZER_URL);
        bridge.attach(&NoScripts, "testify-carousel-acme");
        assert_eq!(bridge.state(), &LoaderState::Unavailable);

        bridge.attach(&NoScripts, "testify-wall-acme");
        assert_eq!(bridge.state(), &LoaderState::Unavailable);
    }
}
