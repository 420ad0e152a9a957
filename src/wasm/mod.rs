//! Browser build of the widget loader.
//!
//! Compiled with `wasm-pack build --target web --features wasm`, this module
//! exposes the `TestifyWidget` global host pages call:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Host page                                   │
//! │   TestifyWidget.init / initWall / configure  │
//! │   window "message" events                    │
//! └──────────────────┬───────────────────────────┘
//!                    │ wasm-bindgen
//! ┌──────────────────▼───────────────────────────┐
//! │  bindings  ──▶  Widget<WebPage>  (one/page)  │
//! │                   │                          │
//! │                   ▼                          │
//! │  dom: WebPage (web-sys DOM + iFrameResize)   │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ```javascript
//! import init, { TestifyWidget } from './testify.js';
//!
//! await init();
//! window.TestifyWidget = TestifyWidget;
//! TestifyWidget.init('acme', { theme: 'dark' });
//! ```
//!
//! # Modules
//!
//! - `bindings`: wasm-bindgen exports for JavaScript interop
//! - `dom`: `web-sys` implementation of the host traits

use std::cell::RefCell;
use std::sync::Once;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::MessageEvent;

use crate::embed::{Widget, WidgetSettings};

mod bindings;
mod dom;

pub use bindings::*;
pub use dom::WebPage;

/// Version information for the WASM module
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

thread_local! {
    static WIDGET: RefCell<Option<Widget<WebPage>>> = const { RefCell::new(None) };
}

/// Run `f` against the page's widget, creating it on first use.
///
/// Returns `None` when the widget is unavailable or already borrowed higher
/// up the stack.
pub(crate) fn with_widget<R>(f: impl FnOnce(&mut Widget<WebPage>) -> R) -> Option<R> {
    WIDGET.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            tracing::warn!("re-entrant widget call ignored");
            return None;
        };
        if slot.is_none() {
            match WebPage::from_window() {
                Ok(page) => *slot = Some(Widget::new(page, WidgetSettings::default())),
                Err(e) => {
                    tracing::error!("Testify: {}", e);
                    return None;
                }
            }
        }
        slot.as_mut().map(f)
    })
}

static STARTED: Once = Once::new();

/// Module start: panic hook, console logging, and the window message listener.
///
/// Runs its setup once however often it is called.
#[wasm_bindgen(start)]
pub fn start() {
    STARTED.call_once(|| {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();

        if let Err(e) = install_message_listener() {
            tracing::error!("Testify: {}", e);
        }
    });
}

fn install_message_listener() -> crate::Result<()> {
    let page = WebPage::from_window()?;
    let listener = Closure::<dyn FnMut(MessageEvent)>::new(|event: MessageEvent| {
        if let Some(data) = dom::to_json(&event.data()) {
            with_widget(|widget| widget.handle_window_message(&data));
        }
    });
    page.window()
        .add_event_listener_with_callback("message", listener.as_ref().unchecked_ref())
        .map_err(dom::js_error)?;
    // Registered once for the page's lifetime.
    listener.forget();
    Ok(())
}
