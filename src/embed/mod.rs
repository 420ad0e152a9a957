//! Platform-agnostic widget core
//!
//! Everything the embed loader does lives here, written against the
//! [`HostPage`] and [`ResizerHost`] traits so the same code drives the real
//! DOM (see `crate::wasm`) and the in-memory [`HeadlessPage`].
//!
//! ```text
//!   host page ──init/initWall──▶ Widget ──▶ mount ──▶ iframe #testify-{mode}-{space}
//!                                  │                      ▲
//!                                  ├──▶ ResizeBridge ─────┤ height (resize library channel)
//!                                  │                      │
//!   window.postMessage ──theme─────┘──────────────────────┘ src rewrite (window channel)
//! ```
//!
//! # Modules
//!
//! - `config`: themes, dimensions, embed modes and the option merge
//! - `url`: frame source URLs, both directions
//! - `message`: control messages crossing the window boundary
//! - `host`: traits the widget needs from its host page
//! - `mount`: iframe construction and (re)mounting
//! - `resize`: lazy resize library loader and height updates
//! - `widget`: the public facade
//! - `headless`: in-memory host page

pub mod config;
pub mod headless;
pub mod host;
pub mod message;
pub mod mount;
pub mod resize;
pub mod url;
pub mod widget;

pub use config::*;
pub use headless::HeadlessPage;
pub use host::{HostPage, ResizerHost};
pub use message::ControlMessage;
pub use mount::IframeSpec;
pub use resize::{LoaderState, ResizeBridge};
pub use url::{EmbedSource, frame_src, with_theme};
pub use widget::{Widget, WidgetHandle, WidgetSettings};
