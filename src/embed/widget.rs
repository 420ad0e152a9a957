//! The widget facade.
//!
//! [`Widget::init`] and [`Widget::init_wall`] are what host pages call. They
//! check their preconditions, merge options over the mode defaults, mount the
//! iframe, hook up auto-resizing, and hand back a [`WidgetHandle`]. Failures
//! are logged and reported as `None`; nothing is ever thrown into the host
//! page.
//!
//! The facade also remembers the most recently mounted embed of each mode,
//! which is what an untargeted theme change applies to.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::config::{EmbedConfig, EmbedMode, EmbedOptions, Theme};
use super::host::{HostPage, ResizerHost};
use super::message::ControlMessage;
use super::mount::{self, IframeSpec};
use super::resize::{self, DEFAULT_RESIZER_URL, LoaderState, ResizeBridge};
use super::url::{frame_src, with_theme};
use crate::{Error, Result};

/// Where hosted views are served when nothing else is configured.
pub const DEFAULT_EMBED_BASE_URL: &str = "http://localhost:5173/embed";

/// Deployment-specific settings of the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSettings {
    /// Prefix of every frame source URL
    pub embed_base_url: Url,
    /// Script URL of the resize library
    pub resizer_url: String,
}

impl WidgetSettings {
    pub fn new(embed_base_url: &str, resizer_url: impl Into<String>) -> Result<Self> {
        let embed_base_url = Url::parse(embed_base_url)?;
        if embed_base_url.cannot_be_a_base() {
            return Err(Error::InvalidInput(format!(
                "embed base URL cannot hold a path: {}",
                embed_base_url
            )));
        }
        Ok(Self {
            embed_base_url,
            resizer_url: resizer_url.into(),
        })
    }
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            embed_base_url: Url::parse(DEFAULT_EMBED_BASE_URL)
                .expect("default embed base URL is valid"),
            resizer_url: DEFAULT_RESIZER_URL.to_string(),
        }
    }
}

/// A mounted embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetHandle {
    pub space_name: String,
    pub mode: EmbedMode,
    pub container_id: String,
    pub iframe_id: String,
}

/// The embed loader bound to one host page.
#[derive(Debug)]
pub struct Widget<P> {
    page: P,
    settings: WidgetSettings,
    resize: ResizeBridge,
    mounted: BTreeMap<EmbedMode, WidgetHandle>,
}

impl<P: HostPage + ResizerHost> Widget<P> {
    pub fn new(page: P, settings: WidgetSettings) -> Self {
        let resize = ResizeBridge::new(settings.resizer_url.clone());
        Self {
            page,
            settings,
            resize,
            mounted: BTreeMap::new(),
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn settings(&self) -> &WidgetSettings {
        &self.settings
    }

    /// Replace the settings. Only allowed before the resize library has been
    /// requested, since the script URL is baked into that request.
    pub fn configure(&mut self, settings: WidgetSettings) -> Result<()> {
        if self.resize.state() != &LoaderState::Idle {
            return Err(Error::InvalidInput(
                "settings cannot change after the first embed was mounted".to_string(),
            ));
        }
        self.resize = ResizeBridge::new(settings.resizer_url.clone());
        self.settings = settings;
        Ok(())
    }

    pub fn resize_state(&self) -> &LoaderState {
        self.resize.state()
    }

    /// Most recently mounted embed of each mode.
    pub fn instances(&self) -> impl Iterator<Item = &WidgetHandle> {
        self.mounted.values()
    }

    pub fn instance(&self, mode: EmbedMode) -> Option<&WidgetHandle> {
        self.mounted.get(&mode)
    }

    /// Mount a carousel into `#testify-testimonials`.
    pub fn init(&mut self, space_name: &str, options: &Value) -> Option<WidgetHandle> {
        self.init_mode(EmbedMode::Carousel, space_name, options)
    }

    /// Mount a wall into `#testify-wall`.
    pub fn init_wall(&mut self, space_name: &str, options: &Value) -> Option<WidgetHandle> {
        self.init_mode(EmbedMode::Wall, space_name, options)
    }

    fn init_mode(
        &mut self,
        mode: EmbedMode,
        space_name: &str,
        options: &Value,
    ) -> Option<WidgetHandle> {
        match self.mount(mode, space_name, options) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(mode = %mode, space_name, "Testify: {}", e);
                None
            }
        }
    }

    /// Mount an embed, reporting why it could not be mounted.
    ///
    /// Every precondition is checked before the page is touched. Option
    /// values never block a mount; unusable ones fall back to the defaults.
    pub fn mount(
        &mut self,
        mode: EmbedMode,
        space_name: &str,
        options: &Value,
    ) -> Result<WidgetHandle> {
        if space_name.is_empty() {
            return Err(Error::MissingSpaceName);
        }
        let container_id = mode.container_id();
        let container = self
            .page
            .element_by_id(container_id)
            .ok_or_else(|| Error::ContainerNotFound(container_id.to_string()))?;

        let config = EmbedConfig::merged(mode, &EmbedOptions::from_value(options, mode));
        let src = frame_src(&self.settings.embed_base_url, mode, space_name, &config)?;
        let spec = IframeSpec::for_embed(mode, space_name, &config, src.into());

        mount::mount(&self.page, &container, &spec, mode.container_style())?;
        self.resize.attach(&self.page, &spec.id);

        let handle = WidgetHandle {
            space_name: space_name.to_string(),
            mode,
            container_id: container_id.to_string(),
            iframe_id: spec.id,
        };
        tracing::info!(mode = %mode, space_name, iframe_id = %handle.iframe_id, "embed mounted");
        self.mounted.insert(mode, handle.clone());
        Ok(handle)
    }

    /// Window message channel. Only theme changes are handled here.
    ///
    /// Returns how many embeds were reloaded.
    pub fn handle_window_message(&self, data: &Value) -> usize {
        match ControlMessage::from_value(data) {
            Some(ControlMessage::ThemeChange { theme, space_name }) => {
                self.update_theme(&theme, space_name.as_deref())
            }
            _ => 0,
        }
    }

    /// Resize library channel. Only height updates are handled here.
    pub fn handle_resizer_message(&self, iframe_id: &str, message: &Value) -> bool {
        resize::apply_height_update(&self.page, iframe_id, message)
    }

    /// The resize library script finished loading.
    pub fn resizer_loaded(&mut self) {
        self.resize.library_loaded(&self.page);
    }

    /// The resize library script failed to load.
    pub fn resizer_failed(&mut self) {
        self.resize.library_failed();
    }

    /// Reload tracked embeds with `theme`, limited to `space_name` when given.
    ///
    /// Returns how many embeds were reloaded.
    pub fn update_theme(&self, theme: &Theme, space_name: Option<&str>) -> usize {
        let targets: Vec<&WidgetHandle> = self
            .mounted
            .values()
            .filter(|handle| space_name.is_none_or(|name| handle.space_name == name))
            .collect();
        if targets.is_empty() {
            tracing::debug!(theme = %theme, ?space_name, "theme change with no matching embed");
            return 0;
        }
        targets
            .into_iter()
            .filter(|handle| self.update_instance_theme(handle, theme))
            .count()
    }

    /// Reload one embed with `theme` by rewriting its frame source.
    ///
    /// A frame that was replaced or removed since `handle` was issued is
    /// skipped.
    pub fn update_instance_theme(&self, handle: &WidgetHandle, theme: &Theme) -> bool {
        let Some(frame) = self.page.element_by_id(&handle.iframe_id) else {
            tracing::debug!(iframe_id = %handle.iframe_id, "theme change for a frame that is gone");
            return false;
        };
        let Some(src) = self.page.frame_src(&frame) else {
            return false;
        };
        match with_theme(&src, theme) {
            Ok(updated) => {
                self.page.set_frame_src(&frame, &updated);
                true
            }
            Err(e) => {
                tracing::debug!(
                    iframe_id = %handle.iframe_id,
                    error = %e,
                    "unparsable frame source"
                );
                false
            }
        }
    }
}
