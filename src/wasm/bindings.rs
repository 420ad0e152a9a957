//! JavaScript bindings for the widget loader.
//!
//! Every entry point logs failures to the console and returns a falsy value
//! instead of throwing into the host page.

use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;

use super::dom::to_json;
use super::with_widget;
use crate::embed::{self, EmbedMode, Theme, WidgetSettings};
use crate::{Error, Result};

/// The `TestifyWidget` global.
#[wasm_bindgen]
pub struct TestifyWidget {
    _private: (),
}

#[wasm_bindgen]
impl TestifyWidget {
    /// Mount a carousel into `#testify-testimonials`.
    pub fn init(space_name: JsValue, options: JsValue) -> Option<WidgetHandle> {
        mount(EmbedMode::Carousel, &space_name, &options)
    }

    /// Mount a wall of love into `#testify-wall`.
    #[wasm_bindgen(js_name = initWall)]
    pub fn init_wall(space_name: JsValue, options: JsValue) -> Option<WidgetHandle> {
        mount(EmbedMode::Wall, &space_name, &options)
    }

    /// Override `embedBaseUrl` and/or `resizerUrl`. Only effective before the
    /// first mount; returns whether the settings were applied.
    pub fn configure(settings: JsValue) -> bool {
        let Some(settings) = to_json(&settings) else {
            tracing::error!("Testify: settings must be a plain object");
            return false;
        };
        with_widget(|widget| {
            let result = apply_settings(widget.settings(), &settings)
                .and_then(|updated| widget.configure(updated));
            match result {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!("Testify: {}", e);
                    false
                }
            }
        })
        .unwrap_or(false)
    }

    /// Reload every tracked embed with `theme`. Returns how many were reloaded.
    #[wasm_bindgen(js_name = updateTheme)]
    pub fn update_theme(theme: String) -> usize {
        with_widget(|widget| widget.update_theme(&Theme::parse(&theme), None)).unwrap_or(0)
    }

    /// Crate version of the loader.
    pub fn version() -> String {
        super::VERSION.to_string()
    }
}

#[wasm_bindgen]
extern "C" {
    /// The global `String` function, which turns any value into text.
    #[wasm_bindgen(js_name = String)]
    fn coerce_to_string(value: &JsValue) -> String;
}

/// Space name as text. Falsy values mean "no space name"; anything else is
/// coerced the way `String(value)` would.
fn space_name_text(value: &JsValue) -> String {
    if value.is_falsy() {
        return String::new();
    }
    value.as_string().unwrap_or_else(|| coerce_to_string(value))
}

fn mount(mode: EmbedMode, space_name: &JsValue, options: &JsValue) -> Option<WidgetHandle> {
    let space_name = space_name_text(space_name);
    let options = to_json(options).unwrap_or_else(|| {
        tracing::warn!(mode = %mode, "options are not serializable, using the defaults");
        Value::Null
    });
    let handle = with_widget(|widget| match mode {
        EmbedMode::Carousel => widget.init(&space_name, &options),
        EmbedMode::Wall => widget.init_wall(&space_name, &options),
    })??;
    Some(WidgetHandle { inner: handle })
}

/// Overlay `{ embedBaseUrl?, resizerUrl? }` on the current settings.
fn apply_settings(current: &WidgetSettings, settings: &Value) -> Result<WidgetSettings> {
    let Value::Object(map) = settings else {
        return Err(Error::InvalidInput("settings must be a plain object".to_string()));
    };
    let base = string_field(map, "embedBaseUrl")?.unwrap_or(current.embed_base_url.as_str());
    let resizer = string_field(map, "resizerUrl")?.unwrap_or(current.resizer_url.as_str());
    WidgetSettings::new(base, resizer)
}

fn string_field<'a>(map: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(Error::InvalidInput(format!(
            "{} must be a string, got {}",
            key, other
        ))),
    }
}

/// A mounted embed, as returned by `init` and `initWall`.
#[wasm_bindgen]
pub struct WidgetHandle {
    inner: embed::WidgetHandle,
}

#[wasm_bindgen]
impl WidgetHandle {
    #[wasm_bindgen(getter, js_name = spaceName)]
    pub fn space_name(&self) -> String {
        self.inner.space_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.inner.mode.to_string()
    }

    #[wasm_bindgen(getter, js_name = iframeId)]
    pub fn iframe_id(&self) -> String {
        self.inner.iframe_id.clone()
    }

    #[wasm_bindgen(getter, js_name = containerId)]
    pub fn container_id(&self) -> String {
        self.inner.container_id.clone()
    }

    /// Reload this embed with `theme`. Returns false if it was replaced since.
    #[wasm_bindgen(js_name = updateTheme)]
    pub fn update_theme(&self, theme: String) -> bool {
        with_widget(|widget| widget.update_instance_theme(&self.inner, &Theme::parse(&theme)))
            .unwrap_or(false)
    }
}
