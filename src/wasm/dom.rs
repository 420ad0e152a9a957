//! `web-sys` implementation of the host traits.

use js_sys::{Function, Object, Reflect};
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlIFrameElement, HtmlScriptElement, Window};

use super::with_widget;
use crate::embed::{HostPage, IframeSpec, ResizerHost};
use crate::{Error, Result};

/// Global the resize library defines once its script has run.
const RESIZER_GLOBAL: &str = "iFrameResize";

/// The live browser document.
#[derive(Debug, Clone)]
pub struct WebPage {
    window: Window,
    document: Document,
}

impl WebPage {
    pub fn from_window() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| Error::Dom("no global window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| Error::Dom("window has no document".to_string()))?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

pub(crate) fn js_error(value: JsValue) -> Error {
    let message = value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value));
    Error::Dom(message)
}

/// Convert a JS value into JSON. `undefined` and values `JSON.stringify`
/// cannot represent become `None`.
pub(crate) fn to_json(value: &JsValue) -> Option<Value> {
    if value.is_undefined() || value.is_null() {
        return Some(Value::Null);
    }
    let text = js_sys::JSON::stringify(value).ok()?.as_string()?;
    serde_json::from_str(&text).ok()
}

fn set_prop(target: &Object, key: &str, value: &JsValue) -> Result<()> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(js_error)
}

impl HostPage for WebPage {
    type Element = Element;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn clear_children(&self, element: &Element) {
        while let Some(child) = element.first_child() {
            if element.remove_child(&child).is_err() {
                break;
            }
        }
    }

    fn create_iframe(&self, spec: &IframeSpec) -> Result<Element> {
        let frame = self.document.create_element("iframe").map_err(js_error)?;
        frame.set_id(&spec.id);
        frame.set_attribute("src", &spec.src).map_err(js_error)?;
        frame
            .set_attribute("frameborder", spec.frame_border)
            .map_err(js_error)?;
        frame.set_attribute("scrolling", spec.scrolling).map_err(js_error)?;
        frame.set_attribute("width", &spec.width).map_err(js_error)?;
        frame.set_attribute("height", &spec.height).map_err(js_error)?;
        frame.set_attribute("style", &spec.style_attr()).map_err(js_error)?;
        Ok(frame)
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<()> {
        parent.append_child(child).map(|_| ()).map_err(js_error)
    }

    fn set_style(&self, element: &Element, property: &str, value: &str) {
        let Some(element) = element.dyn_ref::<HtmlElement>() else {
            return;
        };
        if let Err(e) = element.style().set_property(property, value) {
            tracing::debug!(property, error = %js_error(e), "could not set style");
        }
    }

    fn frame_src(&self, element: &Element) -> Option<String> {
        element.dyn_ref::<HtmlIFrameElement>().map(|frame| frame.src())
    }

    fn set_frame_src(&self, element: &Element, src: &str) {
        if let Some(frame) = element.dyn_ref::<HtmlIFrameElement>() {
            frame.set_src(src);
        }
    }
}

impl ResizerHost for WebPage {
    fn resizer_present(&self) -> bool {
        Reflect::get(&self.window, &JsValue::from_str(RESIZER_GLOBAL))
            .map(|value| value.is_function())
            .unwrap_or(false)
    }

    fn load_resizer(&self, url: &str) -> Result<()> {
        let script: HtmlScriptElement = self
            .document
            .create_element("script")
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| Error::Dom("created element is not a script".to_string()))?;
        script.set_src(url);
        script.set_async(true);

        // Both callbacks run later from the event loop, never inside a widget call.
        let on_load = Closure::once_into_js(|| {
            with_widget(|widget| widget.resizer_loaded());
        });
        let on_error = Closure::once_into_js(|| {
            with_widget(|widget| widget.resizer_failed());
        });
        script.set_onload(Some(on_load.unchecked_ref()));
        script.set_onerror(Some(on_error.unchecked_ref()));

        let parent: Element = match self.document.head() {
            Some(head) => head.into(),
            None => self
                .document
                .body()
                .map(Into::into)
                .ok_or_else(|| Error::Dom("document has neither head nor body".to_string()))?,
        };
        parent.append_child(&script).map(|_| ()).map_err(js_error)
    }

    fn attach_resizer(&self, iframe_id: &str) -> Result<()> {
        let resize: Function = Reflect::get(&self.window, &JsValue::from_str(RESIZER_GLOBAL))
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| Error::Dom(format!("{} is not a function", RESIZER_GLOBAL)))?;
        let frame = self
            .element_by_id(iframe_id)
            .ok_or_else(|| Error::Dom(format!("iframe #{} is not in the page", iframe_id)))?;

        let options = Object::new();
        set_prop(&options, "log", &JsValue::FALSE)?;
        set_prop(&options, "checkOrigin", &JsValue::FALSE)?;

        let id = iframe_id.to_string();
        let on_message = Closure::<dyn FnMut(JsValue)>::new(move |data: JsValue| {
            // The library wraps the payload as `{ iframe, message }`.
            let message = Reflect::get(&data, &JsValue::from_str("message"))
                .unwrap_or(JsValue::UNDEFINED);
            if let Some(message) = to_json(&message) {
                with_widget(|widget| widget.handle_resizer_message(&id, &message));
            }
        });
        set_prop(&options, "onMessage", on_message.as_ref())?;
        // Lives as long as the frame's resizer binding.
        on_message.forget();

        resize
            .call2(&JsValue::NULL, &options, &frame)
            .map(|_| ())
            .map_err(js_error)
    }
}
