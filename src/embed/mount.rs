//! Iframe construction and (re)mounting.

use serde::Serialize;

use super::config::{EmbedConfig, EmbedMode};
use super::host::HostPage;
use crate::Result;

/// Everything needed to create the embed iframe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IframeSpec {
    pub id: String,
    pub src: String,
    pub frame_border: &'static str,
    pub scrolling: &'static str,
    /// `width` attribute, the fallback when the inline style is ignored
    pub width: String,
    pub height: String,
    /// Inline style, in declaration order
    pub style: Vec<(&'static str, &'static str)>,
}

impl IframeSpec {
    /// Spec for the embed of `space_name` in `mode`.
    ///
    /// The inline `width: 1px; min-width: 100%` pair makes the frame track its
    /// container's content width whatever the nominal `width` says.
    pub fn for_embed(mode: EmbedMode, space_name: &str, config: &EmbedConfig, src: String) -> Self {
        Self {
            id: mode.iframe_id(space_name),
            src,
            frame_border: "0",
            scrolling: mode.scrolling(),
            width: config.width.to_string(),
            height: config.height.to_string(),
            style: vec![("width", "1px"), ("min-width", "100%"), ("border", "none")],
        }
    }

    /// The `style` attribute value.
    pub fn style_attr(&self) -> String {
        self.style
            .iter()
            .map(|(property, value)| format!("{}: {};", property, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Replace whatever `container` holds with a fresh iframe built from `spec`.
///
/// The iframe is built before the container is touched. If that fails the
/// container keeps its content and style. `container_style` is applied once
/// the frame exists. The previous frame is discarded rather than reused, so
/// nothing bound to it can observe the new one.
pub fn mount<P: HostPage>(
    page: &P,
    container: &P::Element,
    spec: &IframeSpec,
    container_style: &[(&str, &str)],
) -> Result<P::Element> {
    let frame = page.create_iframe(spec)?;
    for (property, value) in container_style {
        page.set_style(container, property, value);
    }
    page.clear_children(container);
    page.append_child(container, &frame)?;
    tracing::debug!(id = %spec.id, src = %spec.src, "mounted embed iframe");
    Ok(frame)
}
