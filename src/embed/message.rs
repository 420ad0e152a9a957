//! Control messages crossing the window boundary.
//!
//! Two independent channels carry them:
//!
//! - the raw window `message` event, on which any host page script can post a
//!   `testify-theme-change`;
//! - the resize library's own `onMessage` callback, through which the embedded
//!   view reports `testify-height-update`.
//!
//! Each channel accepts only its own `type`, so a payload can never be acted
//! on twice.
//!
//! ```json
//! {"type": "testify-theme-change", "theme": "dark"}
//! {"type": "testify-theme-change", "theme": "dark", "spaceName": "acme"}
//! {"type": "testify-height-update", "height": 742}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::Theme;

/// `type` of a host-initiated theme change.
pub const THEME_CHANGE: &str = "testify-theme-change";
/// `type` of an embedded-view height report.
pub const HEIGHT_UPDATE: &str = "testify-height-update";

/// A typed widget control message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// Reload running embeds with a new theme.
    #[serde(rename = "testify-theme-change")]
    ThemeChange {
        theme: Theme,
        /// Restrict the change to one space. Absent means every mounted embed.
        #[serde(
            default,
            rename = "spaceName",
            skip_serializing_if = "Option::is_none"
        )]
        space_name: Option<String>,
    },

    /// Rendered height of the embedded document, in CSS pixels.
    #[serde(rename = "testify-height-update")]
    HeightUpdate { height: f64 },
}

impl ControlMessage {
    /// Decode a message payload. Anything that is not a well-formed control
    /// message yields `None`.
    pub fn from_value(data: &Value) -> Option<Self> {
        let kind = data.get("type")?.as_str()?;
        if kind != THEME_CHANGE && kind != HEIGHT_UPDATE {
            return None;
        }
        serde_json::from_value(data.clone()).ok()
    }

    pub fn theme_change(theme: Theme) -> Self {
        ControlMessage::ThemeChange {
            theme,
            space_name: None,
        }
    }

    pub fn height_update(height: f64) -> Self {
        ControlMessage::HeightUpdate { height }
    }
}

/// Format a height the way CSS expects it: `742` → `"742px"`.
pub fn css_pixels(height: f64) -> String {
    format!("{}px", height)
}
