//! Embed configuration: themes, dimensions, modes and the option merge.
//!
//! Callers hand the widget a loose options object ([`EmbedOptions`]). It is
//! shallow-merged over the defaults of the chosen [`EmbedMode`] to produce
//! the [`EmbedConfig`] that drives mounting.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Container the carousel mounts into.
pub const CAROUSEL_CONTAINER_ID: &str = "testify-testimonials";
/// Container the wall mounts into.
pub const WALL_CONTAINER_ID: &str = "testify-wall";

/// Default iframe width for every mode.
pub const DEFAULT_WIDTH: &str = "100%";
/// Default carousel iframe height.
pub const DEFAULT_CAROUSEL_HEIGHT: &str = "500px";
/// Default wall iframe height.
pub const DEFAULT_WALL_HEIGHT: &str = "100%";
/// Default carousel autoplay delay in milliseconds.
pub const DEFAULT_DELAY_MS: u64 = 5000;
/// Default number of wall columns.
pub const DEFAULT_COLUMNS: u32 = 3;

/// Color theme of the embedded view.
///
/// `light` and `dark` are the themes the hosted views ship with; any other
/// name is passed through untouched so new themes need no widget release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Custom(String),
}

impl Theme {
    /// Parse a theme name. Unknown names become [`Theme::Custom`].
    pub fn parse(s: &str) -> Self {
        match s {
            "light" => Theme::Light,
            "dark" => Theme::Dark,
            other => Theme::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Custom(name) => name,
        }
    }
}

impl From<String> for Theme {
    fn from(s: String) -> Self {
        Theme::parse(&s)
    }
}

impl From<&str> for Theme {
    fn from(s: &str) -> Self {
        Theme::parse(s)
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        theme.as_str().to_string()
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A CSS length as supplied by the caller (`"100%"`, `"500px"`).
///
/// Bare numbers are accepted and kept as their decimal text, the same value
/// an HTML `width`/`height` attribute would receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "String")]
pub struct Dimension(String);

impl Dimension {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<Value> for Dimension {
    type Error = String;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(Dimension(s)),
            Value::Number(n) => Ok(Dimension(n.to_string())),
            other => Err(format!("expected a CSS length or number, got {}", other)),
        }
    }
}

impl From<Dimension> for String {
    fn from(dimension: Dimension) -> Self {
        dimension.0
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How many carousel slides are visible at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum SlidesPerView {
    /// Let the carousel size slides to their content
    #[default]
    Auto,
    /// A fixed (possibly fractional) number of slides
    Count(f64),
}

impl SlidesPerView {
    /// Parse `auto` or a positive number.
    pub fn parse(s: &str) -> Option<Self> {
        if s == "auto" {
            return Some(SlidesPerView::Auto);
        }
        s.parse::<f64>().ok().and_then(Self::from_count)
    }

    fn from_count(count: f64) -> Option<Self> {
        (count.is_finite() && count > 0.0).then_some(SlidesPerView::Count(count))
    }

    /// Value as it appears in a frame query string.
    pub fn to_query(&self) -> String {
        match self {
            SlidesPerView::Auto => "auto".to_string(),
            SlidesPerView::Count(count) => count.to_string(),
        }
    }
}

impl TryFrom<Value> for SlidesPerView {
    type Error = String;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        let parsed = match &value {
            Value::String(s) => SlidesPerView::parse(s),
            Value::Number(n) => n.as_f64().and_then(SlidesPerView::from_count),
            _ => None,
        };
        parsed.ok_or_else(|| format!("expected \"auto\" or a positive number, got {}", value))
    }
}

impl From<SlidesPerView> for Value {
    fn from(slides: SlidesPerView) -> Self {
        match slides {
            SlidesPerView::Auto => Value::String("auto".to_string()),
            SlidesPerView::Count(count) => serde_json::Number::from_f64(count)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}

impl std::str::FromStr for SlidesPerView {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SlidesPerView::parse(s)
            .ok_or_else(|| format!("expected \"auto\" or a positive number, got {}", s))
    }
}

/// The two ways a collection can be embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedMode {
    /// Auto-playing testimonial slider (`init`)
    Carousel,
    /// Masonry grid of every testimonial (`initWall`)
    Wall,
}

impl EmbedMode {
    pub const ALL: [EmbedMode; 2] = [EmbedMode::Carousel, EmbedMode::Wall];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "carousel" => Some(EmbedMode::Carousel),
            "wall" => Some(EmbedMode::Wall),
            _ => None,
        }
    }

    /// Name used in iframe ids and frame URL paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedMode::Carousel => "carousel",
            EmbedMode::Wall => "wall",
        }
    }

    /// Id of the host element this mode mounts into.
    pub fn container_id(&self) -> &'static str {
        match self {
            EmbedMode::Carousel => CAROUSEL_CONTAINER_ID,
            EmbedMode::Wall => WALL_CONTAINER_ID,
        }
    }

    /// Value of the iframe `scrolling` attribute. Wall content may be taller
    /// than the viewport and scrolls inside the frame.
    pub fn scrolling(&self) -> &'static str {
        match self {
            EmbedMode::Carousel => "no",
            EmbedMode::Wall => "yes",
        }
    }

    /// Deterministic iframe id, `testify-{mode}-{spaceName}`.
    pub fn iframe_id(&self, space_name: &str) -> String {
        format!("testify-{}-{}", self.as_str(), space_name)
    }

    /// Inline style set on the container before the iframe goes in. A
    /// fixed-height parent would clip the wall.
    pub fn container_style(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            EmbedMode::Carousel => &[],
            EmbedMode::Wall => &[("height", "100vh"), ("overflow", "visible")],
        }
    }

    /// Query keys forwarded to the hosted view, in URL order.
    pub fn query_keys(&self) -> &'static [&'static str] {
        match self {
            EmbedMode::Carousel => &["theme", "autoplay", "delay", "slidesPerView"],
            EmbedMode::Wall => &["theme", "columns"],
        }
    }
}

impl std::fmt::Display for EmbedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options supplied by the host page. Every key is optional.
///
/// Keys the widget does not know, and keys the chosen mode never reads, are
/// kept in `extra` so they survive the merge, but nothing reads them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbedOptions {
    pub theme: Option<Theme>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub autoplay: Option<bool>,
    pub delay: Option<u64>,
    pub slides_per_view: Option<SlidesPerView>,
    pub columns: Option<u32>,
    pub extra: Map<String, Value>,
}

impl EmbedOptions {
    /// Read options for `mode` from a host-supplied JSON value.
    ///
    /// Reading never fails. `null` means "no options". A value of the wrong
    /// shape is logged and leaves that setting at its default. Only the keys
    /// `mode` uses are interpreted; the rest are carried in `extra`.
    pub fn from_value(value: &Value, mode: EmbedMode) -> Self {
        let mut options = Self::default();
        let object = match value {
            Value::Null => return options,
            Value::Object(object) => object,
            other => {
                tracing::warn!(mode = %mode, "ignoring options that are not an object: {}", other);
                return options;
            }
        };

        for (key, value) in object {
            if value.is_null() {
                continue;
            }
            match key.as_str() {
                "theme" => options.theme = read_option(key, value, theme_from_value),
                "width" => options.width = read_option(key, value, dimension_from_value),
                "height" => options.height = read_option(key, value, dimension_from_value),
                key if !mode.query_keys().contains(&key) => {
                    options.extra.insert(key.to_string(), value.clone());
                }
                "autoplay" => options.autoplay = read_option(key, value, bool_from_value),
                "delay" => options.delay = read_option(key, value, number_from_value),
                "slidesPerView" => {
                    options.slides_per_view =
                        read_option(key, value, |v| SlidesPerView::try_from(v.clone()).ok())
                }
                "columns" => options.columns = read_option(key, value, number_from_value),
                _ => {
                    options.extra.insert(key.clone(), value.clone());
                }
            }
        }
        options
    }
}

fn read_option<T>(key: &str, value: &Value, read: impl Fn(&Value) -> Option<T>) -> Option<T> {
    let parsed = read(value);
    if parsed.is_none() {
        tracing::warn!(key, "ignoring unusable option value {}, keeping the default", value);
    }
    parsed
}

fn theme_from_value(value: &Value) -> Option<Theme> {
    match value {
        Value::String(s) => Some(Theme::parse(s)),
        Value::Number(n) => Some(Theme::parse(&n.to_string())),
        Value::Bool(b) => Some(Theme::parse(&b.to_string())),
        _ => None,
    }
}

fn dimension_from_value(value: &Value) -> Option<Dimension> {
    Dimension::try_from(value.clone()).ok()
}

fn bool_from_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn number_from_value<T: TryFrom<u64> + std::str::FromStr>(value: &Value) -> Option<T> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| T::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Effective configuration of one embed.
///
/// Mode-specific settings are `None` for the mode that does not use them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedConfig {
    pub theme: Theme,
    pub width: Dimension,
    pub height: Dimension,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoplay: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slides_per_view: Option<SlidesPerView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EmbedConfig {
    /// Built-in defaults for a mode.
    pub fn defaults(mode: EmbedMode) -> Self {
        match mode {
            EmbedMode::Carousel => Self {
                theme: Theme::Light,
                width: Dimension::new(DEFAULT_WIDTH),
                height: Dimension::new(DEFAULT_CAROUSEL_HEIGHT),
                autoplay: Some(true),
                delay: Some(DEFAULT_DELAY_MS),
                slides_per_view: Some(SlidesPerView::Auto),
                columns: None,
                extra: Map::new(),
            },
            EmbedMode::Wall => Self {
                theme: Theme::Light,
                width: Dimension::new(DEFAULT_WIDTH),
                height: Dimension::new(DEFAULT_WALL_HEIGHT),
                autoplay: None,
                delay: None,
                slides_per_view: None,
                columns: Some(DEFAULT_COLUMNS),
                extra: Map::new(),
            },
        }
    }

    /// Mode defaults with `options` merged over them.
    pub fn merged(mode: EmbedMode, options: &EmbedOptions) -> Self {
        let mut config = Self::defaults(mode);
        config.merge(options);
        config
    }

    /// Shallow merge: every key set in `options` replaces the current value.
    pub fn merge(&mut self, options: &EmbedOptions) {
        if let Some(theme) = &options.theme {
            self.theme = theme.clone();
        }
        if let Some(width) = &options.width {
            self.width = width.clone();
        }
        if let Some(height) = &options.height {
            self.height = height.clone();
        }
        if options.autoplay.is_some() {
            self.autoplay = options.autoplay;
        }
        if options.delay.is_some() {
            self.delay = options.delay;
        }
        if options.slides_per_view.is_some() {
            self.slides_per_view = options.slides_per_view;
        }
        if options.columns.is_some() {
            self.columns = options.columns;
        }
        for (key, value) in &options.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    /// Query parameters the hosted view for `mode` receives, in URL order.
    ///
    /// Width and height never appear here; they only size the iframe element.
    pub fn query_pairs(&self, mode: EmbedMode) -> Vec<(&'static str, String)> {
        mode.query_keys()
            .iter()
            .map(|&key| (key, self.query_value(key)))
            .collect()
    }

    fn query_value(&self, key: &str) -> String {
        match key {
            "theme" => self.theme.to_string(),
            "autoplay" => self.autoplay.unwrap_or(true).to_string(),
            "delay" => self.delay.unwrap_or(DEFAULT_DELAY_MS).to_string(),
            "slidesPerView" => self.slides_per_view.unwrap_or_default().to_query(),
            "columns" => self.columns.unwrap_or(DEFAULT_COLUMNS).to_string(),
            _ => String::new(),
        }
    }
}
