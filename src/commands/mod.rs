//! Command implementations for the Testify CLI.
//!
//! Every command returns a result type implementing [`Output`], printed as
//! JSON by default or as text with `-H`:
//! - `url` - Frame source URL for an embed
//! - `snippet` - Host page markup that loads an embed
//! - `render` - Widget run against a headless page
//! - `inspect` - Frame source URL taken apart
//! - `config` - Show, get and set configuration

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::EmbedArgs;
use crate::config::{CONFIG_KEYS, ResolvedConfig, TestifyConfig, ValueSource};
use crate::embed::{
    EmbedConfig, EmbedMode, EmbedOptions, EmbedSource, HeadlessPage, HostPage, IframeSpec,
    SlidesPerView, Theme, Widget, WidgetSettings, frame_src,
};
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Print a command result in the requested format.
pub fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

impl EmbedArgs {
    pub fn mode(&self) -> EmbedMode {
        if self.wall {
            EmbedMode::Wall
        } else {
            EmbedMode::Carousel
        }
    }

    /// Options object for the flags given, as a host page would pass it.
    ///
    /// `default_theme` fills in when `--theme` is absent.
    pub fn to_options(&self, default_theme: &Theme) -> Result<Value> {
        let mut options = Map::new();
        let theme = self
            .theme
            .clone()
            .unwrap_or_else(|| default_theme.to_string());
        options.insert("theme".to_string(), Value::String(theme));
        if let Some(width) = &self.width {
            options.insert("width".to_string(), Value::String(width.clone()));
        }
        if let Some(height) = &self.height {
            options.insert("height".to_string(), Value::String(height.clone()));
        }
        if let Some(autoplay) = self.autoplay {
            options.insert("autoplay".to_string(), Value::Bool(autoplay));
        }
        if let Some(delay) = self.delay {
            options.insert("delay".to_string(), Value::from(delay));
        }
        if let Some(slides) = &self.slides_per_view {
            let slides: SlidesPerView = slides.parse().map_err(Error::InvalidOptions)?;
            options.insert("slidesPerView".to_string(), Value::from(slides));
        }
        if let Some(columns) = self.columns {
            options.insert("columns".to_string(), Value::from(columns));
        }
        Ok(Value::Object(options))
    }

    fn validate_space(&self) -> Result<()> {
        if self.space.is_empty() {
            return Err(Error::MissingSpaceName);
        }
        Ok(())
    }
}

// === url ===

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlResult {
    pub mode: EmbedMode,
    pub space_name: String,
    pub iframe_id: String,
    pub src: String,
}

impl Output for UrlResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        self.src.clone()
    }
}

/// Frame source URL for the embed described by `args`.
pub fn url(
    settings: &WidgetSettings,
    args: &EmbedArgs,
    default_theme: &Theme,
) -> Result<UrlResult> {
    args.validate_space()?;
    let mode = args.mode();
    let options = EmbedOptions::from_value(&args.to_options(default_theme)?, mode);
    let config = EmbedConfig::merged(mode, &options);
    let src = frame_src(&settings.embed_base_url, mode, &args.space, &config)?;
    Ok(UrlResult {
        mode,
        space_name: args.space.clone(),
        iframe_id: mode.iframe_id(&args.space),
        src: src.into(),
    })
}

// === snippet ===

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetResult {
    pub mode: EmbedMode,
    pub container_id: &'static str,
    pub html: String,
}

impl Output for SnippetResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        self.html.clone()
    }
}

/// Markup a host page pastes to load the embed described by `args`.
pub fn snippet(args: &EmbedArgs, script_url: &str, default_theme: &Theme) -> Result<SnippetResult> {
    args.validate_space()?;
    let mode = args.mode();
    let options = args.to_options(default_theme)?;

    let init_fn = match mode {
        EmbedMode::Carousel => "init",
        EmbedMode::Wall => "initWall",
    };
    let container_id = mode.container_id();
    let html = format!(
        "<div id=\"{container}\"></div>\n\
         <script type=\"module\">\n\
         \x20 import init, {{ TestifyWidget }} from {script};\n\
         \x20 await init();\n\
         \x20 window.TestifyWidget = TestifyWidget;\n\
         \x20 TestifyWidget.{init_fn}({space}, {options});\n\
         </script>",
        container = container_id,
        script = script_json(script_url)?,
        init_fn = init_fn,
        space = script_json(&args.space)?,
        options = script_json(&options)?,
    );
    Ok(SnippetResult {
        mode,
        container_id,
        html,
    })
}

/// JSON text safe to inline in a `<script>` element.
///
/// `<` is written as `\u003c` so no value can close the element early.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace('<', "\\u003c"))
}

// === render ===

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResult {
    pub iframe: IframeSpec,
    pub container_style: Vec<(String, String)>,
    pub resizer_script: Option<String>,
    pub html: String,
}

impl Output for RenderResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        self.html.clone()
    }
}

/// Run the widget against a headless page holding the container for `args`.
pub fn render(
    settings: &WidgetSettings,
    args: &EmbedArgs,
    default_theme: &Theme,
) -> Result<RenderResult> {
    let mode = args.mode();
    let options = args.to_options(default_theme)?;
    let page = HeadlessPage::with_container(mode.container_id());
    let mut widget = Widget::new(page, settings.clone());
    let handle = widget.mount(mode, &args.space, &options)?;

    let page = widget.page();
    let container = page
        .element_by_id(mode.container_id())
        .ok_or_else(|| Error::ContainerNotFound(mode.container_id().to_string()))?;
    let frame = page
        .element_by_id(&handle.iframe_id)
        .ok_or_else(|| Error::Dom(format!("iframe #{} was not mounted", handle.iframe_id)))?;

    let config = EmbedConfig::merged(mode, &EmbedOptions::from_value(&options, mode));
    let src = page.attribute(&frame, "src").unwrap_or_default();
    let container_style = mode
        .container_style()
        .iter()
        .filter_map(|&(property, _)| {
            page.style(&container, property)
                .map(|value| (property.to_string(), value))
        })
        .collect();

    Ok(RenderResult {
        iframe: IframeSpec::for_embed(mode, &args.space, &config, src),
        container_style,
        resizer_script: page.script_loads().into_iter().next(),
        html: page.outer_html(&container),
    })
}

// === inspect ===

impl Output for EmbedSource {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("mode: {}", self.mode),
            format!("space: {}", self.space_name),
            format!("iframe id: {}", self.iframe_id),
            format!("base url: {}", self.base_url),
        ];
        for (key, value) in self.config.query_pairs(self.mode) {
            lines.push(format!("{}: {}", key, value));
        }
        for (key, value) in &self.config.extra {
            let value = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
            lines.push(format!("{} (unused): {}", key, value));
        }
        lines.join("\n")
    }
}

/// Take a frame source URL apart.
pub fn inspect(src: &str) -> Result<EmbedSource> {
    EmbedSource::parse(src)
}

// === config ===

#[derive(Serialize)]
pub struct ConfigShowResult {
    pub config: ResolvedConfig,
}

impl Output for ConfigShowResult {
    fn to_json(&self) -> String {
        json(&self.config)
    }

    fn to_human(&self) -> String {
        self.config
            .entries()
            .into_iter()
            .map(|(key, value, source)| format!("{} = {} ({})", key, value, source))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn config_show(config: ResolvedConfig) -> ConfigShowResult {
    ConfigShowResult { config }
}

#[derive(Serialize)]
pub struct ConfigGetResult {
    pub key: String,
    pub value: Option<String>,
    pub source: ValueSource,
}

impl Output for ConfigGetResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match &self.value {
            Some(value) => value.clone(),
            None => format!("{} is not set", self.key),
        }
    }
}

/// Value of `key` in the config file at `path`.
pub fn config_get(path: &Path, key: &str, source: ValueSource) -> Result<ConfigGetResult> {
    check_key(key)?;
    let config = TestifyConfig::load(path)?;
    Ok(ConfigGetResult {
        key: key.to_string(),
        value: config.get(key),
        source,
    })
}

#[derive(Serialize)]
pub struct ConfigSetResult {
    pub key: String,
    pub value: String,
    pub path: String,
}

impl Output for ConfigSetResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Set {} = {} in {}", self.key, self.value, self.path)
    }
}

/// Set `key` in the config file at `path`, creating it if needed.
pub fn config_set(path: &Path, key: &str, value: &str) -> Result<ConfigSetResult> {
    let mut config = TestifyConfig::load(path)?;
    config.set(key, value)?;
    config.save(path)?;
    tracing::info!(key, path = %path.display(), "config updated");
    Ok(ConfigSetResult {
        key: key.to_string(),
        value: value.to_string(),
        path: path.display().to_string(),
    })
}

fn check_key(key: &str) -> Result<()> {
    if CONFIG_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "unknown config key '{}' (expected one of: {})",
            key,
            CONFIG_KEYS.join(", ")
        )))
    }
}
