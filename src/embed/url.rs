//! Frame source URLs.
//!
//! The hosted views are configured entirely through their URL:
//! `{base}/carousel/{space}?theme=&autoplay=&delay=&slidesPerView=` and
//! `{base}/wall/{space}?theme=&columns=`. This module builds those URLs,
//! rewrites the theme of an existing one, and reads one back the way the
//! hosted view does.

use serde::Serialize;
use serde_json::Value;
use percent_encoding::percent_decode_str;
use url::Url;

use super::config::{EmbedConfig, EmbedMode, SlidesPerView, Theme};
use crate::{Error, Result};

/// Build the iframe source for `space_name` in `mode`.
///
/// Any path already on `base` is kept as the prefix. Its query and fragment
/// are dropped and the query is rebuilt from exactly the mode's keys.
pub fn frame_src(
    base: &Url,
    mode: EmbedMode,
    space_name: &str,
    config: &EmbedConfig,
) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::InvalidInput(format!("embed base URL cannot hold a path: {}", base)))?
        .pop_if_empty()
        .push(mode.as_str())
        .push(space_name);
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .extend_pairs(config.query_pairs(mode));
    Ok(url)
}

/// Return `src` with its `theme` parameter set to `theme`.
///
/// The first `theme` pair is replaced in place and later duplicates dropped;
/// if there was none it is appended. Other parameters keep their order.
pub fn with_theme(src: &str, theme: &Theme) -> Result<String> {
    let mut url = Url::parse(src)?;
    let mut replaced = false;
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter_map(|(key, value)| {
            if key != "theme" {
                return Some((key.into_owned(), value.into_owned()));
            }
            if replaced {
                return None;
            }
            replaced = true;
            Some((key.into_owned(), theme.to_string()))
        })
        .collect();
    if !replaced {
        pairs.push(("theme".to_string(), theme.to_string()));
    }
    url.query_pairs_mut().clear().extend_pairs(pairs);
    Ok(url.into())
}

/// A frame source URL taken apart again.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedSource {
    /// Everything before `/{mode}/{space}`
    pub base_url: String,
    pub mode: EmbedMode,
    pub space_name: String,
    pub iframe_id: String,
    /// Mode defaults overlaid with the query parameters present
    pub config: EmbedConfig,
}

impl EmbedSource {
    pub fn parse(src: &str) -> Result<Self> {
        let url = Url::parse(src)?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let [prefix @ .., mode, space] = segments.as_slice() else {
            return Err(Error::InvalidEmbedUrl(format!(
                "expected /{{mode}}/{{space}} at the end of {}",
                src
            )));
        };
        let mode = EmbedMode::parse(mode)
            .ok_or_else(|| Error::InvalidEmbedUrl(format!("unknown embed mode '{}'", mode)))?;
        let space_name = decode_segment(space);

        let mut base = url.clone();
        base.set_query(None);
        base.set_fragment(None);
        base.set_path(&prefix.join("/"));

        let mut config = EmbedConfig::defaults(mode);
        for (key, value) in url.query_pairs() {
            apply_query_pair(&mut config, mode, &key, &value)?;
        }

        Ok(Self {
            base_url: base.as_str().trim_end_matches('/').to_string(),
            iframe_id: mode.iframe_id(&space_name),
            mode,
            space_name,
            config,
        })
    }
}

fn apply_query_pair(
    config: &mut EmbedConfig,
    mode: EmbedMode,
    key: &str,
    value: &str,
) -> Result<()> {
    let invalid = || Error::InvalidEmbedUrl(format!("invalid value for '{}': {}", key, value));
    if !mode.query_keys().contains(&key) {
        config
            .extra
            .insert(key.to_string(), Value::String(value.to_string()));
        return Ok(());
    }
    match key {
        "theme" => config.theme = Theme::parse(value),
        "autoplay" => config.autoplay = Some(value.parse().map_err(|_| invalid())?),
        "delay" => config.delay = Some(value.parse().map_err(|_| invalid())?),
        "slidesPerView" => {
            config.slides_per_view = Some(SlidesPerView::parse(value).ok_or_else(invalid)?)
        }
        "columns" => config.columns = Some(value.parse().map_err(|_| invalid())?),
        _ => {}
    }
    Ok(())
}

/// Percent-decode one path segment. `+` is literal in paths.
fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}
