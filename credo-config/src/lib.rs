//! Loader for Credo configuration with YAML + environment overlays.
//!
//! Every field has a usable default, so a config file is optional: a bare
//! environment with `YOUTUBE_API_KEY` set is enough to run a crawl.
//! Precedence is file < environment overrides of the form
//! `CREDO__SECTION__FIELD` (`CREDO__CRAWL__MAX_CHANNELS=3`), and string
//! values may reference environment variables with `${VAR}` placeholders.
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct CredoConfig {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub youtube: YoutubeSettings,
    #[serde(default)]
    pub crawl: CrawlSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

/// Credentials and query knobs for the YouTube Data API.
#[derive(Debug, Serialize, Deserialize)]
pub struct YoutubeSettings {
    /// API key, injected at client construction (never ambient state).
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// Ordering mode for the recent-video search. The upstream service
    /// accepts this verbatim; `date` means newest-first.
    #[serde(default = "default_video_order")]
    pub video_order: String,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            video_order: default_video_order(),
        }
    }
}

impl YoutubeSettings {
    /// The API key, or `None` when it is empty or an unexpanded `${VAR}`
    /// placeholder (i.e. the variable was never set).
    pub fn resolved_api_key(&self) -> Option<&str> {
        let key = self.api_key.trim();
        if key.is_empty() || key.contains("${") {
            None
        } else {
            Some(key)
        }
    }
}

/// Defaults for the crawl itself; the CLI and TUI may override topic and
/// keywords per run.
#[derive(Debug, Serialize, Deserialize)]
pub struct CrawlSettings {
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_max_channels")]
    pub max_channels: u32,
    #[serde(default = "default_videos_per_channel")]
    pub videos_per_channel: u32,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            keywords: default_keywords(),
            max_channels: default_max_channels(),
            videos_per_channel: default_videos_per_channel(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportSettings {
    #[serde(default = "default_report_path")]
    pub path: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            path: default_report_path(),
        }
    }
}

fn default_api_key() -> String {
    "${YOUTUBE_API_KEY}".into()
}
fn default_video_order() -> String {
    "date".into()
}
fn default_topic() -> String {
    "personal finance".into()
}
fn default_keywords() -> Vec<String> {
    ["money", "investing", "wealth"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_max_channels() -> u32 {
    5
}
fn default_videos_per_channel() -> u32 {
    5
}
fn default_report_path() -> String {
    "creators.csv".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct CredoConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for CredoConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CredoConfigLoader {
    /// Start with the defaults: no file yet. `CREDO__SECTION__FIELD` env
    /// overrides are layered on top of any files at [`load`] time.
    ///
    /// ```
    /// use credo_config::CredoConfigLoader;
    ///
    /// let cfg = CredoConfigLoader::new().load().expect("defaults load");
    /// assert_eq!(cfg.crawl.max_channels, 5);
    /// assert_eq!(cfg.report.path, "creators.csv");
    /// ```
    ///
    /// [`load`]: CredoConfigLoader::load
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers the format
    /// by suffix. The file must exist.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Merge an inline YAML snippet (used by tests and the CLI).
    ///
    /// ```
    /// use credo_config::CredoConfigLoader;
    ///
    /// let cfg = CredoConfigLoader::new()
    ///     .with_yaml_str("crawl:\n  topic: woodworking\n  max_channels: 3")
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.crawl.topic, "woodworking");
    /// assert_eq!(cfg.crawl.max_channels, 3);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources. The
    /// environment source goes in last so `CREDO__*` always beats the file.
    ///
    /// `${VAR}` placeholders are expanded (recursively, with a depth cap)
    /// after field defaults are filled in, so defaults that are themselves
    /// placeholders, like the API key, resolve too.
    pub fn load(self) -> Result<CredoConfig, ConfigError> {
        // Env values arrive as strings; parse numerics and split the
        // keyword list on commas so overrides deserialize cleanly.
        let env = Environment::with_prefix("CREDO")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("crawl.keywords");
        let cfg = self.builder.add_source(env).build()?;

        let v: Value = cfg.try_deserialize()?;
        let typed: CredoConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        let mut v =
            serde_json::to_value(&typed).map_err(|e| ConfigError::Message(e.to_string()))?;
        expand_env_in_value(&mut v);
        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("TOPIC", Some("finance")), ("KW", Some("money"))], || {
            let mut v = json!([
                "crawl-$TOPIC",
                { "keywords": "${KW},${TOPIC}" },
                5,
                true,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["crawl-finance", { "keywords": "money,finance" }, 5, true, null])
            );
        });
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            // Only termination matters here; the cycle cannot resolve.
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }

    #[test]
    fn unexpanded_api_key_reads_as_missing() {
        let settings = YoutubeSettings {
            api_key: "${YOUTUBE_API_KEY}".into(),
            video_order: "date".into(),
        };
        assert_eq!(settings.resolved_api_key(), None);

        let settings = YoutubeSettings {
            api_key: "AIzaExample".into(),
            video_order: "date".into(),
        };
        assert_eq!(settings.resolved_api_key(), Some("AIzaExample"));
    }
}
