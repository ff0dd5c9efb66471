use crate::action::ActionContext;
use crate::domain::rules::DEFAULT_BREAKING_MARKER;
use crate::domain::{RulePreset, RuleSet, SelectionMode, SemanticVersion, TagPolicy};
use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "release.toml";
pub const USER_CONFIG_FILE_NAME: &str = "conventional-release.toml";

pub const INIT_VERSION_INPUT: &str = "init-version";
pub const TAG_PREFIX_INPUT: &str = "tag-prefix";
pub const ASSETS_INPUT: &str = "assets";

/// Represents the complete configuration for conventional-release.
///
/// Contains version baseline settings, release selection policy, commit
/// classification rules, and asset patterns for the publish phase.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub version: VersionConfig,

    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub assets: AssetsConfig,
}

fn default_init_version() -> String {
    "0.0.0".to_string()
}

fn default_tag_prefix() -> String {
    "v".to_string()
}

fn default_max_release_pages() -> u32 {
    10
}

fn default_breaking_marker() -> String {
    DEFAULT_BREAKING_MARKER.to_string()
}

/// Baseline version and tag naming.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VersionConfig {
    #[serde(default = "default_init_version")]
    pub init_version: String,

    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,
}

impl Default for VersionConfig {
    fn default() -> Self {
        VersionConfig {
            init_version: default_init_version(),
            tag_prefix: default_tag_prefix(),
        }
    }
}

/// How the current release is looked up.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReleaseConfig {
    #[serde(default)]
    pub selection: SelectionMode,

    /// Try the platform's "latest release" endpoint before listing all releases
    #[serde(default)]
    pub latest_release_shortcut: bool,

    #[serde(default = "default_max_release_pages")]
    pub max_release_pages: u32,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            selection: SelectionMode::default(),
            latest_release_shortcut: false,
            max_release_pages: default_max_release_pages(),
        }
    }
}

/// Commit classification rules.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RulesConfig {
    #[serde(default)]
    pub preset: RulePreset,

    #[serde(default = "default_breaking_marker")]
    pub breaking_marker: String,

    /// Additional subject patterns treated as patch-level changes
    #[serde(default)]
    pub extra_patch_patterns: Vec<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            preset: RulePreset::default(),
            breaking_marker: default_breaking_marker(),
            extra_patch_patterns: Vec::new(),
        }
    }
}

/// Files uploaded by the publish phase.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct AssetsConfig {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Config {
    /// Override file settings with pipeline inputs; blank inputs are ignored
    pub fn apply_inputs(&mut self, ctx: &ActionContext) {
        if let Some(init_version) = ctx.input(INIT_VERSION_INPUT) {
            self.version.init_version = init_version;
        }
        if let Some(tag_prefix) = ctx.input(TAG_PREFIX_INPUT) {
            self.version.tag_prefix = tag_prefix;
        }

        let assets = ctx.multiline_input(ASSETS_INPUT);
        if !assets.is_empty() {
            self.assets.patterns = assets;
        }
    }

    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        SemanticVersion::parse_bare(&self.version.init_version)?;
        self.rule_set()?;

        if self.release.max_release_pages == 0 {
            return Err(ReleaseError::config("release.max_release_pages must be at least 1"));
        }

        Ok(())
    }

    pub fn rule_set(&self) -> Result<RuleSet> {
        RuleSet::new(
            self.rules.preset,
            &self.rules.breaking_marker,
            &self.rules.extra_patch_patterns,
        )
    }

    pub fn tag_policy(&self) -> Result<TagPolicy> {
        TagPolicy::new(self.version.tag_prefix.clone(), self.release.selection)
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release.toml` in current directory
/// 3. `conventional-release.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Errors
/// [`ReleaseError::Config`] if a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let path = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };

    let Some(path) = path else {
        debug!("config: no configuration file, using defaults");
        return Ok(Config::default());
    };

    debug!("config: loading {}", path.display());

    let config_str = fs::read_to_string(&path)
        .map_err(|e| ReleaseError::config(format!("cannot read {}: {}", path.display(), e)))?;

    toml::from_str(&config_str)
        .map_err(|e| ReleaseError::config(format!("cannot parse {}: {}", path.display(), e)))
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(USER_CONFIG_FILE_NAME))
        .filter(|path| path.exists())
}
