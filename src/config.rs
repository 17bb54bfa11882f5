//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--config`, `--no-mouse`, `--manifest`, etc.)
//! 2. `$STAGER_CONFIG` environment variable (path to config file)
//! 3. Project-local `.stager.toml` in the current working directory
//! 4. Global `~/.config/stager/config.toml`
//! 5. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::announce::DEFAULT_ANNOUNCEMENT_TTL;
use crate::navigation::DEFAULT_NAVIGATION_COOLDOWN;
use crate::staging::validate::{
    ValidationRules, DEFAULT_ACCEPTED, DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_SIZE_MB,
};

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable mouse support (click zones, thumbnail dragging).
    pub mouse: Option<bool>,
    /// Ask before deleting an attachment from the preview.
    pub confirm_delete: Option<bool>,
    /// Directory the "save" action writes attachments into.
    pub export_dir: Option<String>,
    /// Where submissions write their manifest.
    pub manifest_path: Option<String>,
}

/// Limits applied before files are staged.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StagingConfig {
    pub max_files: Option<usize>,
    pub max_file_size_mb: Option<u64>,
    /// Accept patterns: `image/*`, `.pdf`, or an exact mime type.
    pub accepted: Option<Vec<String>>,
}

/// Preview modal settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PreviewConfig {
    /// Minimum gap between two navigation steps, in milliseconds.
    pub navigation_cooldown_ms: Option<u64>,
    /// How long status announcements stay visible, in milliseconds.
    pub announcement_ttl_ms: Option<u64>,
    /// Decode the neighbours of the current image ahead of time.
    pub preload_adjacent: Option<bool>,
    /// Shade the left and right click zones of the image.
    pub show_click_sides: Option<bool>,
}

/// Color settings for a single theme palette.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeColorsConfig {
    pub list_fg: Option<String>,
    pub list_selected_bg: Option<String>,
    pub list_selected_fg: Option<String>,
    pub preview_bg: Option<String>,
    pub preview_fg: Option<String>,
    pub thumb_current_fg: Option<String>,
    pub thumb_picked_fg: Option<String>,
    pub status_bg: Option<String>,
    pub status_fg: Option<String>,
    pub border_fg: Option<String>,
    pub dialog_bg: Option<String>,
    pub dialog_border_fg: Option<String>,
}

/// Theme configuration section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark", "light", "custom".
    pub scheme: Option<String>,
    /// Custom color overrides.
    pub custom: Option<ThemeColorsConfig>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub staging: StagingConfig,
    pub preview: PreviewConfig,
    pub theme: ThemeConfig,
}

/// Default manifest file name, relative to the working directory.
pub const DEFAULT_MANIFEST_PATH: &str = "submission.json";

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path; that is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("STAGER_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".stager.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("stager").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (the parse error is logged).
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse config file");
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                mouse: other.general.mouse.or(self.general.mouse),
                confirm_delete: other.general.confirm_delete.or(self.general.confirm_delete),
                export_dir: other
                    .general
                    .export_dir
                    .clone()
                    .or(self.general.export_dir),
                manifest_path: other
                    .general
                    .manifest_path
                    .clone()
                    .or(self.general.manifest_path),
            },
            staging: StagingConfig {
                max_files: other.staging.max_files.or(self.staging.max_files),
                max_file_size_mb: other
                    .staging
                    .max_file_size_mb
                    .or(self.staging.max_file_size_mb),
                accepted: other.staging.accepted.clone().or(self.staging.accepted),
            },
            preview: PreviewConfig {
                navigation_cooldown_ms: other
                    .preview
                    .navigation_cooldown_ms
                    .or(self.preview.navigation_cooldown_ms),
                announcement_ttl_ms: other
                    .preview
                    .announcement_ttl_ms
                    .or(self.preview.announcement_ttl_ms),
                preload_adjacent: other
                    .preview
                    .preload_adjacent
                    .or(self.preview.preload_adjacent),
                show_click_sides: other
                    .preview
                    .show_click_sides
                    .or(self.preview.show_click_sides),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
                custom: match (&self.theme.custom, &other.theme.custom) {
                    (_, Some(o)) => Some(o.clone()),
                    (Some(s), None) => Some(s.clone()),
                    (None, None) => None,
                },
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Walk lowest priority first so higher sources overwrite.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(true)
    }

    pub fn confirm_delete(&self) -> bool {
        self.general.confirm_delete.unwrap_or(false)
    }

    pub fn export_dir(&self) -> PathBuf {
        PathBuf::from(self.general.export_dir.as_deref().unwrap_or("."))
    }

    pub fn manifest_path(&self) -> PathBuf {
        PathBuf::from(
            self.general
                .manifest_path
                .as_deref()
                .unwrap_or(DEFAULT_MANIFEST_PATH),
        )
    }

    pub fn max_files(&self) -> usize {
        self.staging.max_files.unwrap_or(DEFAULT_MAX_FILES)
    }

    pub fn max_file_size_mb(&self) -> u64 {
        self.staging.max_file_size_mb.unwrap_or(DEFAULT_MAX_FILE_SIZE_MB)
    }

    pub fn accepted(&self) -> Vec<String> {
        self.staging
            .accepted
            .clone()
            .unwrap_or_else(|| DEFAULT_ACCEPTED.iter().map(|s| s.to_string()).collect())
    }

    /// Validation limits assembled from the staging section.
    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules {
            max_files: self.max_files(),
            max_file_size_mb: self.max_file_size_mb(),
            accepted: self.accepted(),
        }
    }

    pub fn navigation_cooldown(&self) -> Duration {
        self.preview
            .navigation_cooldown_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_NAVIGATION_COOLDOWN)
    }

    pub fn announcement_ttl(&self) -> Duration {
        self.preview
            .announcement_ttl_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_ANNOUNCEMENT_TTL)
    }

    pub fn preload_adjacent(&self) -> bool {
        self.preview.preload_adjacent.unwrap_or(true)
    }

    pub fn show_click_sides(&self) -> bool {
        self.preview.show_click_sides.unwrap_or(false)
    }

    /// Theme scheme: "dark", "light", or "custom".
    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
