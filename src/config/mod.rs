use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Color, Size};
use crate::mask::{EditorType, GridDivisions};
use crate::picker::media::{MediaSource, MediaType, VideoQuality};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "lightpick";
const APP_CONFIG_FILE: &str = "config.json";

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("output size must be positive, got {width}x{height}")]
    InvalidOutputSize { width: u32, height: u32 },
    #[error("{field} must not be negative, got {value}")]
    NegativeValue { field: &'static str, value: f64 },
    #[error("at least one media type must be allowed")]
    NoAllowedTypes,
    #[error("at least one media source must be allowed")]
    NoAllowedSources,
}

/// Picker-wide capture settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub video_quality: VideoQuality,
}

/// Arrow directions the host may use when the sheet is shown as a popover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowDirections {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl ArrowDirections {
    pub const fn any() -> Self {
        Self {
            up: true,
            down: true,
            left: true,
            right: true,
        }
    }
}

impl Default for ArrowDirections {
    fn default() -> Self {
        Self::any()
    }
}

/// Strings shown by the source-selection sheet and the no-access notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerTexts {
    pub title: Option<String>,
    pub message: Option<String>,
    pub cancel_text: String,
    /// Camera button title when only video is allowed.
    pub shot_video_text: String,
    /// Camera button title when only photos are allowed.
    pub shot_photo_text: String,
    /// Camera button title when both photos and videos are allowed.
    pub shot_media_text: String,
    pub select_text: String,
    pub settings_text: String,
    pub permitted_arrow_directions: ArrowDirections,
    pub access_required_alert_title: Option<String>,
    pub access_required_alert_message: Option<String>,
}

impl Default for PickerTexts {
    fn default() -> Self {
        Self {
            title: Some("Select media".to_string()),
            message: None,
            cancel_text: "Cancel".to_string(),
            shot_video_text: "Record a video".to_string(),
            shot_photo_text: "Make a shot".to_string(),
            shot_media_text: "Record media".to_string(),
            select_text: "Select from library".to_string(),
            settings_text: "Settings".to_string(),
            permitted_arrow_directions: ArrowDirections::any(),
            access_required_alert_title: Some("Error".to_string()),
            access_required_alert_message: Some(
                "This app does not have access to required media. Please enable access in \
                 privacy settings clicking on a button below."
                    .to_string(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    /// `None` selects the platform system font.
    pub family: Option<String>,
    pub size: f64,
}

impl FontSpec {
    pub const fn system(size: f64) -> Self {
        Self { family: None, size }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::system(14.0)
    }
}

/// Appearance of the crop editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageEditorConfig {
    pub title: Option<String>,
    pub cancel_text: String,
    pub use_text: String,
    #[serde(with = "color_hex")]
    pub dim_color: Color,
    #[serde(with = "color_hex")]
    pub button_color: Color,
    #[serde(with = "color_hex")]
    pub title_color: Color,
    pub button_font: FontSpec,
    pub title_font: FontSpec,
    /// Gap between the container edge and the mask hole.
    pub hole_padding: f64,
    #[serde(with = "color_hex")]
    pub border_color: Color,
    pub border_width: f64,
    #[serde(with = "color_hex")]
    pub grid_color: Color,
    pub grid_width: f64,
}

impl Default for ImageEditorConfig {
    fn default() -> Self {
        Self {
            title: Some("Zoom and crop an image".to_string()),
            cancel_text: "Cancel".to_string(),
            use_text: "Use".to_string(),
            dim_color: Color::BLACK.with_alpha(0.66),
            button_color: Color::WHITE,
            title_color: Color::WHITE,
            button_font: FontSpec::system(14.0),
            title_font: FontSpec::system(20.0),
            hole_padding: 20.0,
            border_color: Color::WHITE,
            border_width: 1.5,
            grid_color: Color::WHITE.with_alpha(0.5),
            grid_width: 0.5,
        }
    }
}

/// Pixel size of the image handed back after editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSize {
    pub width: u32,
    pub height: u32,
}

impl OutputSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_positive(self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn as_size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

impl Default for OutputSize {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Everything a picker session reads; supplied once and never mutated while a session runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfiguration {
    pub global: GlobalConfig,
    pub picker: PickerTexts,
    pub image_editor: ImageEditorConfig,
    pub editor_type: EditorType,
    pub output_size: OutputSize,
    /// Grid separators for the rectangular editor; ignored by the profile editor.
    pub grid_divisions: GridDivisions,
    pub allowed_types: Vec<MediaType>,
    pub allowed_sources: Vec<MediaSource>,
}

impl Default for PickerConfiguration {
    fn default() -> Self {
        Self {
            global: GlobalConfig::default(),
            picker: PickerTexts::default(),
            image_editor: ImageEditorConfig::default(),
            editor_type: EditorType::default(),
            output_size: OutputSize::default(),
            grid_divisions: GridDivisions::default(),
            allowed_types: vec![MediaType::Video, MediaType::Photo],
            allowed_sources: vec![MediaSource::Camera, MediaSource::Library],
        }
    }
}

impl PickerConfiguration {
    pub fn allows_type(&self, media_type: MediaType) -> bool {
        self.allowed_types.contains(&media_type)
    }

    pub fn allows_source(&self, source: MediaSource) -> bool {
        self.allowed_sources.contains(&source)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.output_size.is_positive() {
            return Err(ConfigError::InvalidOutputSize {
                width: self.output_size.width,
                height: self.output_size.height,
            });
        }
        let editor = &self.image_editor;
        for (field, value) in [
            ("hole_padding", editor.hole_padding),
            ("border_width", editor.border_width),
            ("grid_width", editor.grid_width),
        ] {
            if value < 0.0 {
                return Err(ConfigError::NegativeValue { field, value });
            }
        }
        if self.allowed_types.is_empty() {
            return Err(ConfigError::NoAllowedTypes);
        }
        if self.allowed_sources.is_empty() {
            return Err(ConfigError::NoAllowedSources);
        }
        Ok(())
    }
}

mod color_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::geometry::Color;

    pub(super) fn serialize<S: Serializer>(
        color: &Color,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&color.to_hex())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Color, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// Loads `config.json` from the user config directory, falling back to defaults.
pub fn load_picker_config() -> PickerConfiguration {
    let (xdg_config_home, home) = config_env_dirs();
    load_picker_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_picker_config_with(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> PickerConfiguration {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return PickerConfiguration::default(),
    };
    if !path.exists() {
        return PickerConfiguration::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => parse_picker_config(&contents).unwrap_or_else(|err| {
            tracing::warn!(%err, ?path, "failed to load config.json; using defaults");
            PickerConfiguration::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            PickerConfiguration::default()
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigLoadError {
    #[error("invalid json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

pub(crate) fn parse_picker_config(contents: &str) -> Result<PickerConfiguration, ConfigLoadError> {
    let config: PickerConfiguration = serde_json::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
