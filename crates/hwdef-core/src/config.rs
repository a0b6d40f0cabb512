//! Scraper configuration
//!
//! Everything the parser treats as reference data (known chip identifiers,
//! priority boards, file names, limits) lives here and is injected into the
//! scraper. The defaults reproduce the stock behaviour; a TOML file can
//! override any field.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::include::DEFAULT_MAX_INCLUDE_DEPTH;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Board definition file inside each board folder
    #[serde(default = "default_definition_file")]
    pub definition_file: String,
    /// Optional parameter defaults file inside each board folder
    #[serde(default = "default_defaults_file")]
    pub defaults_file: String,
    /// Folder-name suffix marking bootloader-only definitions
    #[serde(default = "default_bootloader_suffix")]
    pub bootloader_suffix: String,
    #[serde(default = "default_max_include_depth")]
    pub max_include_depth: usize,
    /// Leading comment lines kept as the header
    #[serde(default = "default_header_comment_lines")]
    pub header_comment_lines: usize,
    #[serde(default = "default_priority_boards")]
    pub priority_boards: BTreeSet<String>,
    #[serde(default)]
    pub chips: ChipCatalog,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            definition_file: default_definition_file(),
            defaults_file: default_defaults_file(),
            bootloader_suffix: default_bootloader_suffix(),
            max_include_depth: default_max_include_depth(),
            header_comment_lines: default_header_comment_lines(),
            priority_boards: default_priority_boards(),
            chips: ChipCatalog::default(),
        }
    }
}

fn default_definition_file() -> String {
    "hwdef.dat".to_string()
}

fn default_defaults_file() -> String {
    "defaults.parm".to_string()
}

fn default_bootloader_suffix() -> String {
    "-bl".to_string()
}

fn default_max_include_depth() -> usize {
    DEFAULT_MAX_INCLUDE_DEPTH
}

fn default_header_comment_lines() -> usize {
    10
}

fn default_priority_boards() -> BTreeSet<String> {
    [
        "fmuv3", "fmuv5", "fmuv6x", "fmuv6c",
        "CubeBlack", "CubeOrange", "CubeOrangePlus",
        "Pixhawk1", "Pixhawk4", "Pixhawk6X", "Pixhawk6C",
        "MatekF405-Wing", "MatekF405-TE", "MatekF405-STD", "MatekF765-Wing",
        "MatekH743", "MatekH743-Mini", "MatekH743-Slim",
        "KakuteF4", "KakuteF7", "KakuteH7", "KakuteH7Mini", "KakuteH7-Wing",
        "SpeedyBeeF405v3", "SpeedyBeeF405v4", "SpeedyBeeF405Wing", "SpeedyBeeF405Mini",
        "JHEMCU-GSF405A", "JHEMCU-GF16-F405",
        "FoxeerF745V2", "FoxeerReaperF745AIO",
        "mRoControlZeroH7", "mRoPixracerPro",
        "BlitzF745AIO",
        "omnibusf4pro",
        "MambaF405v2", "MambaH743v4",
        "FlywooF745", "FlywooF405S-AIO",
        "BetaFPV-F405", "BetaFPV-F745",
        "NxtPX4v2",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Known chip identifiers per sensor category.
///
/// Lists are ordered: the first identifier contained in a device name wins,
/// so more specific names come before their prefixes (`hmc5883l` before
/// `hmc5883`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipCatalog {
    #[serde(default = "default_imu_chips")]
    pub imu: Vec<String>,
    #[serde(default = "default_baro_chips")]
    pub barometer: Vec<String>,
    #[serde(default = "default_compass_chips")]
    pub compass: Vec<String>,
    #[serde(default = "default_osd_chips")]
    pub osd: Vec<String>,
    #[serde(default = "default_flash_chips")]
    pub flash: Vec<String>,
    /// OSD assumed present when `HAL_OSD_TYPE_DEFAULT` is 1
    #[serde(default = "default_osd")]
    pub default_osd: String,
}

impl Default for ChipCatalog {
    fn default() -> Self {
        Self {
            imu: default_imu_chips(),
            barometer: default_baro_chips(),
            compass: default_compass_chips(),
            osd: default_osd_chips(),
            flash: default_flash_chips(),
            default_osd: default_osd(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_imu_chips() -> Vec<String> {
    strings(&[
        "mpu6000", "mpu6500", "mpu9250",
        "icm20602", "icm20608", "icm20689", "icm20948",
        "icm40609", "icm42605", "icm42670", "icm42688",
        "icm45686",
        "bmi055", "bmi088", "bmi270",
        "lsm9ds1", "lsm6dsl", "lsm6dsrx",
        "adis16470", "adis16507",
        "iam20680",
        "iim42652",
        // a compass, but some boards wire it next to the IMUs on SPI
        "qmc5883l",
    ])
}

fn default_baro_chips() -> Vec<String> {
    strings(&[
        "bmp280", "bmp388", "bmp390", "bmp581",
        "dps310",
        "ms5611", "ms5607",
        "spl06",
        "icp101xx", "icp201xx",
        "lps22h", "lps25h",
        "2smpb",
    ])
}

fn default_compass_chips() -> Vec<String> {
    strings(&[
        "ist8310", "ist8308",
        "hmc5843", "hmc5883l", "hmc5883",
        "qmc5883l", "qmc5883",
        "lis3mdl",
        "ak8963", "ak09916",
        "rm3100",
        "mmc3416", "mmc5603", "mmc5983",
        "bmm150", "bmm350",
    ])
}

fn default_osd_chips() -> Vec<String> {
    strings(&["max7456", "at7456e", "at7456"])
}

fn default_flash_chips() -> Vec<String> {
    strings(&[
        "w25q128", "w25q256", "w25q64", "w25q32", "w25q16",
        "w25n01g", "w25n02g", "w25n512g",
        "m25p16",
        "gd25q16", "gd25q32", "gd25q64",
        "at25sf161",
        "is25lp016d",
    ])
}

fn default_osd() -> String {
    "MAX7456".to_string()
}

impl ScraperConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `path` if it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let config = Self::from_file(path)?;
            info!(path = %path.display(), "Loaded configuration");
            Ok(config)
        } else {
            info!(path = %path.display(), "Configuration file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn is_priority(&self, folder_name: &str) -> bool {
        self.priority_boards.contains(folder_name)
    }

    pub fn is_bootloader(&self, folder_name: &str) -> bool {
        !self.bootloader_suffix.is_empty() && folder_name.ends_with(&self.bootloader_suffix)
    }
}
