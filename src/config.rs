use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path, path::PathBuf, time::Duration};

use crate::{
    mini_app::{MiniAppKind, VisualConfiguration},
    HubError, HubResult,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Kinds instantiated by the loader, in list order.
    #[serde(default = "default_mini_apps")]
    pub mini_apps: Vec<MiniAppKind>,

    /// How many times the kind list is instantiated.
    #[serde(default = "default_load_iterations")]
    pub load_iterations: usize,

    #[serde(default)]
    pub default_visual: VisualConfiguration,

    #[serde(default)]
    pub icon_dir: Option<PathBuf>,

    #[serde(default)]
    pub guess_number: GuessNumberConfig,

    #[serde(default)]
    pub time_zone: TimeZoneConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuessNumberConfig {
    #[serde(default = "default_guess_min")]
    pub min: u32,
    #[serde(default = "default_guess_max")]
    pub max: u32,
}

impl Default for GuessNumberConfig {
    fn default() -> Self {
        Self {
            min: default_guess_min(),
            max: default_guess_max(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeZoneConfig {
    #[serde(default = "default_refresh_interval", with = "duration_ms")]
    pub refresh_interval: Duration,

    #[serde(default = "default_reference_cities")]
    pub reference_cities: Vec<CityConfig>,

    /// Where the bundled location provider places the device. `None` means
    /// location access is denied.
    #[serde(default = "default_location")]
    pub location: Option<CityConfig>,
}

impl Default for TimeZoneConfig {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            reference_cities: default_reference_cities(),
            location: default_location(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CityConfig {
    pub name: String,
    /// Offset from UTC, in minutes.
    pub utc_offset_minutes: i32,
}

impl CityConfig {
    pub fn new<S: Into<String>>(name: S, utc_offset_minutes: i32) -> Self {
        Self {
            name: name.into(),
            utc_offset_minutes,
        }
    }
}

pub fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> HubResult<T> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .map_err(|e| HubError::Config(format!("Failed to parse config file: {}", e)))?;
    Ok(config)
}

pub fn from_str<T: for<'de> Deserialize<'de>>(s: &str) -> HubResult<T> {
    let config = serde_json::from_str(s)
        .map_err(|e| HubError::Config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

fn default_mini_apps() -> Vec<MiniAppKind> {
    vec![MiniAppKind::GuessNumber, MiniAppKind::TimeZone]
}

fn default_load_iterations() -> usize {
    1
}

fn default_guess_min() -> u32 {
    1
}

fn default_guess_max() -> u32 {
    100
}

fn default_refresh_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_reference_cities() -> Vec<CityConfig> {
    vec![
        CityConfig::new("London", 0),
        CityConfig::new("New York", -5 * 60),
        CityConfig::new("Tokyo", 9 * 60),
        CityConfig::new("Sydney", 10 * 60),
        CityConfig::new("Moscow", 3 * 60),
    ]
}

fn default_location() -> Option<CityConfig> {
    Some(CityConfig::new("Local", 0))
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            mini_apps: default_mini_apps(),
            load_iterations: default_load_iterations(),
            default_visual: VisualConfiguration::default(),
            icon_dir: None,
            guess_number: GuessNumberConfig::default(),
            time_zone: TimeZoneConfig::default(),
        }
    }
}

impl HubConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> HubResult<Self> {
        let config: Self = from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> HubResult<()> {
        if self.guess_number.min > self.guess_number.max {
            return Err(HubError::Config(format!(
                "guess_number.min ({}) must not exceed guess_number.max ({})",
                self.guess_number.min, self.guess_number.max
            )));
        }
        if self.time_zone.refresh_interval.is_zero() {
            return Err(HubError::Config(
                "time_zone.refresh_interval must be greater than 0".to_string(),
            ));
        }
        if self.time_zone.reference_cities.is_empty() {
            return Err(HubError::Config(
                "time_zone.reference_cities must list at least one city".to_string(),
            ));
        }
        Ok(())
    }
}
