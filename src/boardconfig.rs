use std::path::Path;

use config_file::FromConfigFile;
use serde::Deserialize;

/// Bus identifiers for the demo board plus the scroll message. The
/// identifiers are opaque to this program; they are handed verbatim to the
/// peripheral backend. Defaults match the Rainbow HAT on a Raspberry Pi.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub i2c_bus: String,
    pub spi_bus: String,
    pub led_gpio_pin: String,
    pub speaker_pwm_pin: String,
    pub message: String,
}

impl Default for BoardConfig {
    fn default() -> BoardConfig {
        BoardConfig {
            i2c_bus: "I2C1".to_string(),
            spi_bus: "SPI0.0".to_string(),
            led_gpio_pin: "BCM6".to_string(),
            speaker_pwm_pin: "PWM1".to_string(),
            message: "HomeAway Traveler Android".to_string(),
        }
    }
}

impl BoardConfig {
    pub fn load(path: Option<&Path>) -> Result<BoardConfig, String> {
        match path {
            Some(path) => BoardConfig::from_config_file(path).map_err(|err| err.to_string()),
            None => Ok(BoardConfig::default()),
        }
    }
}
