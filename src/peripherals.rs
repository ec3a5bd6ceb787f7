use palette::Srgb;

/// Direction configuration for a GPIO output line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GpioDirection {
    OutInitiallyLow,
    OutInitiallyHigh,
}

pub trait AlphanumericDisplay {
    fn set_enabled(&mut self, enabled: bool) -> Result<(), String>;
    fn clear(&mut self) -> Result<(), String>;
    fn write(&mut self, text: &str) -> Result<(), String>;
    fn close(&mut self) -> Result<(), String>;
}

pub trait LedStrip {
    fn set_brightness(&mut self, level: u8) -> Result<(), String>;
    fn write(&mut self, frame: &[Srgb<u8>]) -> Result<(), String>;
    fn close(&mut self) -> Result<(), String>;
}

pub trait StatusLed {
    fn set_direction(&mut self, direction: GpioDirection) -> Result<(), String>;
    fn set_value(&mut self, on: bool) -> Result<(), String>;
    fn close(&mut self) -> Result<(), String>;
}

pub trait Speaker {
    fn play(&mut self, frequency_hz: f32) -> Result<(), String>;
    fn stop(&mut self) -> Result<(), String>;
    fn close(&mut self) -> Result<(), String>;
}

/// Factory for the four peripheral connections. Bus identifiers are opaque
/// strings taken from the board configuration.
pub trait Board {
    fn open_display(&self, i2c_bus: &str) -> Result<Box<dyn AlphanumericDisplay>, String>;
    fn open_led_strip(&self, spi_bus: &str) -> Result<Box<dyn LedStrip>, String>;
    fn open_status_led(&self, gpio_pin: &str) -> Result<Box<dyn StatusLed>, String>;
    fn open_speaker(&self, pwm_pin: &str) -> Result<Box<dyn Speaker>, String>;
}

/// An optional peripheral. Disabled is a stable state: a device that failed
/// to open stays disabled for the lifetime of the station.
pub enum Feature<T> {
    Enabled(T),
    Disabled,
}

impl<T> Feature<T> {
    pub fn as_mut(&mut self) -> Option<&mut T> {
        match self {
            Feature::Enabled(device) => Some(device),
            Feature::Disabled => None,
        }
    }

    /// Takes the device out, leaving Disabled behind. Guarantees a handle is
    /// released at most once even if teardown runs twice.
    pub fn take(&mut self) -> Feature<T> {
        std::mem::replace(self, Feature::Disabled)
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Feature::Enabled(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_take_leaves_disabled() {
        let mut feature = Feature::Enabled(42);
        assert!(feature.is_enabled());

        let taken = feature.take();
        assert!(taken.is_enabled());
        assert!(!feature.is_enabled());

        // A second take yields nothing.
        assert!(!feature.take().is_enabled());
    }

    #[test]
    fn feature_as_mut_on_disabled_is_none() {
        let mut feature: Feature<i32> = Feature::Disabled;
        assert!(feature.as_mut().is_none());
    }
}
