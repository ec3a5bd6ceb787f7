use palette::Srgb;

use crate::peripherals::{
    AlphanumericDisplay, Board, GpioDirection, LedStrip, Speaker, StatusLed,
};

/// Peripheral backend that logs every driver call instead of touching
/// hardware, so the demo runs on any machine. Real driver bindings plug in
/// behind the same Board trait.
pub struct SimBoard;

impl SimBoard {
    pub fn new() -> SimBoard {
        SimBoard
    }
}

impl Board for SimBoard {
    fn open_display(&self, i2c_bus: &str) -> Result<Box<dyn AlphanumericDisplay>, String> {
        log::info!("Opening display on {i2c_bus}");
        Ok(Box::new(SimDisplay {
            bus: i2c_bus.to_string(),
        }))
    }

    fn open_led_strip(&self, spi_bus: &str) -> Result<Box<dyn LedStrip>, String> {
        log::info!("Opening ledstrip on {spi_bus}");
        Ok(Box::new(SimLedStrip {
            bus: spi_bus.to_string(),
        }))
    }

    fn open_status_led(&self, gpio_pin: &str) -> Result<Box<dyn StatusLed>, String> {
        log::info!("Opening status LED on {gpio_pin}");
        Ok(Box::new(SimStatusLed {
            pin: gpio_pin.to_string(),
        }))
    }

    fn open_speaker(&self, pwm_pin: &str) -> Result<Box<dyn Speaker>, String> {
        log::info!("Opening speaker on {pwm_pin}");
        Ok(Box::new(SimSpeaker {
            pin: pwm_pin.to_string(),
        }))
    }
}

struct SimDisplay {
    bus: String,
}

impl AlphanumericDisplay for SimDisplay {
    fn set_enabled(&mut self, enabled: bool) -> Result<(), String> {
        log::debug!("display[{}]: enabled = {enabled}", self.bus);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), String> {
        log::debug!("display[{}]: clear", self.bus);
        Ok(())
    }

    fn write(&mut self, text: &str) -> Result<(), String> {
        log::info!("display[{}]: {text}", self.bus);
        Ok(())
    }

    fn close(&mut self) -> Result<(), String> {
        log::debug!("display[{}]: close", self.bus);
        Ok(())
    }
}

struct SimLedStrip {
    bus: String,
}

impl LedStrip for SimLedStrip {
    fn set_brightness(&mut self, level: u8) -> Result<(), String> {
        log::debug!("ledstrip[{}]: brightness = {level}", self.bus);
        Ok(())
    }

    fn write(&mut self, frame: &[Srgb<u8>]) -> Result<(), String> {
        let pixels: Vec<(u8, u8, u8)> = frame
            .iter()
            .map(|color| (color.red, color.green, color.blue))
            .collect();
        log::debug!("ledstrip[{}]: {pixels:?}", self.bus);
        Ok(())
    }

    fn close(&mut self) -> Result<(), String> {
        log::debug!("ledstrip[{}]: close", self.bus);
        Ok(())
    }
}

struct SimStatusLed {
    pin: String,
}

impl StatusLed for SimStatusLed {
    fn set_direction(&mut self, direction: GpioDirection) -> Result<(), String> {
        log::debug!("gpio[{}]: direction = {direction:?}", self.pin);
        Ok(())
    }

    fn set_value(&mut self, on: bool) -> Result<(), String> {
        log::debug!("gpio[{}]: value = {on}", self.pin);
        Ok(())
    }

    fn close(&mut self) -> Result<(), String> {
        log::debug!("gpio[{}]: close", self.pin);
        Ok(())
    }
}

struct SimSpeaker {
    pin: String,
}

impl Speaker for SimSpeaker {
    fn play(&mut self, frequency_hz: f32) -> Result<(), String> {
        log::debug!("speaker[{}]: play {frequency_hz:.0} Hz", self.pin);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), String> {
        log::debug!("speaker[{}]: stop", self.pin);
        Ok(())
    }

    fn close(&mut self) -> Result<(), String> {
        log::debug!("speaker[{}]: close", self.pin);
        Ok(())
    }
}
