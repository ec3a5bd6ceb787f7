use std::time::Duration;

use palette::Srgb;

use crate::boardconfig::BoardConfig;
use crate::displayscroller::DisplayScroller;
use crate::ledanimator::LedAnimator;
use crate::peripherals::{
    AlphanumericDisplay, Board, Feature, GpioDirection, LedStrip, Speaker, StatusLed,
};
use crate::rainbow;
use crate::scheduler::Scheduler;
use crate::speakersweep;

const LEDSTRIP_BRIGHTNESS: u8 = 1;
const LED_REFRESH_PERIOD_MS: u64 = 77;
const DISPLAY_SCROLL_PERIOD_MS: u64 = 777;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    LedRefresh,
    DisplayScroll,
    SpeakerSweep,
}

/// Owns the peripheral handles and the animation state. Display and ledstrip
/// are optional features; the status LED and the speaker are mandatory, so a
/// failure opening either aborts initialization.
pub struct Station {
    display: Feature<Box<dyn AlphanumericDisplay>>,
    ledstrip: Feature<Box<dyn LedStrip>>,
    status_led: Option<Box<dyn StatusLed>>,
    speaker: Option<Box<dyn Speaker>>,
    animator: LedAnimator,
    scroller: DisplayScroller,
}

impl Station {
    pub fn initialize(board: &dyn Board, config: &BoardConfig) -> Result<Station, String> {
        let display = open_display(board, &config.i2c_bus);
        let ledstrip = open_ledstrip(board, &config.spi_bus);

        let mut status_led = board
            .open_status_led(&config.led_gpio_pin)
            .map_err(|err| format!("Error initializing led: {err}"))?;
        status_led
            .set_direction(GpioDirection::OutInitiallyLow)
            .map_err(|err| format!("Error initializing led: {err}"))?;

        let speaker = board
            .open_speaker(&config.speaker_pwm_pin)
            .map_err(|err| format!("Error initializing speaker: {err}"))?;

        Ok(Station {
            display,
            ledstrip,
            status_led: Some(status_led),
            speaker: Some(speaker),
            animator: LedAnimator::new(rainbow::build_palette()),
            scroller: DisplayScroller::new(&config.message),
        })
    }

    /// Arms the periodic tasks plus the one-shot speaker sweep and drives the
    /// scheduler until it is stopped or a task escalates an error.
    pub fn run(&mut self, mut scheduler: Scheduler<Task>) -> Result<(), String> {
        scheduler.schedule_repeating(
            Task::LedRefresh,
            Duration::from_millis(LED_REFRESH_PERIOD_MS),
        );
        scheduler.schedule_repeating(
            Task::DisplayScroll,
            Duration::from_millis(DISPLAY_SCROLL_PERIOD_MS),
        );
        scheduler.schedule_once(
            Task::SpeakerSweep,
            Duration::from_millis(speakersweep::WARMUP_DELAY_MS),
        );

        scheduler.run(|task| self.dispatch(task))
    }

    fn dispatch(&mut self, task: Task) -> Result<(), String> {
        match task {
            Task::LedRefresh => {
                if let Some(strip) = self.ledstrip.as_mut() {
                    self.animator.tick(strip.as_mut());
                }
                Ok(())
            }
            Task::DisplayScroll => {
                if let Some(display) = self.display.as_mut() {
                    self.scroller.tick(display.as_mut());
                }
                Ok(())
            }
            Task::SpeakerSweep => match self.speaker.as_mut() {
                Some(speaker) => speakersweep::play(speaker.as_mut()),
                None => Ok(()),
            },
        }
    }

    /// Releases the handles in reverse open order. Failures are logged and
    /// swallowed; every handle is marked released exactly once either way.
    pub fn shutdown(&mut self) {
        if let Some(mut speaker) = self.speaker.take() {
            if let Err(err) = speaker.close() {
                log::warn!("Error closing speaker: {err}");
            }
        }

        if let Some(mut led) = self.status_led.take() {
            if let Err(err) = quiesce_status_led(led.as_mut()) {
                log::warn!("Error disabling led: {err}");
            }
        }

        if let Feature::Enabled(mut strip) = self.ledstrip.take() {
            if let Err(err) = quiesce_ledstrip(strip.as_mut()) {
                log::warn!("Error disabling ledstrip: {err}");
            }
        }

        if let Feature::Enabled(mut display) = self.display.take() {
            if let Err(err) = quiesce_display(display.as_mut()) {
                log::warn!("Error disabling display: {err}");
            }
        }
    }
}

fn open_display(board: &dyn Board, i2c_bus: &str) -> Feature<Box<dyn AlphanumericDisplay>> {
    let mut display = match board.open_display(i2c_bus) {
        Ok(display) => display,
        Err(err) => {
            log::warn!("Error initializing display: {err}");
            log::debug!("Display disabled");
            return Feature::Disabled;
        }
    };

    if let Err(err) = enable_display(display.as_mut()) {
        log::warn!("Error initializing display: {err}");
        log::debug!("Display disabled");
        return Feature::Disabled;
    }

    log::debug!("Initialized I2C display on {i2c_bus}");
    Feature::Enabled(display)
}

fn enable_display(display: &mut dyn AlphanumericDisplay) -> Result<(), String> {
    display.set_enabled(true)?;
    display.clear()
}

fn open_ledstrip(board: &dyn Board, spi_bus: &str) -> Feature<Box<dyn LedStrip>> {
    let mut strip = match board.open_led_strip(spi_bus) {
        Ok(strip) => strip,
        Err(err) => {
            log::warn!("Error initializing ledstrip: {err}");
            return Feature::Disabled;
        }
    };

    if let Err(err) = strip.set_brightness(LEDSTRIP_BRIGHTNESS) {
        log::warn!("Error initializing ledstrip: {err}");
        return Feature::Disabled;
    }

    log::debug!("Initialized SPI ledstrip on {spi_bus}");
    Feature::Enabled(strip)
}

fn quiesce_display(display: &mut dyn AlphanumericDisplay) -> Result<(), String> {
    display.clear()?;
    display.set_enabled(false)?;
    display.close()
}

fn quiesce_ledstrip(strip: &mut dyn LedStrip) -> Result<(), String> {
    strip.set_brightness(0)?;
    strip.write(&[Srgb::new(0u8, 0, 0); rainbow::PIXEL_COUNT])?;
    strip.close()
}

fn quiesce_status_led(led: &mut dyn StatusLed) -> Result<(), String> {
    led.set_value(false)?;
    led.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type CallLog = Rc<RefCell<Vec<String>>>;

    #[derive(Default)]
    struct MockBoard {
        calls: CallLog,
        fail_display: bool,
        fail_ledstrip: bool,
        fail_status_led: bool,
        fail_speaker: bool,
        ledstrip_brightness_fails: bool,
    }

    impl MockBoard {
        fn new() -> MockBoard {
            MockBoard::default()
        }
    }

    impl Board for MockBoard {
        fn open_display(&self, _: &str) -> Result<Box<dyn AlphanumericDisplay>, String> {
            if self.fail_display {
                return Err("no i2c device".to_string());
            }
            Ok(Box::new(MockDisplay {
                calls: Rc::clone(&self.calls),
            }))
        }

        fn open_led_strip(&self, _: &str) -> Result<Box<dyn LedStrip>, String> {
            if self.fail_ledstrip {
                return Err("no spi device".to_string());
            }
            Ok(Box::new(MockLedStrip {
                calls: Rc::clone(&self.calls),
                brightness_fails: self.ledstrip_brightness_fails,
            }))
        }

        fn open_status_led(&self, _: &str) -> Result<Box<dyn StatusLed>, String> {
            if self.fail_status_led {
                return Err("no gpio pin".to_string());
            }
            Ok(Box::new(MockStatusLed {
                calls: Rc::clone(&self.calls),
            }))
        }

        fn open_speaker(&self, _: &str) -> Result<Box<dyn Speaker>, String> {
            if self.fail_speaker {
                return Err("no pwm pin".to_string());
            }
            Ok(Box::new(MockSpeaker {
                calls: Rc::clone(&self.calls),
                play_fails: false,
            }))
        }
    }

    struct MockDisplay {
        calls: CallLog,
    }

    impl AlphanumericDisplay for MockDisplay {
        fn set_enabled(&mut self, enabled: bool) -> Result<(), String> {
            self.calls.borrow_mut().push(format!("display.enabled={enabled}"));
            Ok(())
        }

        fn clear(&mut self) -> Result<(), String> {
            self.calls.borrow_mut().push("display.clear".to_string());
            Ok(())
        }

        fn write(&mut self, text: &str) -> Result<(), String> {
            self.calls.borrow_mut().push(format!("display.write={text}"));
            Ok(())
        }

        fn close(&mut self) -> Result<(), String> {
            self.calls.borrow_mut().push("display.close".to_string());
            Ok(())
        }
    }

    struct MockLedStrip {
        calls: CallLog,
        brightness_fails: bool,
    }

    impl LedStrip for MockLedStrip {
        fn set_brightness(&mut self, level: u8) -> Result<(), String> {
            if self.brightness_fails && level == 0 {
                return Err("spi gone".to_string());
            }
            self.calls
                .borrow_mut()
                .push(format!("ledstrip.brightness={level}"));
            Ok(())
        }

        fn write(&mut self, _frame: &[Srgb<u8>]) -> Result<(), String> {
            self.calls.borrow_mut().push("ledstrip.write".to_string());
            Ok(())
        }

        fn close(&mut self) -> Result<(), String> {
            self.calls.borrow_mut().push("ledstrip.close".to_string());
            Ok(())
        }
    }

    struct MockStatusLed {
        calls: CallLog,
    }

    impl StatusLed for MockStatusLed {
        fn set_direction(&mut self, direction: GpioDirection) -> Result<(), String> {
            self.calls
                .borrow_mut()
                .push(format!("gpio.direction={direction:?}"));
            Ok(())
        }

        fn set_value(&mut self, on: bool) -> Result<(), String> {
            self.calls.borrow_mut().push(format!("gpio.value={on}"));
            Ok(())
        }

        fn close(&mut self) -> Result<(), String> {
            self.calls.borrow_mut().push("gpio.close".to_string());
            Ok(())
        }
    }

    struct MockSpeaker {
        calls: CallLog,
        play_fails: bool,
    }

    impl Speaker for MockSpeaker {
        fn play(&mut self, frequency_hz: f32) -> Result<(), String> {
            if self.play_fails {
                return Err("pwm gone".to_string());
            }
            self.calls
                .borrow_mut()
                .push(format!("speaker.play={frequency_hz:.0}"));
            Ok(())
        }

        fn stop(&mut self) -> Result<(), String> {
            self.calls.borrow_mut().push("speaker.stop".to_string());
            Ok(())
        }

        fn close(&mut self) -> Result<(), String> {
            self.calls.borrow_mut().push("speaker.close".to_string());
            Ok(())
        }
    }

    #[test]
    fn all_peripherals_open_on_a_healthy_board() {
        let board = MockBoard::new();
        let station = Station::initialize(&board, &BoardConfig::default()).unwrap();

        assert!(station.display.is_enabled());
        assert!(station.ledstrip.is_enabled());
        assert!(station.status_led.is_some());
        assert!(station.speaker.is_some());

        let calls = board.calls.borrow();
        assert!(calls.contains(&"display.enabled=true".to_string()));
        assert!(calls.contains(&"display.clear".to_string()));
        assert!(calls.contains(&"ledstrip.brightness=1".to_string()));
        assert!(calls.contains(&"gpio.direction=OutInitiallyLow".to_string()));
    }

    #[test]
    fn display_failure_degrades_to_disabled() {
        let mut board = MockBoard::new();
        board.fail_display = true;

        let station = Station::initialize(&board, &BoardConfig::default()).unwrap();
        assert!(!station.display.is_enabled());
        assert!(station.ledstrip.is_enabled());
    }

    #[test]
    fn ledstrip_failure_degrades_to_disabled() {
        let mut board = MockBoard::new();
        board.fail_ledstrip = true;

        let station = Station::initialize(&board, &BoardConfig::default()).unwrap();
        assert!(!station.ledstrip.is_enabled());
        assert!(station.display.is_enabled());
    }

    #[test]
    fn status_led_failure_is_fatal() {
        let mut board = MockBoard::new();
        board.fail_status_led = true;

        let result = Station::initialize(&board, &BoardConfig::default());
        assert!(result.is_err());
        assert!(result.err().unwrap().contains("Error initializing led"));
    }

    #[test]
    fn speaker_failure_is_fatal() {
        let mut board = MockBoard::new();
        board.fail_speaker = true;

        let result = Station::initialize(&board, &BoardConfig::default());
        assert!(result.is_err());
        assert!(result.err().unwrap().contains("Error initializing speaker"));
    }

    #[test]
    fn dispatch_skips_disabled_features() {
        let mut board = MockBoard::new();
        board.fail_display = true;
        board.fail_ledstrip = true;

        let mut station = Station::initialize(&board, &BoardConfig::default()).unwrap();
        board.calls.borrow_mut().clear();

        assert!(station.dispatch(Task::LedRefresh).is_ok());
        assert!(station.dispatch(Task::DisplayScroll).is_ok());

        // Nothing was written, and the animation never started.
        assert!(board.calls.borrow().is_empty());
        assert_eq!(station.animator.position(), 0);
    }

    #[test]
    fn dispatch_drives_animation_and_scroll() {
        let board = MockBoard::new();
        let mut station = Station::initialize(&board, &BoardConfig::default()).unwrap();

        assert!(station.dispatch(Task::LedRefresh).is_ok());
        assert!(station.dispatch(Task::DisplayScroll).is_ok());

        assert_eq!(station.animator.position(), 1);
        assert_eq!(station.scroller.offset(), 1);
        let calls = board.calls.borrow();
        assert!(calls.contains(&"ledstrip.write".to_string()));
        assert!(calls.iter().any(|call| call.starts_with("display.write=")));
    }

    #[test]
    fn speaker_sweep_failure_escalates_through_dispatch() {
        let board = MockBoard::new();
        let mut station = Station::initialize(&board, &BoardConfig::default()).unwrap();
        station.speaker = Some(Box::new(MockSpeaker {
            calls: Rc::clone(&board.calls),
            play_fails: true,
        }));

        let result = station.dispatch(Task::SpeakerSweep);
        assert_eq!(result, Err("pwm gone".to_string()));
    }

    #[test]
    fn shutdown_releases_in_reverse_order() {
        let board = MockBoard::new();
        let mut station = Station::initialize(&board, &BoardConfig::default()).unwrap();

        board.calls.borrow_mut().clear();
        station.shutdown();

        let calls = board.calls.borrow().clone();
        assert_eq!(
            calls,
            vec![
                "speaker.close".to_string(),
                "gpio.value=false".to_string(),
                "gpio.close".to_string(),
                "ledstrip.brightness=0".to_string(),
                "ledstrip.write".to_string(),
                "ledstrip.close".to_string(),
                "display.clear".to_string(),
                "display.enabled=false".to_string(),
                "display.close".to_string(),
            ]
        );
    }

    #[test]
    fn shutdown_is_idempotent() {
        let board = MockBoard::new();
        let mut station = Station::initialize(&board, &BoardConfig::default()).unwrap();

        station.shutdown();
        board.calls.borrow_mut().clear();
        station.shutdown();
        assert!(board.calls.borrow().is_empty());
    }

    #[test]
    fn teardown_failure_is_swallowed_and_the_rest_still_runs() {
        let mut board = MockBoard::new();
        board.ledstrip_brightness_fails = true;

        let mut station = Station::initialize(&board, &BoardConfig::default()).unwrap();
        board.calls.borrow_mut().clear();
        station.shutdown();

        let calls = board.calls.borrow().clone();
        // The ledstrip quiesce failed at brightness 0, the display teardown
        // still completed.
        assert!(!calls.contains(&"ledstrip.close".to_string()));
        assert!(calls.contains(&"display.close".to_string()));
        assert!(!station.ledstrip.is_enabled());
    }
}
