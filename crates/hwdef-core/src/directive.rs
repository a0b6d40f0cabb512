//! Directive classification and the single-pass board builder
//!
//! Each non-comment line is classified into a [`Directive`] and then applied
//! to the board record by [`DirectiveProcessor`]. Unknown lines classify as
//! [`Directive::Ignored`]; malformed ones produce a [`DirectiveError`] that the
//! processor records as a diagnostic before moving on.

use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

use crate::board::{BoardDescription, OutputPin, SpiDevice, UartChannel};
use crate::config::ChipCatalog;
use crate::diagnostics::{Diagnostic, DiagnosticKind};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("{keyword} expects at least {expected} fields: {line}")]
    Arity {
        keyword: String,
        expected: usize,
        line: String,
    },
    #[error("invalid {marker}(...) marker: {line}")]
    InvalidMarker { marker: &'static str, line: String },
}

/// One classified definition line
#[derive(Debug, Clone, PartialEq)]
pub enum Directive<'a> {
    /// `MCU <class> <type>`
    Mcu { class: &'a str, variant: &'a str },
    /// `APJ_BOARD_ID <number|name>`
    BoardId(&'a str),
    FlashSizeKb(&'a str),
    OscillatorHz(&'a str),
    SerialOrder(Vec<&'a str>),
    I2cOrder(Vec<&'a str>),
    /// Pin line carrying a `PWM(n)` marker
    PwmOutput(OutputPin),
    SpiDev(SpiDevice),
    /// `<pin> BUZZER OUTPUT ...`
    Buzzer { pin: &'a str },
    /// `define <NAME> [value...]`, value verbatim
    Define { name: &'a str, value: &'a str },
    /// `SDIO` / `SDMMC`
    SdCard,
    /// `CANn_RX` / `CANn_TX` keyword
    CanPin(&'a str),
    /// `DMA_PRIORITY` / `DMA_NOSHARE`
    Dma,
    LedStrip { pin: &'a str },
    Undef(Vec<&'a str>),
    Ignored,
}

impl<'a> Directive<'a> {
    /// Classify a trimmed line
    pub fn parse(line: &'a str) -> Result<Self, DirectiveError> {
        if line.is_empty() || line.starts_with('#') {
            return Ok(Directive::Ignored);
        }

        let parts: Vec<&'a str> = line.split_whitespace().collect();
        let Some(&keyword) = parts.first() else {
            return Ok(Directive::Ignored);
        };
        let arity = |expected: usize| {
            if parts.len() < expected {
                Err(DirectiveError::Arity {
                    keyword: keyword.to_string(),
                    expected,
                    line: line.to_string(),
                })
            } else {
                Ok(())
            }
        };

        let directive = match keyword {
            "undef" => {
                arity(2)?;
                Directive::Undef(parts[1..].to_vec())
            }
            "MCU" => {
                arity(3)?;
                Directive::Mcu {
                    class: parts[1],
                    variant: parts[2],
                }
            }
            "APJ_BOARD_ID" => {
                arity(2)?;
                Directive::BoardId(parts[1])
            }
            "FLASH_SIZE_KB" => {
                arity(2)?;
                Directive::FlashSizeKb(parts[1])
            }
            "OSCILLATOR_HZ" => {
                arity(2)?;
                Directive::OscillatorHz(parts[1])
            }
            "SERIAL_ORDER" => Directive::SerialOrder(parts[1..].to_vec()),
            "I2C_ORDER" => Directive::I2cOrder(parts[1..].to_vec()),
            "define" => {
                arity(2)?;
                Directive::Define {
                    name: parts[1],
                    value: define_value(line),
                }
            }
            _ if parts.len() >= 4 && line.contains("PWM(") => Directive::PwmOutput(parse_output_pin(&parts, line)?),
            "SPIDEV" => {
                arity(3)?;
                Directive::SpiDev(SpiDevice {
                    name: parts[1].to_lowercase(),
                    bus: parts[2].to_string(),
                    devid: parts.get(3).copied().unwrap_or_default().to_string(),
                    cs: parts.get(4).copied().unwrap_or_default().to_string(),
                })
            }
            _ if parts.iter().take(2).any(|p| p.contains("BUZZER")) && line.contains("OUTPUT") => {
                Directive::Buzzer { pin: keyword }
            }
            "SDIO" | "SDMMC" => Directive::SdCard,
            _ if keyword.starts_with("CAN") && (keyword.contains("_RX") || keyword.contains("_TX")) => {
                Directive::CanPin(keyword)
            }
            "DMA_PRIORITY" | "DMA_NOSHARE" => Directive::Dma,
            _ if line.contains("LED")
                && line.contains("TIM")
                && !line.contains("PWM")
                && (line.contains("NEOPIXEL") || line.contains("LED_STRIP")) =>
            {
                Directive::LedStrip { pin: keyword }
            }
            _ if parts.len() >= 2
                && (keyword.contains("NEOPIXEL") || line.to_lowercase().contains("neopixel")) =>
            {
                Directive::LedStrip { pin: keyword }
            }
            _ => Directive::Ignored,
        };
        Ok(directive)
    }
}

/// `PA0 TIM2_CH1N TIM2 PWM(1) GPIO(50) BIDIR`
fn parse_output_pin(parts: &[&str], line: &str) -> Result<OutputPin, DirectiveError> {
    let number = marker_value(line, "PWM").ok_or_else(|| DirectiveError::InvalidMarker {
        marker: "PWM",
        line: line.to_string(),
    })?;
    let timer_channel = parts[1];
    let suffix = timer_channel.rsplit('_').next().unwrap_or_default();

    Ok(OutputPin {
        number,
        timer: parts[2].to_string(),
        timer_channel: timer_channel.to_string(),
        gpio: marker_value(line, "GPIO"),
        complementary: suffix.starts_with("CH") && suffix.ends_with('N'),
        bidir: line.contains("BIDIR"),
        pin: parts[0].to_string(),
    })
}

/// Number inside the first well-formed `NAME(<digits>)` marker
fn marker_value(line: &str, name: &str) -> Option<u32> {
    let open = format!("{}(", name);
    line.match_indices(&open).find_map(|(start, _)| {
        let rest = &line[start + open.len()..];
        let close = rest.find(')')?;
        let digits = &rest[..close];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    })
}

/// Everything after `define <NAME>`, untouched apart from outer whitespace
fn define_value(line: &str) -> &str {
    let after_keyword = line["define".len()..].trim_start();
    match after_keyword.find(char::is_whitespace) {
        Some(end) => after_keyword[end..].trim(),
        None => "",
    }
}

/// Leading digits after the `CAN` prefix (`CAN2_TX` -> 2)
fn can_index(keyword: &str) -> Option<u32> {
    let digits: String = keyword
        .strip_prefix("CAN")?
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Builder state for one board
#[derive(Debug)]
pub struct DirectiveProcessor<'c> {
    chips: &'c ChipCatalog,
    board: BoardDescription,
    spi_devices: Vec<SpiDevice>,
    undefs: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
}

/// Result of the directive pass, before post-processing
#[derive(Debug, Clone)]
pub struct ProcessedBoard {
    pub board: BoardDescription,
    pub spi_devices: Vec<SpiDevice>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'c> DirectiveProcessor<'c> {
    /// Start a pass that fills in `board`, matching chips against `chips`
    pub fn new(board: BoardDescription, chips: &'c ChipCatalog) -> Self {
        Self {
            chips,
            board,
            spi_devices: Vec::new(),
            undefs: HashSet::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Run the pass over a flattened line sequence
    pub fn process<S: AsRef<str>>(mut self, lines: &[S]) -> ProcessedBoard {
        for line in lines {
            self.apply_line(line.as_ref());
        }
        self.finish()
    }

    /// Classify and apply one line; malformed lines become diagnostics
    pub fn apply_line(&mut self, line: &str) {
        match Directive::parse(line) {
            Ok(directive) => self.apply(directive, line),
            Err(e) => {
                debug!(board = %self.board.folder_name, error = %e, "Skipping malformed directive");
                self.diagnostics
                    .push(Diagnostic::new(DiagnosticKind::MalformedDirective, e.to_string()));
            }
        }
    }

    /// Apply a classified directive; `line` is the source text it came from
    pub fn apply(&mut self, directive: Directive<'_>, line: &str) {
        let board = &mut self.board;
        match directive {
            Directive::Mcu { class, variant } => {
                board.mcu.mcu_class = class.to_string();
                board.mcu.mcu_type = variant.to_string();
            }
            Directive::BoardId(token) => {
                board.apj_board_id_name = token.to_string();
                if let Ok(id) = token.parse() {
                    board.apj_board_id = Some(id);
                }
            }
            Directive::FlashSizeKb(value) => {
                if let Some(kb) = self.number("FLASH_SIZE_KB", value) {
                    self.board.mcu.flash_kb = kb;
                }
            }
            Directive::OscillatorHz(value) => {
                if let Some(hz) = self.number("OSCILLATOR_HZ", value) {
                    self.board.mcu.oscillator_hz = hz;
                }
            }
            Directive::SerialOrder(tokens) => {
                board.serial_order = tokens.iter().map(|t| t.to_string()).collect();
                board.uarts = tokens
                    .iter()
                    .enumerate()
                    .map(|(i, token)| UartChannel::from_token(i, token))
                    .collect();
            }
            Directive::I2cOrder(tokens) => {
                board.i2c_buses = tokens.iter().map(|t| t.to_string()).collect();
            }
            Directive::PwmOutput(pin) => {
                if let Some(existing) = board.pwm_outputs.iter_mut().find(|o| o.number == pin.number) {
                    warn!(board = %board.folder_name, output = pin.number, "Output redefined");
                    self.diagnostics.push(Diagnostic::new(
                        DiagnosticKind::DuplicateOutput,
                        format!("PWM({}) redefined on {}", pin.number, pin.pin),
                    ));
                    *existing = pin;
                } else {
                    board.pwm_outputs.push(pin);
                }
            }
            Directive::SpiDev(device) => self.spi_devices.push(device),
            Directive::Buzzer { pin } => {
                board.features.buzzer = true;
                board.features.buzzer_pin = Some(pin.to_string());
            }
            Directive::Define { name, value } => self.apply_define(name, value),
            Directive::SdCard => board.sensors.sdcard = true,
            Directive::CanPin(keyword) => {
                if !self.undefs.contains(keyword) {
                    if let Some(index) = can_index(keyword) {
                        board.features.can_interfaces = board.features.can_interfaces.max(index);
                    }
                }
            }
            Directive::Dma => board.dma_lines.push(line.to_string()),
            Directive::LedStrip { pin } => {
                board.features.led_strip = true;
                board.features.led_pin = Some(pin.to_string());
            }
            Directive::Undef(names) => {
                self.undefs.extend(names.into_iter().map(String::from));
            }
            Directive::Ignored => {}
        }
    }

    fn apply_define(&mut self, name: &str, value: &str) {
        self.board.defines.insert(name.to_string(), value.to_string());

        match name {
            "HAL_BUZZER_PIN" => self.board.features.buzzer = true,
            "HAL_BATT_VOLT_PIN" => self.board.battery.volt_pin = self.number(name, value),
            "HAL_BATT_CURR_PIN" => self.board.battery.curr_pin = self.number(name, value),
            "HAL_BATT_VOLT_SCALE" => self.board.battery.volt_mult = self.number(name, value),
            "HAL_BATT_CURR_SCALE" => self.board.battery.amp_per_volt = self.number(name, value),
            "HAL_HAVE_SAFETY_SWITCH" => {
                if value == "1" {
                    self.board.features.safety_switch = true;
                }
            }
            "HAL_NUM_CAN_IFACES" => {
                if let Some(count) = self.number(name, value) {
                    self.board.features.can_interfaces = count;
                }
            }
            "CHIBIOS_SHORT_BOARD_NAME" => {
                self.board.board_name = value.trim_matches('"').to_string();
            }
            "HAL_LED_STRIP_PIN" | "AP_NOTIFY_NEOPIXEL_PIN" => self.board.features.led_strip = true,
            "HAL_OSD_TYPE_DEFAULT" => {
                if value == "1" {
                    self.board.sensors.osd = Some(self.chips.default_osd.clone());
                }
            }
            "HAL_OS_FATFS_IO" => {
                if value == "1" {
                    self.board.sensors.sdcard = true;
                }
            }
            _ => {}
        }
    }

    /// Parse a numeric field, recording a diagnostic on failure
    fn number<T: std::str::FromStr>(&mut self, name: &str, value: &str) -> Option<T> {
        match value.parse() {
            Ok(n) => Some(n),
            Err(_) => {
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::MalformedDirective,
                    format!("{} expects a number, got {:?}", name, value),
                ));
                None
            }
        }
    }

    /// End the pass and hand back the board, SPI devices and diagnostics
    pub fn finish(self) -> ProcessedBoard {
        ProcessedBoard {
            board: self.board,
            spi_devices: self.spi_devices,
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardDescription;

    fn process(lines: &[&str]) -> ProcessedBoard {
        let chips = ChipCatalog::default();
        DirectiveProcessor::new(BoardDescription::new("Test"), &chips).process(lines)
    }

    #[test]
    fn test_classify_keywords() {
        assert_eq!(
            Directive::parse("MCU STM32H7xx STM32H743xx").unwrap(),
            Directive::Mcu {
                class: "STM32H7xx",
                variant: "STM32H743xx"
            }
        );
        assert_eq!(Directive::parse("# comment").unwrap(), Directive::Ignored);
        assert_eq!(Directive::parse("").unwrap(), Directive::Ignored);
        assert_eq!(Directive::parse("STORAGE_FLASH_PAGE 14").unwrap(), Directive::Ignored);
        assert_eq!(Directive::parse("SDMMC").unwrap(), Directive::SdCard);
        assert_eq!(
            Directive::parse("undef PA0 PA1").unwrap(),
            Directive::Undef(vec!["PA0", "PA1"])
        );
        assert!(matches!(Directive::parse("MCU STM32H7xx"), Err(DirectiveError::Arity { .. })));
        assert!(matches!(
            Directive::parse("PA0 TIM2_CH1 TIM2 PWM(x)"),
            Err(DirectiveError::InvalidMarker { marker: "PWM", .. })
        ));
    }

    #[test]
    fn test_output_pin() {
        let Directive::PwmOutput(pin) = Directive::parse("PA0 TIM2_CH1N TIM2 PWM(1) GPIO(50) BIDIR").unwrap() else {
            panic!("expected output pin");
        };
        assert_eq!(pin.number, 1);
        assert_eq!(pin.timer, "TIM2");
        assert_eq!(pin.timer_channel, "TIM2_CH1N");
        assert_eq!(pin.gpio, Some(50));
        assert!(pin.complementary);
        assert!(pin.bidir);
        assert_eq!(pin.pin, "PA0");

        let Directive::PwmOutput(pin) = Directive::parse("PB1 TIM3_CH4 TIM3 PWM(12)").unwrap() else {
            panic!("expected output pin");
        };
        assert_eq!(pin.number, 12);
        assert_eq!(pin.gpio, None);
        assert!(!pin.complementary);
        assert!(!pin.bidir);
    }

    #[test]
    fn test_mcu_and_clock() {
        let processed = process(&[
            "MCU STM32F4xx STM32F405xx",
            "FLASH_SIZE_KB 1024",
            "OSCILLATOR_HZ 8000000",
            "OSCILLATOR_HZ fast",
        ]);
        let mcu = &processed.board.mcu;
        assert_eq!(mcu.mcu_class, "STM32F4xx");
        assert_eq!(mcu.mcu_type, "STM32F405xx");
        assert_eq!(mcu.flash_kb, 1024);
        assert_eq!(mcu.oscillator_hz, 8000000);
        assert_eq!(processed.diagnostics.len(), 1);
        assert_eq!(processed.diagnostics[0].kind, DiagnosticKind::MalformedDirective);
    }

    #[test]
    fn test_serial_order() {
        let processed = process(&["SERIAL_ORDER OTG1 USART1 EMPTY"]);
        let uarts = &processed.board.uarts;
        assert_eq!(uarts.len(), 3);
        assert_eq!(uarts.iter().map(|u| u.serial_index).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(uarts.iter().map(|u| u.is_usb).collect::<Vec<_>>(), vec![true, false, false]);
        assert_eq!(uarts.iter().map(|u| u.is_empty).collect::<Vec<_>>(), vec![false, false, true]);
        assert_eq!(processed.board.serial_order, vec!["OTG1", "USART1", "EMPTY"]);
    }

    #[test]
    fn test_board_id() {
        let processed = process(&["APJ_BOARD_ID 1013"]);
        assert_eq!(processed.board.apj_board_id, Some(1013));

        let processed = process(&["APJ_BOARD_ID AP_HW_MATEKH743"]);
        assert_eq!(processed.board.apj_board_id, None);
        assert_eq!(processed.board.apj_board_id_name, "AP_HW_MATEKH743");
    }

    #[test]
    fn test_defines_kept_verbatim() {
        let processed = process(&[
            "define HAL_STORAGE_SIZE 16384",
            "define HAL_SPI_CHECK_CLOCK_FREQ  (sysclk  /  2)",
            "define CHIBIOS_SHORT_BOARD_NAME \"MatekH7\"",
            "define HAL_NO_VALUE",
        ]);
        let defines = &processed.board.defines;
        assert_eq!(defines["HAL_STORAGE_SIZE"], "16384");
        assert_eq!(defines["HAL_SPI_CHECK_CLOCK_FREQ"], "(sysclk  /  2)");
        assert_eq!(defines["CHIBIOS_SHORT_BOARD_NAME"], "\"MatekH7\"");
        assert_eq!(defines["HAL_NO_VALUE"], "");
        assert_eq!(processed.board.board_name, "MatekH7");
    }

    #[test]
    fn test_define_side_effects() {
        let processed = process(&[
            "define HAL_BATT_VOLT_PIN 10",
            "define HAL_BATT_CURR_PIN 11",
            "define HAL_BATT_VOLT_SCALE 11.0",
            "define HAL_BATT_CURR_SCALE 40.2",
            "define HAL_HAVE_SAFETY_SWITCH 1",
            "define HAL_NUM_CAN_IFACES 2",
            "define HAL_BUZZER_PIN 24",
            "define AP_NOTIFY_NEOPIXEL_PIN 55",
            "define HAL_OSD_TYPE_DEFAULT 1",
            "define HAL_OS_FATFS_IO 1",
        ]);
        let board = &processed.board;
        assert_eq!(board.battery.volt_pin, Some(10));
        assert_eq!(board.battery.curr_pin, Some(11));
        assert_eq!(board.battery.volt_mult, Some(11.0));
        assert_eq!(board.battery.amp_per_volt, Some(40.2));
        assert!(board.features.safety_switch);
        assert_eq!(board.features.can_interfaces, 2);
        assert!(board.features.buzzer);
        assert!(board.features.led_strip);
        assert_eq!(board.sensors.osd.as_deref(), Some("MAX7456"));
        assert!(board.sensors.sdcard);
        assert!(processed.diagnostics.is_empty());
    }

    #[test]
    fn test_safety_switch_requires_exactly_one() {
        let processed = process(&["define HAL_HAVE_SAFETY_SWITCH 0"]);
        assert!(!processed.board.features.safety_switch);
        let processed = process(&["define HAL_HAVE_SAFETY_SWITCH 1 // on"]);
        assert!(!processed.board.features.safety_switch);
    }

    #[test]
    fn test_malformed_battery_define() {
        let processed = process(&["define HAL_BATT_VOLT_PIN PC0"]);
        assert_eq!(processed.board.battery.volt_pin, None);
        assert_eq!(processed.board.defines["HAL_BATT_VOLT_PIN"], "PC0");
        assert_eq!(processed.diagnostics.len(), 1);
    }

    #[test]
    fn test_can_keyword_and_undef() {
        let processed = process(&["CAN1_RX PD0", "CAN2_TX PB13"]);
        assert_eq!(processed.board.features.can_interfaces, 2);

        let processed = process(&["undef CAN2_TX", "CAN1_RX PD0", "CAN2_TX PB13"]);
        assert_eq!(processed.board.features.can_interfaces, 1);

        // undef is not retroactive
        let processed = process(&["CAN2_TX PB13", "undef CAN2_TX"]);
        assert_eq!(processed.board.features.can_interfaces, 2);
    }

    #[test]
    fn test_spidev() {
        let processed = process(&[
            "SPIDEV ICM42688 SPI1 DEVID1 IMU1_CS MODE3 2*MHZ 16*MHZ",
            "SPIDEV osd SPI2",
        ]);
        assert_eq!(processed.spi_devices.len(), 2);
        assert_eq!(processed.spi_devices[0].name, "icm42688");
        assert_eq!(processed.spi_devices[0].bus, "SPI1");
        assert_eq!(processed.spi_devices[0].devid, "DEVID1");
        assert_eq!(processed.spi_devices[0].cs, "IMU1_CS");
        assert_eq!(processed.spi_devices[1].devid, "");
    }

    #[test]
    fn test_peripheral_pins() {
        let processed = process(&[
            "PA15 BUZZER OUTPUT GPIO(80) LOW",
            "PA8 LED_STRIP TIM1_CH1 TIM1 NEOPIXEL",
            "DMA_PRIORITY TIM1* SPI1*",
            "DMA_NOSHARE SPI1*",
            "SDIO",
        ]);
        let board = &processed.board;
        assert!(board.features.buzzer);
        assert_eq!(board.features.buzzer_pin.as_deref(), Some("PA15"));
        assert!(board.features.led_strip);
        assert_eq!(board.features.led_pin.as_deref(), Some("PA8"));
        assert_eq!(board.dma_lines, vec!["DMA_PRIORITY TIM1* SPI1*", "DMA_NOSHARE SPI1*"]);
        assert!(board.sensors.sdcard);
    }

    #[test]
    fn test_neopixel_anywhere_in_line() {
        let processed = process(&["PB6 TIM4_CH1 TIM4 neopixel_out"]);
        assert!(processed.board.features.led_strip);
        assert_eq!(processed.board.features.led_pin.as_deref(), Some("PB6"));
    }

    #[test]
    fn test_duplicate_output_replaced() {
        let processed = process(&["PA0 TIM2_CH1 TIM2 PWM(1)", "PB0 TIM3_CH3 TIM3 PWM(1)"]);
        assert_eq!(processed.board.pwm_outputs.len(), 1);
        assert_eq!(processed.board.pwm_outputs[0].timer, "TIM3");
        assert_eq!(processed.diagnostics[0].kind, DiagnosticKind::DuplicateOutput);
    }

    #[test]
    fn test_blank_lines_ignored() {
        assert_eq!(Directive::parse("   ").unwrap(), Directive::Ignored);
        assert_eq!(Directive::parse("\t").unwrap(), Directive::Ignored);

        let processed = process(&["  ", "\t\t", "MCU STM32F4xx STM32F405xx"]);
        assert_eq!(processed.board.mcu.mcu_type, "STM32F405xx");
        assert!(processed.diagnostics.is_empty());
    }

    #[test]
    fn test_buzzer_define_kept() {
        let processed = process(&[
            "define HAL_BUZZER_OUTPUT_LEVEL 1",
            "define HAL_BUZZER_OUTPUT PWM(3) OUTPUT",
        ]);
        let board = &processed.board;
        assert_eq!(board.defines["HAL_BUZZER_OUTPUT_LEVEL"], "1");
        assert_eq!(board.defines["HAL_BUZZER_OUTPUT"], "PWM(3) OUTPUT");
        assert!(!board.features.buzzer);
        assert_eq!(board.features.buzzer_pin, None);
        assert!(board.pwm_outputs.is_empty());
    }

    #[test]
    fn test_lowercase_neopixel_on_led_timer_line() {
        let processed = process(&["PA8 TIM1_CH1 TIM1 LED neopixel"]);
        assert!(processed.board.features.led_strip);
        assert_eq!(processed.board.features.led_pin.as_deref(), Some("PA8"));

        let processed = process(&["PE3 LED0 TIM1 OUTPUT"]);
        assert!(!processed.board.features.led_strip);
    }

    #[test]
    fn test_marker_value() {
        assert_eq!(marker_value("PA0 TIM2_CH1 TIM2 PWM(7) GPIO(51)", "PWM"), Some(7));
        assert_eq!(marker_value("PA0 TIM2_CH1 TIM2 PWM(7) GPIO(51)", "GPIO"), Some(51));
        assert_eq!(marker_value("PA0 GPIO()", "GPIO"), None);
        assert_eq!(can_index("CAN2_TX"), Some(2));
        assert_eq!(can_index("CAN_TX"), None);
    }
}
