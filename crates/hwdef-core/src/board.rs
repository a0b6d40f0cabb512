//! Board description record produced for every parsed board folder

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Complete parsed board definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDescription {
    /// Folder name, unique per board (e.g. "MatekH743")
    pub folder_name: String,
    /// Display name, overridden by `CHIBIOS_SHORT_BOARD_NAME`
    pub board_name: String,
    /// Numeric APJ board ID once resolved
    pub apj_board_id: Option<u32>,
    /// Symbolic board ID as written (e.g. "AP_HW_MATEKH743")
    pub apj_board_id_name: String,

    #[serde(flatten)]
    pub mcu: McuInfo,

    /// Raw SERIAL_ORDER tokens
    pub serial_order: Vec<String>,
    /// One slot per SERIAL_ORDER token; position is the SERIALn number
    pub uarts: Vec<UartChannel>,
    /// I2C buses in I2C_ORDER
    pub i2c_buses: Vec<String>,

    pub pwm_outputs: Vec<OutputPin>,
    pub output_groups: Vec<OutputGroup>,

    pub sensors: SensorSet,
    pub battery: BatteryMonitorConfig,
    pub rc_input: Option<RcInputConfig>,
    pub features: Features,

    /// Every `define` keyed by name, value verbatim (last definition wins)
    pub defines: BTreeMap<String, String>,
    /// Raw DMA_PRIORITY / DMA_NOSHARE lines
    pub dma_lines: Vec<String>,
    /// Parameters from the board's defaults file
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub default_params: BTreeMap<String, String>,

    pub header_comments: String,
    pub includes: Vec<PathBuf>,
    pub is_priority: bool,
    pub is_bootloader: bool,
}

impl BoardDescription {
    /// Create an empty record for a board folder
    pub fn new(folder_name: &str) -> Self {
        Self {
            folder_name: folder_name.to_string(),
            board_name: folder_name.to_string(),
            ..Default::default()
        }
    }

    /// Find the serial channel declared for a hardware UART name
    pub fn uart_by_name(&self, name: &str) -> Option<&UartChannel> {
        self.uarts.iter().find(|u| u.uart_name == name)
    }

    /// Serial channels backed by a real UART (not USB, not an empty slot)
    pub fn hardware_uarts(&self) -> impl Iterator<Item = &UartChannel> {
        self.uarts.iter().filter(|u| !u.is_usb && !u.is_empty)
    }
}

/// Microcontroller identity and clocking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McuInfo {
    /// e.g. "STM32H7xx"
    pub mcu_class: String,
    /// e.g. "STM32H743xx"
    pub mcu_type: String,
    pub flash_kb: u32,
    pub oscillator_hz: u32,
}

/// A single PWM/motor/servo output pin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputPin {
    /// PWM output number (1-based)
    pub number: u32,
    /// Timer name (e.g. "TIM1")
    pub timer: String,
    /// Full timer channel (e.g. "TIM1_CH1N")
    pub timer_channel: String,
    pub gpio: Option<u32>,
    /// `_CHxN` complementary output
    pub complementary: bool,
    /// BIDIR marker present
    pub bidir: bool,
    /// MCU pin label (e.g. "PB0")
    pub pin: String,
}

/// Output protocol capability of a timer group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "PWM")]
    Pwm,
    #[serde(rename = "DShot")]
    DShot,
    #[serde(rename = "BDShot")]
    BDShot,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Capability::Pwm => "PWM",
            Capability::DShot => "DShot",
            Capability::BDShot => "BDShot",
        };
        f.write_str(name)
    }
}

/// Outputs sharing one timer, and therefore one protocol and rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputGroup {
    /// Output numbers, ascending
    pub outputs: Vec<u32>,
    pub timer: String,
    pub capabilities: Vec<Capability>,
}

/// A slot of SERIAL_ORDER
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UartChannel {
    /// Position in SERIAL_ORDER (SERIALn)
    pub serial_index: usize,
    /// Hardware name (e.g. "USART1", "OTG1", "EMPTY")
    pub uart_name: String,
    pub has_tx: bool,
    pub has_rx: bool,
    pub tx_pin: Option<String>,
    pub rx_pin: Option<String>,
    pub tx_dma: bool,
    pub rx_dma: bool,
    pub is_usb: bool,
    pub is_empty: bool,
}

impl UartChannel {
    /// Build a slot from a SERIAL_ORDER token
    pub fn from_token(serial_index: usize, token: &str) -> Self {
        let is_empty = token == "EMPTY";
        Self {
            serial_index,
            uart_name: token.to_string(),
            has_tx: !is_empty,
            has_rx: !is_empty,
            tx_pin: None,
            rx_pin: None,
            tx_dma: false,
            rx_dma: false,
            is_usb: token.starts_with("OTG") || token == "USB",
            is_empty,
        }
    }
}

/// A chip declared on an SPI bus; feeds sensor detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpiDevice {
    /// Lower-cased device name
    pub name: String,
    pub bus: String,
    pub devid: String,
    pub cs: String,
}

/// Onboard sensors and storage detected from the definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorSet {
    pub imu: Vec<String>,
    pub barometer: Vec<String>,
    pub compass: Vec<String>,
    pub osd: Option<String>,
    pub flash: Option<String>,
    pub sdcard: bool,
}

/// Battery monitor analog inputs and scaling
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryMonitorConfig {
    pub volt_pin: Option<u32>,
    pub curr_pin: Option<u32>,
    pub volt_mult: Option<f64>,
    pub amp_per_volt: Option<f64>,
}

/// How the default RC receiver is wired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RcInputKind {
    /// Dedicated timer capture pin (SBUS/PPM)
    Timer,
    /// Serial receiver on a UART
    Uart,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RcInputConfig {
    #[serde(rename = "type")]
    pub kind: RcInputKind,
    pub serial_index: Option<usize>,
    pub pin: Option<String>,
    pub timer: Option<String>,
}

/// Optional peripherals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    pub buzzer: bool,
    pub buzzer_pin: Option<String>,
    pub led_strip: bool,
    pub led_pin: Option<String>,
    pub safety_switch: bool,
    pub can_interfaces: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uart_channel_from_token() {
        let usb = UartChannel::from_token(0, "OTG1");
        assert!(usb.is_usb);
        assert!(!usb.is_empty);

        let plain = UartChannel::from_token(1, "USART1");
        assert!(!plain.is_usb);
        assert!(plain.has_tx && plain.has_rx);

        let empty = UartChannel::from_token(2, "EMPTY");
        assert!(empty.is_empty);
        assert!(!empty.has_tx && !empty.has_rx);

        assert!(UartChannel::from_token(3, "USB").is_usb);
    }

    #[test]
    fn test_capability_serializes_by_protocol_name() {
        let json = serde_json::to_string(&vec![Capability::Pwm, Capability::DShot, Capability::BDShot]).unwrap();
        assert_eq!(json, r#"["PWM","DShot","BDShot"]"#);
    }

    #[test]
    fn test_record_uses_camel_case() {
        let board = BoardDescription::new("MatekH743");
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["folderName"], "MatekH743");
        assert_eq!(json["boardName"], "MatekH743");
        assert!(json.get("mcuClass").is_some());
        assert!(json.get("defaultParams").is_none());
    }
}
