//! Default RC receiver input detection

use crate::board::{BoardDescription, RcInputConfig, RcInputKind};
use crate::uart::uart_base_name;

const SERIAL_INPUT_DEFINE: &str = "HAL_SERIAL_INPUT_ENABLED";

/// Classify how the receiver is wired from the first usable `RCIN` line.
///
/// A timer line (`PB8 TIM4_CH3 TIM4 RCININT ...`) gives a timer-capture input;
/// a UART line gives a serial input. Without either, `HAL_SERIAL_INPUT_ENABLED 1`
/// still marks a serial input. Otherwise the input stays unset.
pub fn detect_rc_input<S: AsRef<str>>(board: &BoardDescription, lines: &[S]) -> Option<RcInputConfig> {
    for line in lines.iter().map(AsRef::as_ref) {
        if line.is_empty() || line.starts_with('#') || !line.contains("RCIN") {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();

        if line.contains("TIM") && parts.len() >= 3 {
            return Some(RcInputConfig {
                kind: RcInputKind::Timer,
                serial_index: None,
                pin: Some(parts[0].to_string()),
                timer: Some(parts[2].to_string()),
            });
        }

        if line.contains("USART") || line.contains("UART") {
            let serial_index = parts
                .iter()
                .filter_map(|p| uart_base_name(p))
                .find_map(|name| board.uart_by_name(name))
                .map(|u| u.serial_index);
            return Some(RcInputConfig {
                kind: RcInputKind::Uart,
                serial_index,
                pin: parts.first().map(|p| p.to_string()),
                timer: None,
            });
        }
    }

    if board.defines.get(SERIAL_INPUT_DEFINE).map(String::as_str) == Some("1") {
        return Some(RcInputConfig {
            kind: RcInputKind::Uart,
            serial_index: None,
            pin: None,
            timer: None,
        });
    }
    None
}
