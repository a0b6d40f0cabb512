//! UART pin and DMA enrichment for SERIAL_ORDER channels

use std::collections::{HashMap, HashSet};

use crate::board::BoardDescription;

/// Hardware UART families recognised in pin functions
pub const UART_FAMILIES: [&str; 3] = ["LPUART", "USART", "UART"];

#[derive(Debug, Default)]
struct UartPins {
    tx: Option<String>,
    rx: Option<String>,
}

/// `USART1_TX` -> `USART1`, `LPUART1` -> `LPUART1`; `None` for non-UART tokens
pub fn uart_base_name(token: &str) -> Option<&str> {
    let family = UART_FAMILIES.iter().find(|f| token.starts_with(*f))?;
    let base = token.split('_').next().unwrap_or(token);
    let index = &base[family.len()..];
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(base)
}

/// Record TX/RX pins per channel and infer DMA availability.
///
/// TX DMA is assumed on every real UART; RX DMA is available unless the UART
/// appears on a `NODMA` line.
pub fn enrich_uarts<S: AsRef<str>>(board: &mut BoardDescription, lines: &[S]) {
    let mut pins: HashMap<String, UartPins> = HashMap::new();
    let mut nodma: HashSet<String> = HashSet::new();

    for line in lines.iter().map(AsRef::as_ref) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();

        // PA9 USART1_TX USART1
        if let [pin, func, ..] = parts.as_slice() {
            let is_tx = func.contains("_TX");
            if is_tx || func.contains("_RX") {
                if let Some(name) = uart_base_name(func) {
                    let entry = pins.entry(name.to_string()).or_default();
                    if is_tx {
                        entry.tx = Some(pin.to_string());
                    } else {
                        entry.rx = Some(pin.to_string());
                    }
                }
            }
        }

        if line.contains("NODMA") {
            nodma.extend(
                parts
                    .iter()
                    .filter(|p| UART_FAMILIES.iter().any(|f| p.starts_with(f)))
                    .map(|p| p.to_string()),
            );
        }
    }

    for uart in &mut board.uarts {
        if let Some(found) = pins.get(&uart.uart_name) {
            uart.has_tx = found.tx.is_some();
            uart.has_rx = found.rx.is_some();
            uart.tx_pin = found.tx.clone();
            uart.rx_pin = found.rx.clone();
        }

        if !uart.is_usb && !uart.is_empty {
            uart.tx_dma = true;
            uart.rx_dma = !nodma.contains(&uart.uart_name);
        }
    }
}
