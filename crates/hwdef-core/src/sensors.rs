//! Onboard sensor detection from SPI device names

use crate::board::{SensorSet, SpiDevice};
use crate::config::ChipCatalog;

/// First identifier in catalog order contained in `name`
fn first_match<'a>(chips: &'a [String], name: &str) -> Option<&'a str> {
    chips.iter().map(String::as_str).find(|chip| name.contains(chip))
}

fn push_unique(list: &mut Vec<String>, chip: &str) {
    let pretty = chip.to_uppercase();
    if !list.contains(&pretty) {
        list.push(pretty);
    }
}

/// Match every device name against each category independently. List
/// categories collect each chip once; OSD and flash keep the last match.
pub fn detect_sensors(devices: &[SpiDevice], chips: &ChipCatalog, sensors: &mut SensorSet) {
    for dev in devices {
        let name = dev.name.to_lowercase();

        if let Some(chip) = first_match(&chips.imu, &name) {
            push_unique(&mut sensors.imu, chip);
        }
        if let Some(chip) = first_match(&chips.barometer, &name) {
            push_unique(&mut sensors.barometer, chip);
        }
        if let Some(chip) = first_match(&chips.compass, &name) {
            push_unique(&mut sensors.compass, chip);
        }
        if let Some(chip) = first_match(&chips.osd, &name) {
            sensors.osd = Some(chip.to_uppercase());
        }
        if let Some(chip) = first_match(&chips.flash, &name) {
            sensors.flash = Some(chip.to_uppercase());
        }
        if name.contains("sdcard") || name.contains("sd_card") {
            sensors.sdcard = true;
        }
    }
}
