//! Timer groups for PWM outputs
//!
//! All outputs driven by one hardware timer share its protocol and rate, so
//! they are configured as a group.

use std::collections::BTreeMap;

use crate::board::{Capability, OutputGroup, OutputPin};

/// Highest timer number treated as DShot capable (TIM1..TIM8)
pub const MAX_DSHOT_TIMER: u32 = 8;

/// Partition outputs by timer. Groups come out in ascending timer-name order,
/// members in ascending output number.
pub fn output_groups(outputs: &[OutputPin]) -> Vec<OutputGroup> {
    let mut by_timer: BTreeMap<&str, Vec<&OutputPin>> = BTreeMap::new();
    for out in outputs {
        by_timer.entry(out.timer.as_str()).or_default().push(out);
    }

    by_timer
        .into_iter()
        .map(|(timer, mut members)| {
            members.sort_by_key(|o| o.number);
            OutputGroup {
                outputs: members.iter().map(|o| o.number).collect(),
                timer: timer.to_string(),
                capabilities: capabilities(timer, &members),
            }
        })
        .collect()
}

fn capabilities(timer: &str, members: &[&OutputPin]) -> Vec<Capability> {
    let mut caps = vec![Capability::Pwm];
    if timer_number(timer).is_some_and(|n| n <= MAX_DSHOT_TIMER) {
        caps.push(Capability::DShot);
        if members.iter().any(|o| o.bidir) {
            caps.push(Capability::BDShot);
        }
    }
    caps
}

/// Trailing number of a timer name (`TIM15` -> 15)
fn timer_number(timer: &str) -> Option<u32> {
    let digits_start = timer
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    timer[digits_start..].parse().ok()
}
