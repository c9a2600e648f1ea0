use crate::target::ProximitySignal;
use serde::{Deserialize, Serialize};

/// The three indicator lamps shown next to the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorLeds {
    pub red: bool,
    pub yellow: bool,
    pub green: bool,
}

impl IndicatorLeds {
    pub const RED_LABEL: &'static str = "Outside Target";
    pub const YELLOW_LABEL: &'static str = "Near Center";
    pub const GREEN_LABEL: &'static str = "Center Hit";

    pub fn off() -> Self {
        Self::default()
    }

    /// Exactly one lamp is lit for every signal.
    pub fn for_signal(signal: ProximitySignal) -> Self {
        match signal {
            ProximitySignal::Outside => Self {
                red: true,
                ..Self::off()
            },
            ProximitySignal::NearCenter => Self {
                yellow: true,
                ..Self::off()
            },
            ProximitySignal::CenterHit => Self {
                green: true,
                ..Self::off()
            },
        }
    }

    /// Line understood by the optional serial LED board, e.g. `LED:R0Y1G0\n`.
    pub fn serial_command(&self) -> String {
        format!(
            "LED:R{}Y{}G{}\n",
            u8::from(self.red),
            u8::from(self.yellow),
            u8::from(self.green)
        )
    }
}

impl From<ProximitySignal> for IndicatorLeds {
    fn from(signal: ProximitySignal) -> Self {
        Self::for_signal(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_signal_lights_one_lamp() {
        let outside = IndicatorLeds::for_signal(ProximitySignal::Outside);
        assert!(outside.red && !outside.yellow && !outside.green);
        let near = IndicatorLeds::for_signal(ProximitySignal::NearCenter);
        assert!(!near.red && near.yellow && !near.green);
        let hit = IndicatorLeds::from(ProximitySignal::CenterHit);
        assert!(!hit.red && !hit.yellow && hit.green);
    }

    #[test]
    fn serial_command_encodes_lamp_states() {
        assert_eq!(
            IndicatorLeds::for_signal(ProximitySignal::NearCenter).serial_command(),
            "LED:R0Y1G0\n"
        );
        assert_eq!(IndicatorLeds::off().serial_command(), "LED:R0Y0G0\n");
    }
}
