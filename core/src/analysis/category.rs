use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Technique faults the remote classifier can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    FrontsightDip,
    OvertightGrip,
    AcuteAngleTrigger,
    StancePosition,
    BreathControl,
    EarlyRecoil,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 6] = [
        ErrorCategory::FrontsightDip,
        ErrorCategory::OvertightGrip,
        ErrorCategory::AcuteAngleTrigger,
        ErrorCategory::StancePosition,
        ErrorCategory::BreathControl,
        ErrorCategory::EarlyRecoil,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ErrorCategory::FrontsightDip => "frontsight_dip",
            ErrorCategory::OvertightGrip => "overtight_grip",
            ErrorCategory::AcuteAngleTrigger => "acute_angle_trigger",
            ErrorCategory::StancePosition => "stance_position",
            ErrorCategory::BreathControl => "breath_control",
            ErrorCategory::EarlyRecoil => "early_recoil",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::FrontsightDip => "Incorrect W formed by dip of front sight",
            ErrorCategory::OvertightGrip => "Extra pressure exercised on the grip",
            ErrorCategory::AcuteAngleTrigger => "Rough handling of Trigger",
            ErrorCategory::StancePosition => "Improper foot positioning or weight distribution",
            ErrorCategory::BreathControl => "Irregular breathing pattern",
            ErrorCategory::EarlyRecoil => {
                "Pulling the trigger before reaching the target due to anxiety"
            }
        }
    }

    pub fn solution(&self) -> &'static str {
        match self {
            ErrorCategory::FrontsightDip => "Work on arm oriented exercises.",
            ErrorCategory::OvertightGrip => {
                "Relax your grip  and hold the gun like giving a handshake."
            }
            ErrorCategory::AcuteAngleTrigger => {
                "Maintain a 90 degree pace with the index finger and the trigger."
            }
            ErrorCategory::StancePosition => {
                "Maintain athletic stance with feet shoulder-width apart. Weight slightly \
                 forward, knees flexed. Fix your feet parallel to each other and stay directed \
                 towards the aiming area."
            }
            ErrorCategory::BreathControl => {
                "Follow box breathing and practice 4:8 ratio breathing regularly."
            }
            ErrorCategory::EarlyRecoil => {
                "Calm down and cancel shots if the hand is not stable and take regular breaks \
                 when needed."
            }
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ErrorCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ErrorCategory::ALL
            .into_iter()
            .find(|category| category.key() == value)
            .ok_or_else(|| format!("unknown error category `{value}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_back() {
        for category in ErrorCategory::ALL {
            assert_eq!(category.key().parse::<ErrorCategory>(), Ok(category));
            assert!(!category.description().is_empty());
            assert!(!category.solution().is_empty());
        }
        assert!("sight_picture".parse::<ErrorCategory>().is_err());
    }

    #[test]
    fn catalogue_matches_service_wording() {
        assert_eq!(
            ErrorCategory::AcuteAngleTrigger.description(),
            "Rough handling of Trigger"
        );
        assert_eq!(
            ErrorCategory::AcuteAngleTrigger.solution(),
            "Maintain a 90 degree pace with the index finger and the trigger."
        );
        assert_eq!(
            ErrorCategory::StancePosition.solution(),
            "Maintain athletic stance with feet shoulder-width apart. Weight slightly forward, \
             knees flexed. Fix your feet parallel to each other and stay directed towards the \
             aiming area."
        );
        assert_eq!(
            ErrorCategory::EarlyRecoil.solution(),
            "Calm down and cancel shots if the hand is not stable and take regular breaks when \
             needed."
        );
    }
}
