// Alarm code domain models

/// Which alarm thresholds are configured for a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlarmSetting {
    #[default]
    None,
    Low,
    High,
    Both,
}

impl AlarmSetting {
    /// Decode the alarm-enabled code (0 none, 1 low, 2 high, 3 both).
    /// Values arrive as bucket means, so they are rounded first.
    pub fn from_code(code: f64) -> Option<Self> {
        match round_code(code)? {
            0 => Some(Self::None),
            1 => Some(Self::Low),
            2 => Some(Self::High),
            3 => Some(Self::Both),
            _ => None,
        }
    }

    pub fn shows_low(&self) -> bool {
        matches!(self, Self::Low | Self::Both)
    }

    pub fn shows_high(&self) -> bool {
        matches!(self, Self::High | Self::Both)
    }
}

/// Alarm currently raised for a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlarmTrigger {
    #[default]
    None,
    Low,
    High,
}

impl AlarmTrigger {
    /// Decode the alarm-triggered code (0 none, 1 low, 2 high)
    pub fn from_code(code: f64) -> Option<Self> {
        match round_code(code)? {
            0 => Some(Self::None),
            1 => Some(Self::Low),
            2 => Some(Self::High),
            _ => None,
        }
    }
}

fn round_code(code: f64) -> Option<i64> {
    if code.is_finite() {
        Some(code.round() as i64)
    } else {
        None
    }
}
