// Charge level thresholds shared by the donut readout and the capacity bars
use serde::Serialize;

/// Below this percentage the level is critical.
pub const CRITICAL_PERCENT: f64 = 20.0;

/// Below this percentage the level is low.
pub const LOW_PERCENT: f64 = 50.0;

const _: () = assert!(CRITICAL_PERCENT < LOW_PERCENT);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdColor {
    Red,
    Orange,
    Green,
}

impl ThresholdColor {
    pub fn for_percent(percent: f64) -> Self {
        if percent < CRITICAL_PERCENT {
            ThresholdColor::Red
        } else if percent < LOW_PERCENT {
            ThresholdColor::Orange
        } else {
            ThresholdColor::Green
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            ThresholdColor::Red => "#E24F4F",
            ThresholdColor::Orange => "#ff9800",
            ThresholdColor::Green => "#5CD66E",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ThresholdColor::Red => "red",
            ThresholdColor::Orange => "orange",
            ThresholdColor::Green => "green",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(ThresholdColor::for_percent(0.0), ThresholdColor::Red);
        assert_eq!(ThresholdColor::for_percent(19.99), ThresholdColor::Red);
        assert_eq!(ThresholdColor::for_percent(20.0), ThresholdColor::Orange);
        assert_eq!(ThresholdColor::for_percent(49.9), ThresholdColor::Orange);
        assert_eq!(ThresholdColor::for_percent(50.0), ThresholdColor::Green);
        assert_eq!(ThresholdColor::for_percent(100.0), ThresholdColor::Green);
    }

    #[test]
    fn test_every_integer_percent_maps_to_one_band() {
        for percent in 0..=100 {
            let color = ThresholdColor::for_percent(percent as f64);
            let expected = match percent {
                0..=19 => ThresholdColor::Red,
                20..=49 => ThresholdColor::Orange,
                _ => ThresholdColor::Green,
            };
            assert_eq!(color, expected, "percent {}", percent);
        }
    }
}
