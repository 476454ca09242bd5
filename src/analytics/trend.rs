//! Direction of change between the two most recent scores of one kind

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Worsening,
    Unchanged,
    /// One of the two values is missing
    #[serde(rename = "none")]
    NoTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub direction: TrendDirection,
    /// Absolute difference, present whenever both values are
    pub delta: Option<f64>,
}

impl Trend {
    pub fn none() -> Self {
        Self {
            direction: TrendDirection::NoTrend,
            delta: None,
        }
    }

    /// Short caption: `↑2 better`, `↓1 worse`, `No change` or `No trend`
    pub fn text(&self) -> String {
        let delta = self.delta.unwrap_or_default();
        match self.direction {
            TrendDirection::Improving => format!("↑{} better", delta),
            TrendDirection::Worsening => format!("↓{} worse", delta),
            TrendDirection::Unchanged => "No change".to_string(),
            TrendDirection::NoTrend => "No trend".to_string(),
        }
    }
}

/// Compare `current` against `previous`.
///
/// With `inverted` set a lower value counts as improvement (pain level).
pub fn trend(current: Option<f64>, previous: Option<f64>, inverted: bool) -> Trend {
    let (Some(current), Some(previous)) = (current, previous) else {
        return Trend::none();
    };

    let improving = if inverted {
        current < previous
    } else {
        current > previous
    };
    let worsening = if inverted {
        current > previous
    } else {
        current < previous
    };

    let direction = if improving {
        TrendDirection::Improving
    } else if worsening {
        TrendDirection::Worsening
    } else {
        TrendDirection::Unchanged
    };

    Trend {
        direction,
        delta: Some((current - previous).abs()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverted_metric() {
        assert_eq!(trend(Some(6.0), Some(4.0), true).direction, TrendDirection::Worsening);
        assert_eq!(trend(Some(3.0), Some(4.0), true).direction, TrendDirection::Improving);
    }

    #[test]
    fn test_regular_metric() {
        let t = trend(Some(6.0), Some(4.0), false);
        assert_eq!(t.direction, TrendDirection::Improving);
        assert_eq!(t.delta, Some(2.0));
        assert_eq!(t.text(), "↑2 better");
        assert_eq!(trend(Some(2.0), Some(5.0), false).text(), "↓3 worse");
    }

    #[test]
    fn test_unchanged_and_missing() {
        assert_eq!(trend(Some(5.0), Some(5.0), false).direction, TrendDirection::Unchanged);
        assert_eq!(trend(Some(5.0), Some(5.0), false).text(), "No change");
        assert_eq!(trend(None, Some(5.0), false), Trend::none());
        assert_eq!(trend(Some(5.0), None, true).text(), "No trend");
    }

    #[test]
    fn test_zero_is_a_value() {
        assert_eq!(trend(Some(0.0), Some(3.0), true).direction, TrendDirection::Improving);
    }

    #[test]
    fn test_serializes_direction_tags() {
        let json = serde_json::to_value(Trend::none()).unwrap();
        assert_eq!(json["direction"], "none");
        let json = serde_json::to_value(trend(Some(1.0), Some(2.0), false)).unwrap();
        assert_eq!(json["direction"], "worsening");
    }
}
