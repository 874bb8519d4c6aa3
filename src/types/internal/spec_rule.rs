/// Specification-limit comparator for a test result.
///
/// A closed set: adding a comparison mode is a compile-checked update,
/// not a new substring to sniff out of a rule expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// Result must be >= limit_low
    Gte,
    /// Result must be <= limit_high
    Lte,
    /// Result must equal limit_low
    Equals,
    /// Result must lie in [limit_low, limit_high]
    Range,
}

impl Comparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gte => "GTE",
            Self::Lte => "LTE",
            Self::Equals => "EQUALS",
            Self::Range => "RANGE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GTE" => Some(Self::Gte),
            "LTE" => Some(Self::Lte),
            "EQUALS" => Some(Self::Equals),
            "RANGE" => Some(Self::Range),
            _ => None,
        }
    }

    /// Whether a result violates the limit under this comparator.
    ///
    /// A missing result or missing required limit is never flagged; flagging
    /// incomplete data is a review concern, not a spec breach.
    pub fn out_of_spec(&self, result: Option<f64>, low: Option<f64>, high: Option<f64>) -> bool {
        let Some(value) = result else { return false };
        match self {
            Self::Gte => low.map(|l| value < l).unwrap_or(false),
            Self::Lte => high.map(|h| value > h).unwrap_or(false),
            Self::Equals => low.map(|l| value != l).unwrap_or(false),
            Self::Range => {
                let below = low.map(|l| value < l).unwrap_or(false);
                let above = high.map(|h| value > h).unwrap_or(false);
                below || above
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gte_flags_below_limit() {
        assert!(Comparator::Gte.out_of_spec(Some(4.9), Some(5.0), None));
        assert!(!Comparator::Gte.out_of_spec(Some(5.0), Some(5.0), None));
    }

    #[test]
    fn lte_flags_above_limit() {
        assert!(Comparator::Lte.out_of_spec(Some(8.1), None, Some(8.0)));
        assert!(!Comparator::Lte.out_of_spec(Some(8.0), None, Some(8.0)));
    }

    #[test]
    fn range_is_inclusive_both_ends() {
        assert!(!Comparator::Range.out_of_spec(Some(5.0), Some(5.0), Some(8.0)));
        assert!(!Comparator::Range.out_of_spec(Some(8.0), Some(5.0), Some(8.0)));
        assert!(Comparator::Range.out_of_spec(Some(8.01), Some(5.0), Some(8.0)));
        assert!(Comparator::Range.out_of_spec(Some(4.99), Some(5.0), Some(8.0)));
    }

    #[test]
    fn missing_result_never_flags() {
        assert!(!Comparator::Range.out_of_spec(None, Some(5.0), Some(8.0)));
        assert!(!Comparator::Equals.out_of_spec(None, Some(5.0), None));
    }

    #[test]
    fn parse_round_trips() {
        for c in [Comparator::Gte, Comparator::Lte, Comparator::Equals, Comparator::Range] {
            assert_eq!(Comparator::parse(c.as_str()), Some(c));
        }
        assert_eq!(Comparator::parse(">="), None);
    }
}
