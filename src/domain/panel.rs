// Panel index domain
use serde::Serialize;
use std::fmt;

/// One of the three mutually exclusive dashboard panels.
///
/// The index is clamped into `0..=2` on construction and never wraps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Panel(u8);

impl Panel {
    pub const FIRST: Panel = Panel(0);
    pub const LAST: Panel = Panel(2);

    pub fn clamped(index: i64) -> Self {
        Self(index.clamp(Self::FIRST.0 as i64, Self::LAST.0 as i64) as u8)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// The panel to the right, if any.
    pub fn next(self) -> Option<Panel> {
        (self < Self::LAST).then(|| Panel(self.0 + 1))
    }

    /// The panel to the left, if any.
    pub fn previous(self) -> Option<Panel> {
        (self > Self::FIRST).then(|| Panel(self.0 - 1))
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped() {
        assert_eq!(Panel::clamped(5), Panel::LAST);
        assert_eq!(Panel::clamped(-3), Panel::FIRST);
        assert_eq!(Panel::clamped(1).index(), 1);
    }

    #[test]
    fn test_neighbours_do_not_wrap() {
        assert_eq!(Panel::LAST.next(), None);
        assert_eq!(Panel::FIRST.previous(), None);
        assert_eq!(Panel::FIRST.next(), Some(Panel::clamped(1)));
        assert_eq!(Panel::LAST.previous(), Some(Panel::clamped(1)));
    }
}
