use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingMode {
    #[default]
    Freehand,
    StampCircle,
    StampSquare,
}

impl DrawingMode {
    pub fn next(self) -> Self {
        match self {
            Self::Freehand => Self::StampCircle,
            Self::StampCircle => Self::StampSquare,
            Self::StampSquare => Self::Freehand,
        }
    }

    pub fn is_stamp(self) -> bool {
        !matches!(self, Self::Freehand)
    }
}

/// Tool selector driven by a single "next tool" button. There is no direct
/// setter: the only transition is [`DrawingModeMachine::cycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawingModeMachine {
    mode: DrawingMode,
}

impl DrawingModeMachine {
    pub fn current(&self) -> DrawingMode {
        self.mode
    }

    pub fn cycle(&mut self) -> DrawingMode {
        self.mode = self.mode.next();
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [DrawingMode; 3] = [
        DrawingMode::Freehand,
        DrawingMode::StampCircle,
        DrawingMode::StampSquare,
    ];

    #[test]
    fn starts_in_freehand() {
        assert_eq!(DrawingModeMachine::default().current(), DrawingMode::Freehand);
    }

    #[test]
    fn cycles_in_fixed_order() {
        let mut machine = DrawingModeMachine::default();
        assert_eq!(machine.cycle(), DrawingMode::StampCircle);
        assert_eq!(machine.cycle(), DrawingMode::StampSquare);
        assert_eq!(machine.cycle(), DrawingMode::Freehand);
    }

    #[test]
    fn three_cycles_return_to_start_and_one_never_repeats() {
        for start in ALL {
            assert_eq!(start.next().next().next(), start);
            assert_ne!(start.next(), start);
        }
    }

    #[test]
    fn only_freehand_is_not_a_stamp() {
        assert!(!DrawingMode::Freehand.is_stamp());
        assert!(DrawingMode::StampCircle.is_stamp());
        assert!(DrawingMode::StampSquare.is_stamp());
    }
}
