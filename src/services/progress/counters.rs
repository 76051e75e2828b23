/// Stored state of one question leaf.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LeafState {
    pub(crate) selected_option: Option<i16>,
    pub(crate) is_flagged: bool,
}

impl LeafState {
    fn is_attempted(self) -> bool {
        self.selected_option.is_some()
    }

    fn is_correct(self, correct_option: i16) -> bool {
        self.selected_option == Some(correct_option)
    }
}

/// Signed counter changes caused by moving one leaf from `prev` to `next`.
/// `attempted` applies to the root and to every aggregate above the leaf;
/// the other three only exist on the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CounterDelta {
    pub(crate) attempted: i32,
    pub(crate) flagged: i32,
    pub(crate) skipped: i32,
    pub(crate) correct: i32,
}

impl CounterDelta {
    pub(crate) fn between(prev: LeafState, next: LeafState, correct_option: i16) -> Self {
        Self {
            attempted: transition(prev.is_attempted(), next.is_attempted()),
            flagged: transition(prev.is_flagged, next.is_flagged),
            skipped: transition(!prev.is_attempted(), !next.is_attempted()),
            correct: transition(prev.is_correct(correct_option), next.is_correct(correct_option)),
        }
    }

    pub(crate) fn is_zero(self) -> bool {
        self == Self::default()
    }
}

fn transition(before: bool, after: bool) -> i32 {
    i32::from(after) - i32::from(before)
}
