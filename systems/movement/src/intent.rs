use tilemaze_core::{Direction, Intent};

/// Derives the movement intent from directional key transitions.
///
/// The most recent press wins. Releasing a key only cancels movement when it
/// is the key that set the current intent, so letting go of an older key
/// never stops a newer held direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntentTracker {
    intent: Intent,
    last_pressed: Option<Direction>,
}

impl IntentTracker {
    /// Creates a tracker with no held direction.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            intent: Intent::NONE,
            last_pressed: None,
        }
    }

    /// Records a key press, which replaces the current intent.
    pub fn press(&mut self, direction: Direction) {
        self.intent = Intent::from(direction);
        self.last_pressed = Some(direction);
    }

    /// Records a key release.
    pub fn release(&mut self, direction: Direction) {
        if self.last_pressed == Some(direction) {
            self.intent = Intent::NONE;
            self.last_pressed = None;
        }
    }

    /// Intent to feed into the movement system.
    #[must_use]
    pub const fn intent(&self) -> Intent {
        self.intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_sets_intent() {
        let mut tracker = IntentTracker::new();
        tracker.press(Direction::Left);
        assert_eq!(tracker.intent(), Intent::new(-1, 0));
    }

    #[test]
    fn newest_press_wins() {
        let mut tracker = IntentTracker::new();
        tracker.press(Direction::Up);
        tracker.press(Direction::Right);
        assert_eq!(tracker.intent(), Intent::from(Direction::Right));
    }

    #[test]
    fn releasing_older_key_keeps_newer_direction() {
        let mut tracker = IntentTracker::new();
        tracker.press(Direction::Up);
        tracker.press(Direction::Right);
        tracker.release(Direction::Up);
        assert_eq!(tracker.intent(), Intent::from(Direction::Right));
    }

    #[test]
    fn releasing_newest_key_stops() {
        let mut tracker = IntentTracker::new();
        tracker.press(Direction::Up);
        tracker.press(Direction::Right);
        tracker.release(Direction::Right);
        assert!(tracker.intent().is_none());

        tracker.release(Direction::Up);
        assert!(tracker.intent().is_none());
    }
}
