//! Reminder to save when too many objects have unsaved changes.
//!
//! Large saves are more likely to fail on the editing service, so the
//! monitor nudges the user once at `remind_at` pending changes and warns
//! once more at `warn_at`.

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// Pending-change counts at which the reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderThresholds {
    pub remind_at: u32,
    pub warn_at: u32,
}

impl Default for ReminderThresholds {
    fn default() -> Self {
        Self {
            remind_at: 100,
            warn_at: 150,
        }
    }
}

impl ReminderThresholds {
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.warn_at <= self.remind_at {
            return Err(MonitorError::Config(format!(
                "reminder warn_at ({}) must be greater than remind_at ({})",
                self.warn_at, self.remind_at
            )));
        }
        Ok(())
    }
}

/// What the UI should do after a pending-count update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderAction {
    /// Nothing changed.
    None,
    /// Show the "consider saving soon" reminder.
    Remind(u32),
    /// Show the stronger "save now" warning.
    Warn(u32),
    /// Dismiss any reminder currently shown.
    Clear,
}

/// Edge-triggered save reminder.
#[derive(Debug, Clone, Default)]
pub struct SaveReminder {
    thresholds: ReminderThresholds,
    reminded: bool,
    warned: bool,
}

impl SaveReminder {
    pub fn new(thresholds: ReminderThresholds) -> Self {
        Self {
            thresholds,
            reminded: false,
            warned: false,
        }
    }

    pub fn thresholds(&self) -> &ReminderThresholds {
        &self.thresholds
    }

    /// Returns true while a reminder or warning is being shown.
    pub fn is_active(&self) -> bool {
        self.reminded || self.warned
    }

    /// Feed the current number of objects with unsaved changes.
    pub fn update(&mut self, pending: u32) -> ReminderAction {
        if pending >= self.thresholds.warn_at && !self.warned {
            self.warned = true;
            ReminderAction::Warn(self.thresholds.warn_at)
        } else if pending >= self.thresholds.remind_at && !self.reminded {
            self.reminded = true;
            ReminderAction::Remind(self.thresholds.remind_at)
        } else if pending < self.thresholds.remind_at && self.is_active() {
            self.reset();
            ReminderAction::Clear
        } else {
            ReminderAction::None
        }
    }

    /// Forget shown reminders, e.g. after a save cleared the pending changes.
    pub fn reset(&mut self) {
        self.reminded = false;
        self.warned = false;
    }
}

impl ReminderAction {
    /// Text for the reminder, if this action shows one.
    pub fn message(&self) -> Option<String> {
        match self {
            ReminderAction::Remind(n) => Some(format!(
                "You have edited at least {} objects. You should consider saving soon.",
                n
            )),
            ReminderAction::Warn(n) => Some(format!(
                "You have edited at least {} objects. You should consider saving soon. \
                 If you get an error while saving, you may need to undo some actions and try again.",
                n
            )),
            ReminderAction::None | ReminderAction::Clear => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remind_then_warn_once_each() {
        let mut reminder = SaveReminder::default();
        assert_eq!(reminder.update(10), ReminderAction::None);
        assert_eq!(reminder.update(100), ReminderAction::Remind(100));
        assert_eq!(reminder.update(120), ReminderAction::None);
        assert_eq!(reminder.update(150), ReminderAction::Warn(150));
        assert_eq!(reminder.update(200), ReminderAction::None);
    }

    #[test]
    fn test_jump_straight_to_warn() {
        let mut reminder = SaveReminder::default();
        assert_eq!(reminder.update(300), ReminderAction::Warn(150));
        // Dropping into the remind band after a warning still reminds once.
        assert_eq!(reminder.update(110), ReminderAction::Remind(100));
    }

    #[test]
    fn test_clears_below_remind_threshold() {
        let mut reminder = SaveReminder::default();
        reminder.update(100);
        assert_eq!(reminder.update(40), ReminderAction::Clear);
        assert!(!reminder.is_active());
        assert_eq!(reminder.update(30), ReminderAction::None);
        assert_eq!(reminder.update(100), ReminderAction::Remind(100));
    }

    #[test]
    fn test_reset_after_save() {
        let mut reminder = SaveReminder::default();
        reminder.update(160);
        reminder.reset();
        assert_eq!(reminder.update(160), ReminderAction::Warn(150));
    }

    #[test]
    fn test_messages() {
        assert!(ReminderAction::Remind(100).message().unwrap().contains("100 objects"));
        assert!(ReminderAction::Warn(150).message().unwrap().contains("undo"));
        assert!(ReminderAction::Clear.message().is_none());
    }

    #[test]
    fn test_threshold_validation() {
        assert!(ReminderThresholds::default().validate().is_ok());
        let bad = ReminderThresholds {
            remind_at: 50,
            warn_at: 50,
        };
        assert!(bad.validate().is_err());
    }
}
