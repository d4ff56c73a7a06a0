//! Tracks the single player field currently under operator edit.
//!
//! The console only ever has one form field focused at a time, so the tracker
//! holds at most one intent. The view model consults it while merging an
//! incoming `players` snapshot so the focused field is not clobbered mid-edit.

/// A player attribute the operator can edit from the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerField {
    /// Display name.
    Name,
    /// Team assignment.
    TeamId,
    /// Per-hit damage.
    Damage,
    /// Magazine capacity.
    BulletsMax,
}

/// The single (player, field) pair the operator currently has focus on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditIntent {
    /// Identity of the player being edited.
    pub player_id: u32,
    /// The one field under edit; every other field still takes server values.
    pub field: PlayerField,
}

impl EditIntent {
    /// Convenience constructor.
    pub fn new(player_id: u32, field: PlayerField) -> Self {
        Self { player_id, field }
    }
}

/// Holder for the at-most-one active [`EditIntent`].
#[derive(Debug, Default)]
pub struct EditTracker {
    active: Option<EditIntent>,
}

impl EditTracker {
    /// Start tracking an edit, unconditionally superseding any previous one.
    pub fn begin_edit(&mut self, intent: EditIntent) {
        self.active = Some(intent);
    }

    /// Stop tracking an edit, but only if `intent` is still the active one.
    ///
    /// A focus-exit can arrive after a newer focus-enter has already replaced
    /// the intent; clearing unconditionally would drop the newer edit's shield.
    pub fn end_edit(&mut self, intent: EditIntent) {
        if self.active == Some(intent) {
            self.active = None;
        }
    }

    /// Whether the given pair is currently under edit.
    pub fn is_editing(&self, intent: EditIntent) -> bool {
        self.active == Some(intent)
    }

    /// The active intent, if any.
    pub fn active(&self) -> Option<EditIntent> {
        self.active
    }
}
