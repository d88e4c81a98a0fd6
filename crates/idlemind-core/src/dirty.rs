/// Tracks which parts of a session changed since the last re-evaluation pass.
///
/// Every mutation marks one or more flags; the session's re-evaluation pass
/// [`take`](DirtyFlags::take)s them to decide which watchers to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyFlags {
    bits: u16,
}

impl DirtyFlags {
    /// Money, data, compute, stats or bonuses.
    pub const STATS: u16 = 1 << 0;
    /// The unlocked job-type list.
    pub const UNLOCKS: u16 = 1 << 1;
    /// Completed one-shot jobs or the completion counter.
    pub const COMPLETIONS: u16 = 1 << 2;
    /// The set of job types ever run.
    pub const JOBS_RUN: u16 = 1 << 3;
    /// The active screen.
    pub const SCREEN: u16 = 1 << 4;
    pub const CHAPTER: u16 = 1 << 5;
    /// Story-choice job unlocks.
    pub const CHOICES: u16 = 1 << 6;
    /// Chapter clock advanced.
    pub const CLOCK: u16 = 1 << 7;
    pub const ALL: u16 = (1 << 8) - 1;

    /// Create a tracker with nothing dirty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker with everything dirty, for a fresh session.
    pub fn all() -> Self {
        Self { bits: Self::ALL }
    }

    pub fn mark(&mut self, flags: u16) {
        self.bits |= flags;
    }

    /// Returns `true` if any of `flags` is dirty.
    pub fn any(&self, flags: u16) -> bool {
        self.bits & flags != 0
    }

    /// Returns `true` if anything has been marked dirty since the last clean.
    pub fn is_dirty(&self) -> bool {
        self.bits != 0
    }

    /// Take the current flags and reset to clean.
    pub fn take(&mut self) -> DirtyFlags {
        std::mem::take(self)
    }

    /// Reset all dirty flags, marking everything as clean.
    pub fn mark_clean(&mut self) {
        self.bits = 0;
    }
}
