/// "Needs re-sync" marker of a logical resource
///
/// Set on every mutation of CPU-side data, consumed once when the change is
/// pushed to the per-context caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyFlag(bool);

impl DirtyFlag {
    /// A flag that starts dirty, for resources whose first use must sync
    pub fn dirty() -> Self {
        Self(true)
    }

    pub fn mark(&mut self) {
        self.0 = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.0
    }

    /// Clear the flag, returning whether it was set
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.0)
    }
}
