//! Exit-then-enter choreography.
//!
//! A presence region mounts at most one branch at a time. Replacing the
//! branch first plays the current branch's exit; only when that stage ends
//! is the successor mounted and entered. Requests made while an exit is in
//! flight replace the pending successor (last request wins) and never cut
//! the exit short, so two branches are never visible together.
//!
//! Stage ends are reported by the host through timers stamped with the
//! region's epoch. Every stage change bumps the epoch, which turns any
//! timer from an earlier stage into a no-op.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Entering,
    Present,
    Exiting,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Entering => "entering",
            Stage::Present => "present",
            Stage::Exiting => "exiting",
        }
    }
}

/// What a request or stage end changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<K> {
    Unchanged,
    /// The mounted branch started its exit.
    ExitStarted,
    /// A branch was mounted and started entering.
    Mounted(K),
    /// The entering branch came to rest.
    Settled,
    /// The last branch finished exiting; the region is empty.
    Emptied,
}

#[derive(Debug, Clone)]
pub struct Presence<K> {
    mounted: Option<(K, Stage)>,
    pending: Option<K>,
    epoch: u64,
}

impl<K: Clone + PartialEq> Presence<K> {
    pub fn empty() -> Self {
        Self {
            mounted: None,
            pending: None,
            epoch: 0,
        }
    }

    /// Start with `branch` already at rest (no enter animation).
    pub fn with(branch: K) -> Self {
        Self {
            mounted: Some((branch, Stage::Present)),
            pending: None,
            epoch: 0,
        }
    }

    pub fn mounted(&self) -> Option<(&K, Stage)> {
        self.mounted.as_ref().map(|(k, s)| (k, *s))
    }

    pub fn stage(&self) -> Option<Stage> {
        self.mounted.as_ref().map(|(_, s)| *s)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Ask for `next` to be the mounted branch (`None` = nothing mounted).
    pub fn request(&mut self, next: Option<K>) -> Change<K> {
        match self.mounted.as_mut() {
            None => match next {
                None => Change::Unchanged,
                Some(branch) => {
                    self.mounted = Some((branch.clone(), Stage::Entering));
                    self.epoch += 1;
                    Change::Mounted(branch)
                }
            },
            Some((_, Stage::Exiting)) => {
                self.pending = next;
                Change::Unchanged
            }
            Some((current, stage)) => {
                if next.as_ref() == Some(&*current) {
                    return Change::Unchanged;
                }
                *stage = Stage::Exiting;
                self.pending = next;
                self.epoch += 1;
                Change::ExitStarted
            }
        }
    }

    /// The stage started at `epoch` finished playing.
    pub fn stage_ended(&mut self, epoch: u64) -> Change<K> {
        if epoch != self.epoch {
            return Change::Unchanged;
        }
        match self.mounted.take() {
            Some((branch, Stage::Entering)) => {
                self.mounted = Some((branch, Stage::Present));
                self.epoch += 1;
                Change::Settled
            }
            Some((_, Stage::Exiting)) => {
                self.epoch += 1;
                match self.pending.take() {
                    Some(next) => {
                        self.mounted = Some((next.clone(), Stage::Entering));
                        Change::Mounted(next)
                    }
                    None => Change::Emptied,
                }
            }
            other => {
                self.mounted = other;
                Change::Unchanged
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Branch {
        A,
        B,
    }

    #[test]
    fn mount_from_empty_enters() {
        let mut p = Presence::empty();
        assert_eq!(p.request(Some(Branch::A)), Change::Mounted(Branch::A));
        assert_eq!(p.mounted(), Some((&Branch::A, Stage::Entering)));
        let epoch = p.epoch();
        assert_eq!(p.stage_ended(epoch), Change::Settled);
        assert_eq!(p.stage(), Some(Stage::Present));
    }

    #[test]
    fn swap_exits_before_entering() {
        let mut p = Presence::with(Branch::A);
        assert_eq!(p.request(Some(Branch::B)), Change::ExitStarted);
        // Still only the old branch while it exits.
        assert_eq!(p.mounted(), Some((&Branch::A, Stage::Exiting)));
        let epoch = p.epoch();
        assert_eq!(p.stage_ended(epoch), Change::Mounted(Branch::B));
        assert_eq!(p.mounted(), Some((&Branch::B, Stage::Entering)));
    }

    #[test]
    fn requesting_current_branch_is_noop() {
        let mut p = Presence::with(Branch::A);
        assert_eq!(p.request(Some(Branch::A)), Change::Unchanged);
        assert_eq!(p.epoch(), 0);
    }

    #[test]
    fn unmount_empties_after_exit() {
        let mut p = Presence::with(Branch::A);
        assert_eq!(p.request(None), Change::ExitStarted);
        let epoch = p.epoch();
        assert_eq!(p.stage_ended(epoch), Change::Emptied);
        assert_eq!(p.mounted(), None);
    }

    #[test]
    fn last_request_during_exit_wins() {
        let mut p = Presence::with(Branch::A);
        p.request(None);
        assert_eq!(p.request(Some(Branch::A)), Change::Unchanged);
        assert_eq!(p.request(None), Change::Unchanged);
        let epoch = p.epoch();
        assert_eq!(p.stage_ended(epoch), Change::Emptied);
    }

    #[test]
    fn stale_stage_end_is_ignored() {
        let mut p = Presence::empty();
        p.request(Some(Branch::A));
        let entering = p.epoch();
        p.request(None);
        assert_eq!(p.stage_ended(entering), Change::Unchanged);
        assert_eq!(p.stage(), Some(Stage::Exiting));
    }

    #[test]
    fn stage_end_when_present_is_noop() {
        let mut p = Presence::with(Branch::A);
        assert_eq!(p.stage_ended(0), Change::Unchanged);
        assert_eq!(p.mounted(), Some((&Branch::A, Stage::Present)));
    }
}
