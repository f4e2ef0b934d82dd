use std::cell::Cell;

use crate::error::Result;

/// Position of an object in its disposal lifecycle. Transitions only move forward.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum DisposeState {
    #[default]
    Live,
    Disposing,
    Disposed,
}

/// Two-phase, idempotent release of a GPU-backed object.
///
/// Dropping an implementor without calling [`dispose`](Disposable::dispose)
/// runs the same disposal from `Drop`; an explicit call moves the object to
/// [`DisposeState::Disposed`] first, which turns the drop path into a no-op.
pub trait Disposable {
    /// Releases managed bookkeeping, then the native handle. A second call does nothing.
    fn dispose(&self) -> Result<()>;

    /// `true` once disposal has started.
    fn is_disposed(&self) -> bool;
}

/// State machine driving the managed and unmanaged phases of a disposal.
#[derive(Debug, Default)]
pub struct Lifecycle {
    state: Cell<DisposeState>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> DisposeState {
        self.state.get()
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.state.get() != DisposeState::Live
    }

    /// Runs `managed` then `unmanaged` exactly once over the object's lifetime.
    ///
    /// A failing managed phase does not skip the unmanaged phase. The managed
    /// error is reported in preference to the unmanaged one.
    pub fn run(
        &self,
        managed: impl FnOnce() -> Result<()>,
        unmanaged: impl FnOnce() -> Result<()>,
    ) -> Result<()> {
        if self.state.get() != DisposeState::Live {
            return Ok(());
        }
        self.state.set(DisposeState::Disposing);

        let managed = managed();
        let unmanaged = unmanaged();

        self.state.set(DisposeState::Disposed);
        managed.and(unmanaged)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::GfxError;

    #[test]
    fn runs_both_phases_in_order_once() {
        let lifecycle = Lifecycle::new();
        let log = RefCell::new(Vec::new());

        for _ in 0..3 {
            lifecycle
                .run(
                    || {
                        log.borrow_mut().push("managed");
                        Ok(())
                    },
                    || {
                        log.borrow_mut().push("unmanaged");
                        Ok(())
                    },
                )
                .unwrap();
        }

        assert_eq!(*log.borrow(), ["managed", "unmanaged"]);
        assert_eq!(lifecycle.state(), DisposeState::Disposed);
    }

    #[test]
    fn managed_failure_still_releases_native_side() {
        let lifecycle = Lifecycle::new();
        let released = Cell::new(false);

        let result = lifecycle.run(
            || Err(GfxError::ContextDisposed),
            || {
                released.set(true);
                Ok(())
            },
        );

        assert!(matches!(result, Err(GfxError::ContextDisposed)));
        assert!(released.get());
        assert!(lifecycle.is_disposed());
    }

    #[test]
    fn reentrant_dispose_during_managed_phase_is_ignored() {
        let lifecycle = Lifecycle::new();
        let unmanaged_runs = Cell::new(0);

        lifecycle
            .run(
                || {
                    assert_eq!(lifecycle.state(), DisposeState::Disposing);
                    lifecycle.run(|| Ok(()), || {
                        unmanaged_runs.set(unmanaged_runs.get() + 1);
                        Ok(())
                    })
                },
                || {
                    unmanaged_runs.set(unmanaged_runs.get() + 1);
                    Ok(())
                },
            )
            .unwrap();

        assert_eq!(unmanaged_runs.get(), 1);
    }
}
