use std::rc::{Rc, Weak};

use crate::context::ContextShared;
use crate::device::Gl;
use crate::error::{GfxError, Result};

use super::dispose::Lifecycle;
use super::handle::{release_all, ResourceHandle};
use super::registry::ObjectId;

/// State every GPU-backed object carries: its identity, a non-owning
/// back-reference to the context that created it, and its lifecycle.
pub(crate) struct ObjectCore {
    id: ObjectId,
    context: Weak<ContextShared>,
    lifecycle: Lifecycle,
}

impl ObjectCore {
    pub(crate) fn new(id: ObjectId, context: Weak<ContextShared>) -> Self {
        Self { id, context, lifecycle: Lifecycle::new() }
    }

    #[inline]
    pub(crate) fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }

    pub(crate) fn context(&self) -> Result<Rc<ContextShared>> {
        self.context.upgrade().ok_or(GfxError::ContextDisposed)
    }

    pub(crate) fn belongs_to(&self, context: &Rc<ContextShared>) -> bool {
        std::ptr::eq(self.context.as_ptr(), Rc::as_ptr(context))
    }

    pub(crate) fn with_gl<T>(&self, f: impl FnOnce(&mut Gl<'_>) -> Result<T>) -> Result<T> {
        self.context()?.with_gl(f)
    }

    /// Runs the object's disposal.
    ///
    /// Managed phase: deregister from the context, then `managed` with the
    /// context. Unmanaged phase: free `handles`. If the context is already
    /// gone there is nothing left to deregister from and its device has
    /// released every native object, so both phases are skipped.
    pub(crate) fn dispose(
        &self,
        what: &str,
        handles: &[ResourceHandle],
        managed: impl FnOnce(&ContextShared) -> Result<()>,
    ) -> Result<()> {
        let context = self.context.upgrade();
        self.lifecycle.run(
            || match &context {
                Some(ctx) => {
                    ctx.deregister(self.id);
                    managed(ctx)
                }
                None => Ok(()),
            },
            || match &context {
                Some(ctx) if ctx.has_device() => {
                    log::debug!("disposing {what} {:?}", self.id);
                    ctx.with_gl(|gl| release_all(gl, handles))
                }
                _ => {
                    log::warn!("{what} {:?} outlived its context; native release skipped", self.id);
                    Ok(())
                }
            },
        )
    }
}
