use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::device::{Gl, GpuCommands};
use crate::error::{GfxError, Result};
use crate::resource::{Disposable, ObjectCore, ObjectId, Registry, TextureUnit, TextureUnitAllocator};

/// Tables a context shares with the objects it creates.
///
/// Objects reach this through a `Weak` back-reference and only ever call the
/// methods below; they never touch the tables directly.
pub(crate) struct ContextShared {
    device: RefCell<Option<Box<dyn GpuCommands>>>,
    units: RefCell<TextureUnitAllocator>,
    registry: RefCell<Registry>,
    disposing: Cell<bool>,
    program: Cell<u32>,
}

impl ContextShared {
    pub(crate) fn new(device: Box<dyn GpuCommands>, texture_units: usize) -> Self {
        Self {
            device: RefCell::new(Some(device)),
            units: RefCell::new(TextureUnitAllocator::new(texture_units)),
            registry: RefCell::new(Registry::default()),
            disposing: Cell::new(false),
            program: Cell::new(0),
        }
    }

    /// Runs `f` against the error-checked device.
    ///
    /// Must not be nested: the device is borrowed for the duration of `f`.
    pub(crate) fn with_gl<T>(&self, f: impl FnOnce(&mut Gl<'_>) -> Result<T>) -> Result<T> {
        let mut device = self.device.borrow_mut();
        let raw = device.as_deref_mut().ok_or(GfxError::ContextDisposed)?;
        f(&mut Gl::new(raw))
    }

    pub(crate) fn has_device(&self) -> bool {
        self.device.borrow().is_some()
    }

    #[inline]
    pub(crate) fn is_disposing(&self) -> bool {
        self.disposing.get()
    }

    /// Fails once teardown has started; new objects would escape the cascade.
    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.disposing.get() || !self.has_device() {
            return Err(GfxError::ContextDisposed);
        }
        Ok(())
    }

    // ── texture units ────────────────────────────────────────────────────

    pub(crate) fn allocate_unit(&self) -> Result<TextureUnit> {
        self.ensure_live()?;
        self.units.borrow_mut().allocate()
    }

    pub(crate) fn deallocate_unit(&self, unit: TextureUnit) {
        self.units.borrow_mut().deallocate(unit);
    }

    pub(crate) fn units_in_use(&self) -> usize {
        self.units.borrow().in_use()
    }

    pub(crate) fn unit_capacity(&self) -> usize {
        self.units.borrow().capacity()
    }

    // ── registry ─────────────────────────────────────────────────────────

    /// Builds an object around a fresh [`ObjectCore`] and registers it.
    pub(crate) fn adopt<T>(self: &Rc<Self>, make: impl FnOnce(ObjectCore) -> T) -> Rc<T>
    where
        T: Disposable + 'static,
    {
        let id = self.registry.borrow_mut().next_id();
        let object = Rc::new(make(ObjectCore::new(id, Rc::downgrade(self))));
        let weak: Weak<T> = Rc::downgrade(&object);
        self.registry.borrow_mut().register(id, weak);
        object
    }

    pub(crate) fn deregister(&self, id: ObjectId) {
        self.registry.borrow_mut().deregister(id);
    }

    pub(crate) fn live_objects(&self) -> usize {
        self.registry.borrow().len()
    }

    // ── bound program ────────────────────────────────────────────────────

    pub(crate) fn use_program(&self, program: u32) -> Result<()> {
        if self.program.get() == program {
            log::trace!("program {program} already bound");
            return Ok(());
        }
        self.with_gl(|gl| gl.use_program(program))?;
        self.program.set(program);
        Ok(())
    }

    /// Drops the cached binding if `program` is the one bound.
    pub(crate) fn forget_program(&self, program: u32) {
        if self.program.get() == program {
            self.program.set(0);
        }
    }

    // ── teardown ─────────────────────────────────────────────────────────

    /// Disposes every registered object still alive, then discards the unit table.
    ///
    /// The registry is drained before any object runs, so deregistration
    /// during the cascade finds nothing and never re-enters the table.
    pub(crate) fn cascade(&self) -> Result<()> {
        self.disposing.set(true);
        let objects = self.registry.borrow_mut().drain();
        log::debug!("cascading disposal over {} registered objects", objects.len());

        let mut result = Ok(());
        for object in objects.iter().filter_map(Weak::upgrade) {
            if object.is_disposed() {
                continue;
            }
            if let Err(err) = object.dispose() {
                log::warn!("object disposal failed during context teardown: {err}");
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }

        self.units.borrow_mut().clear();
        self.program.set(0);
        result
    }

    /// Hands the device its release hook and forgets it. Later device access
    /// fails with [`GfxError::ContextDisposed`].
    pub(crate) fn release_device(&self) {
        let device = self.device.borrow_mut().take();
        if let Some(mut device) = device {
            device.release();
            log::debug!("native device released");
        }
    }
}
