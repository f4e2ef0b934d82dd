//! Lifetime management of GPU-backed objects.
//!
//! - [`ResourceHandle`]: a native name plus the routine that frees it
//! - [`Disposable`] / [`Lifecycle`]: the two-phase, idempotent disposal protocol
//! - [`TextureUnitAllocator`]: circular first-fit allocation of texture units
//! - the registry through which a context reaches every object it created

mod dispose;
mod handle;
mod object;
mod registry;
mod units;

pub use dispose::{Disposable, DisposeState, Lifecycle};
pub use handle::{ResourceHandle, ResourceKind};
pub use registry::ObjectId;
pub use units::{TextureUnit, TextureUnitAllocator};

pub(crate) use object::ObjectCore;
pub(crate) use registry::Registry;
