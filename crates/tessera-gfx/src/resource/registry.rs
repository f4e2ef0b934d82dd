use std::rc::Weak;

use super::dispose::Disposable;

/// Identity of a GPU-backed object within its context.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

/// Live objects created through a context, in creation order.
///
/// Entries are weak: the registry never keeps an object alive, it only lets the
/// context reach objects the client still holds when the context tears down.
#[derive(Default)]
pub(crate) struct Registry {
    next: u64,
    entries: Vec<(ObjectId, Weak<dyn Disposable>)>,
}

impl Registry {
    pub(crate) fn next_id(&mut self) -> ObjectId {
        self.next += 1;
        ObjectId(self.next)
    }

    pub(crate) fn register(&mut self, id: ObjectId, object: Weak<dyn Disposable>) {
        self.entries.push((id, object));
    }

    /// Removes `id`; returns `false` if it was not registered.
    pub(crate) fn deregister(&mut self, id: ObjectId) -> bool {
        match self.entries.iter().position(|(entry, _)| *entry == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Empties the registry, handing back every entry in creation order.
    pub(crate) fn drain(&mut self) -> Vec<Weak<dyn Disposable>> {
        self.entries.drain(..).map(|(_, object)| object).collect()
    }
}
