use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

/// A single-threaded shared handle to a long-lived engine system.
///
/// GPU objects such as the `Device`, the `Queue` and the buffer registry are
/// owned jointly by several renderer components. `StSystem` gives each of them
/// a cheap clone of the same `Rc<RefCell<T>>` so they can borrow the system for
/// the duration of a call without holding it across frames.
///
/// # Examples
/// ```ignore
/// let counter = StSystem::new(0u32);
/// let shared = counter.clone();
/// *shared.get_mut() += 1;
/// assert_eq!(*counter.get(), 1);
/// ```
///
/// # Panics
/// Borrowing follows `RefCell` rules: `get_mut` panics while any other borrow
/// is alive, and `get` panics while a mutable borrow is alive.
pub struct StSystem<T> {
    system: Rc<RefCell<T>>,
}

impl<T> StSystem<T> {
    /// Wraps a system so it can be shared between renderer components.
    pub fn new(system: T) -> Self {
        Self {
            system: Rc::new(RefCell::new(system)),
        }
    }

    /// Borrows the system immutably.
    pub fn get(&self) -> Ref<'_, T> {
        self.system.borrow()
    }

    /// Borrows the system mutably.
    pub fn get_mut(&self) -> RefMut<'_, T> {
        self.system.borrow_mut()
    }
}

impl<T> Clone for StSystem<T> {
    fn clone(&self) -> Self {
        Self {
            system: self.system.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_system() {
        let registry = StSystem::new(vec![1u32, 2]);
        let handle = registry.clone();

        handle.get_mut().push(3);

        assert_eq!(registry.get().as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn separate_systems_are_distinct() {
        let a = StSystem::new(0u8);
        let b = StSystem::new(0u8);
        *a.get_mut() = 7;
        assert_eq!(*b.get(), 0);
    }

    #[test]
    #[should_panic]
    fn overlapping_mutable_borrow_panics() {
        let system = StSystem::new(5i32);
        let _read = system.get();
        let _write = system.get_mut();
    }
}
