//! Critical-section cell.

use core::cell::RefCell;
use critical_section::Mutex;

/// `RefCell` behind a `critical_section::Mutex`
///
/// Usable from `static`s; every access masks interrupts for the length of the
/// closure.
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Wrap `value`
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` with exclusive access.
    ///
    /// # Panics
    /// If called again from inside `f` (the cell is already borrowed).
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Like [`with`](Self::with), but `None` instead of a panic on reentry
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            self.inner
                .borrow(cs)
                .try_borrow_mut()
                .ok()
                .map(|mut value| f(&mut value))
        })
    }

    /// Swap in `value`, returning the old one
    pub fn replace(&self, value: T) -> T {
        critical_section::with(|cs| self.inner.borrow(cs).replace(value))
    }

    /// Unwrap the value
    pub fn into_inner(self) -> T {
        self.inner.into_inner().into_inner()
    }
}

impl<T: Default> Default for CriticalSectionCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
