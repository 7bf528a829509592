// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Execution contexts and context owned state.
//!
//! The controller runs in three contexts: the foreground loop ([MainCtx]),
//! the low priority interrupt level ([LowCtx]) and the high priority
//! interrupt level ([HighCtx]). Holding a reference to a context token proves
//! that the holder is running in that context.
//!
//! State that is only ever touched from one context lives in a cell that
//! can only be accessed with the owning token ([LowCell], [LowRefCell],
//! [HighCell]). State that crosses contexts lives in [Shared], which runs
//! every access inside of a critical section.

use core::{
    cell::{Cell, RefCell, RefMut, UnsafeCell},
    mem::MaybeUninit,
};
use critical_section::{CriticalSection, Mutex};

macro_rules! define_context {
    ($name:ident) => {
        pub struct $name<'cs>(CriticalSection<'cs>);

        impl<'cs> $name<'cs> {
            /// Create a new context.
            ///
            /// # SAFETY
            ///
            /// This may only be called from the corresponding context.
            /// `MainCtx` may only be constructed from `main()`,
            /// `LowCtx` may only be constructed from the low priority handler and
            /// `HighCtx` may only be constructed from the high priority handlers.
            #[inline(always)]
            pub unsafe fn new() -> Self {
                // SAFETY: This cs is used with the low level Mutex primitives.
                //         The IRQ safety is upheld by the context machinery instead.
                //
                //         If a function takes a `HighCtx` argument, it can only be
                //         called from the high priority context. Correspondingly for
                //         the other contexts.
                //
                //         The context cells can only be used with their own token.
                //         With this mechanism the lower contexts can run with IRQs
                //         enabled. There cannot be any concurrency in safe code.
                let cs = unsafe { CriticalSection::new() };
                fence();
                Self(cs)
            }

            /// Get the `CriticalSection` that belongs to this context.
            #[inline(always)]
            pub fn cs(&self) -> CriticalSection<'cs> {
                self.0
            }
        }

        impl<'cs> Drop for $name<'cs> {
            #[inline(always)]
            fn drop(&mut self) {
                fence();
            }
        }
    };
}

define_context!(MainCtx);
define_context!(LowCtx);
define_context!(HighCtx);

macro_rules! define_cell {
    ($name:ident, $ctx:ident) => {
        /// Cell that may only be accessed from its owning context.
        pub struct $name<T> {
            inner: Mutex<Cell<T>>,
        }

        impl<T> $name<T> {
            #[inline]
            pub const fn new(inner: T) -> Self {
                Self {
                    inner: Mutex::new(Cell::new(inner)),
                }
            }

            #[inline]
            pub fn replace(&self, c: &$ctx<'_>, inner: T) -> T {
                self.inner.borrow(c.cs()).replace(inner)
            }
        }

        impl<T: Copy> $name<T> {
            #[inline]
            pub fn get(&self, c: &$ctx<'_>) -> T {
                self.inner.borrow(c.cs()).get()
            }

            #[inline]
            pub fn set(&self, c: &$ctx<'_>, inner: T) {
                self.inner.borrow(c.cs()).set(inner);
            }
        }
    };
}

define_cell!(LowCell, LowCtx);
define_cell!(HighCell, HighCtx);

/// Borrow checked cell owned by the low priority context.
///
/// A conflicting borrow panics.
pub struct LowRefCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> LowRefCell<T> {
    #[inline]
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    #[inline]
    pub fn borrow_mut<'cs>(&'cs self, c: &LowCtx<'cs>) -> RefMut<'cs, T> {
        self.inner.borrow(c.cs()).borrow_mut()
    }
}

/// State shared between contexts.
///
/// Every access runs in a critical section. Multi-step read-modify-write
/// sequences must use [Shared::update].
pub struct Shared<T> {
    inner: Mutex<Cell<T>>,
}

impl<T: Copy> Shared<T> {
    #[inline]
    pub const fn new(inner: T) -> Self {
        Self {
            inner: Mutex::new(Cell::new(inner)),
        }
    }

    #[inline]
    pub fn load(&self) -> T {
        critical_section::with(|cs| self.inner.borrow(cs).get())
    }

    /// Atomically modify the value.
    #[inline]
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        critical_section::with(|cs| {
            let cell = self.inner.borrow(cs);
            let mut value = cell.get();
            let ret = f(&mut value);
            cell.set(value);
            ret
        })
    }
}

/// Main context initialization marker.
///
/// This marker does not have a pub constructor.
/// It is only created by [MainCtx::new_with_init].
pub struct MainInitCtx(());

impl<'cs> MainCtx<'cs> {
    /// Run the static initialization and create the main context afterwards.
    ///
    /// # SAFETY
    ///
    /// The safety contract of [MainCtx::new] must be upheld.
    /// Interrupts must be disabled.
    #[inline(always)]
    pub unsafe fn new_with_init<F: FnOnce(&MainInitCtx)>(f: F) -> Self {
        f(&MainInitCtx(()));
        // SAFETY: Safety contract of MainCtx::new is upheld by the caller.
        unsafe { Self::new() }
    }
}

/// Lazy initialization of static variables.
pub struct LazyInit<T>(UnsafeCell<MaybeUninit<T>>);

impl<T> LazyInit<T> {
    /// # SAFETY
    ///
    /// It must be ensured that the returned instance is initialized
    /// with a call to [Self::init] during construction of the [MainCtx].
    /// See [MainCtx::new_with_init].
    ///
    /// Using this object in any way before initializing it will
    /// result in Undefined Behavior.
    #[inline(always)]
    pub const unsafe fn uninit() -> Self {
        Self(UnsafeCell::new(MaybeUninit::uninit()))
    }

    #[inline(always)]
    pub fn init(&self, _m: &MainInitCtx, inner: T) {
        // SAFETY: Initialization happens with interrupts disabled before any user exists.
        unsafe { *self.0.get() = MaybeUninit::new(inner) };
    }

    #[inline(always)]
    pub fn get(&self) -> &T {
        // SAFETY: the `Self::uninit` safety contract ensures that `Self::init` is called before us.
        unsafe { (*self.0.get()).assume_init_ref() }
    }
}

// SAFETY: The object only contains T state and is never mutated after init.
unsafe impl<T: Sync> Sync for LazyInit<T> {}

/// Optimization and reordering fence.
#[inline(always)]
pub fn fence() {
    core::sync::atomic::fence(core::sync::atomic::Ordering::SeqCst);
}


// vim: ts=4 sw=4 expandtab
