//! # Kernel synchronization primitives
//!
//! Each heap instance is one serialized resource; [`SpinLock`] is the
//! mutual-exclusion domain wrapped around it. Separate heaps never share a
//! lock.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod spin_lock;

pub use spin_lock::{SpinLock, SpinLockGuard};
