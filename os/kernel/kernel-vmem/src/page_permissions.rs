use bitfield_struct::bitfield;

/// Permission bits requested for a single leaf mapping.
///
/// Mirrors the low bits of an x86-64 page table entry so implementors can
/// translate it with a couple of shifts.
///
/// | Bit | Name | Meaning |
/// |-----|------|---------|
/// | 0 | `present` | Mapping is valid. |
/// | 1 | `writable` | Writes allowed. |
/// | 2 | `user_access` | Accessible from CPL3. |
/// | 7 | `no_execute` | Instruction fetches disallowed. |
///
/// ### Example
/// ```rust
/// # use kernel_vmem::PagePermissions;
/// let p = PagePermissions::kernel_rw();
/// assert!(p.present() && p.writable() && !p.user_access());
/// ```
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct PagePermissions {
    pub present: bool,
    pub writable: bool,
    pub user_access: bool,
    #[bits(4)]
    __: u8,
    pub no_execute: bool,
}

impl PagePermissions {
    /// Present + writable, supervisor only. Used for every kernel heap page.
    #[inline]
    #[must_use]
    pub const fn kernel_rw() -> Self {
        Self::new()
            .with_present(true)
            .with_writable(true)
            .with_user_access(false)
            .with_no_execute(true)
    }

    /// Present + writable + user accessible.
    #[inline]
    #[must_use]
    pub const fn user_rw() -> Self {
        Self::kernel_rw().with_user_access(true)
    }
}
