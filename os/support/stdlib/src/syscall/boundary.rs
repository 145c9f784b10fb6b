use super::syscall5;
use crate::boundary::{KernelBoundary, OwnerId};
use crate::syscall_abi::Sysno;
use heap_core::{BoundaryError, SharedObjectId, VirtualAddress};

/// [`KernelBoundary`] over the `syscall` instruction.
#[derive(Debug, Default, Copy, Clone)]
pub struct SyscallBoundary;

impl SyscallBoundary {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[inline]
fn call(n: Sysno, args: [u64; 5]) -> Result<u64, BoundaryError> {
    // SAFETY: every pointer passed here comes from a live `&str` borrowed
    // for the duration of the call.
    let ret = unsafe { syscall5(n, args) };
    u64::try_from(ret).map_err(|_| BoundaryError::from_code(ret))
}

#[inline]
fn name_args(name: &str) -> (u64, u64) {
    (name.as_ptr() as u64, name.len() as u64)
}

#[allow(clippy::cast_possible_wrap)]
fn object_id(raw: u64) -> Result<SharedObjectId, BoundaryError> {
    u32::try_from(raw)
        .map(SharedObjectId)
        .map_err(|_| BoundaryError::Rejected(raw as i64))
}

impl KernelBoundary for SyscallBoundary {
    fn back_memory(&mut self, va: VirtualAddress, size: usize) -> Result<(), BoundaryError> {
        call(Sysno::AllocateMem, [va.as_u64(), size as u64, 0, 0, 0]).map(|_| ())
    }

    fn unback_memory(&mut self, va: VirtualAddress, size: usize) -> Result<(), BoundaryError> {
        call(Sysno::FreeMem, [va.as_u64(), size as u64, 0, 0, 0]).map(|_| ())
    }

    fn move_memory(
        &mut self,
        src: VirtualAddress,
        dst: VirtualAddress,
        size: usize,
    ) -> Result<(), BoundaryError> {
        call(
            Sysno::MoveMem,
            [src.as_u64(), dst.as_u64(), size as u64, 0, 0],
        )
        .map(|_| ())
    }

    fn placement_is_best_fit(&self) -> bool {
        matches!(call(Sysno::IsBestFit, [0; 5]), Ok(1))
    }

    fn create_shared_object(
        &mut self,
        name: &str,
        size: usize,
        writable: bool,
        va: VirtualAddress,
    ) -> Result<SharedObjectId, BoundaryError> {
        let (ptr, len) = name_args(name);
        let raw = call(
            Sysno::CreateSharedObject,
            [ptr, len, size as u64, u64::from(writable), va.as_u64()],
        )?;
        object_id(raw)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn shared_object_size(&self, owner: OwnerId, name: &str) -> Result<usize, BoundaryError> {
        let (ptr, len) = name_args(name);
        call(
            Sysno::GetSharedObjectSize,
            [u64::from(owner.0), ptr, len, 0, 0],
        )
        .map(|size| size as usize)
    }

    fn attach_shared_object(
        &mut self,
        owner: OwnerId,
        name: &str,
        va: VirtualAddress,
    ) -> Result<SharedObjectId, BoundaryError> {
        let (ptr, len) = name_args(name);
        let raw = call(
            Sysno::GetSharedObject,
            [u64::from(owner.0), ptr, len, va.as_u64(), 0],
        )?;
        object_id(raw)
    }

    fn detach_shared_object(&mut self, id: SharedObjectId) -> Result<(), BoundaryError> {
        call(Sysno::FreeSharedObject, [u64::from(id.0), 0, 0, 0, 0]).map(|_| ())
    }
}
