#![allow(dead_code)]

use kernel_memory_addresses::{PhysicalAddress, VirtualAddress};
use kernel_vmem::{FrameHandle, FrameMapper, MapError, PagePermissions};
use std::collections::BTreeMap;

pub const PAGE: usize = 4096;

/// Physical address of frame 0 in the simulated RAM.
pub const RAM_BASE: u64 = 0x0010_0000;

/// In-memory stand-in for the frame pool and page tables.
///
/// Physical memory is a vector of 4 KiB frames; frame `n` lives at
/// `RAM_BASE + n * 4096`. Mappings are a plain `page VA -> frame` map.
pub struct SimFrameMapper {
    ram: Vec<[u8; PAGE]>,
    free: Vec<u64>,
    mappings: BTreeMap<u64, (FrameHandle, PagePermissions)>,
    /// Fail `acquire_frame` once this many frames have been handed out.
    pub acquire_budget: Option<usize>,
    /// Fail `map_page` once this many pages have been mapped.
    pub map_budget: Option<usize>,
    /// Fail every `copy_mapped` call.
    pub refuse_copy: bool,
    acquired: usize,
    mapped: usize,
}

impl SimFrameMapper {
    pub fn with_frames(n: usize) -> Self {
        Self {
            ram: vec![[0u8; PAGE]; n],
            // pop() hands out the lowest frame first
            free: (0..n as u64).rev().collect(),
            mappings: BTreeMap::new(),
            acquire_budget: None,
            map_budget: None,
            refuse_copy: false,
            acquired: 0,
            mapped: 0,
        }
    }

    pub fn free_frames(&self) -> usize {
        self.free.len()
    }

    pub fn mapped_pages(&self) -> usize {
        self.mappings.len()
    }

    pub fn permissions_at(&self, va: VirtualAddress) -> Option<PagePermissions> {
        self.mappings.get(&va.as_u64()).map(|(_, p)| *p)
    }

    fn locate(&self, va: u64) -> Result<(usize, usize), MapError> {
        let page = va & !(PAGE as u64 - 1);
        let (frame, _) = self
            .mappings
            .get(&page)
            .ok_or(MapError::NotMapped(VirtualAddress::new(page)))?;
        Ok((frame.raw() as usize, (va - page) as usize))
    }

    pub fn write(&mut self, va: VirtualAddress, bytes: &[u8]) {
        for (i, b) in bytes.iter().enumerate() {
            let (frame, off) = self
                .locate(va.as_u64() + i as u64)
                .expect("write to unmapped page");
            self.ram[frame][off] = *b;
        }
    }

    pub fn read(&self, va: VirtualAddress, len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| {
                let (frame, off) = self
                    .locate(va.as_u64() + i as u64)
                    .expect("read from unmapped page");
                self.ram[frame][off]
            })
            .collect()
    }
}

impl FrameMapper for SimFrameMapper {
    fn acquire_frame(&mut self) -> Result<FrameHandle, MapError> {
        if self.acquire_budget.is_some_and(|b| self.acquired >= b) {
            return Err(MapError::OutOfMemory);
        }
        let n = self.free.pop().ok_or(MapError::OutOfMemory)?;
        self.acquired += 1;
        Ok(FrameHandle::new(n))
    }

    fn release_frame(&mut self, frame: FrameHandle) {
        assert!(!self.free.contains(&frame.raw()), "double release of {frame:?}");
        self.ram[frame.raw() as usize] = [0u8; PAGE];
        self.free.push(frame.raw());
    }

    fn map_page(
        &mut self,
        frame: FrameHandle,
        va: VirtualAddress,
        permissions: PagePermissions,
    ) -> Result<(), MapError> {
        if self.map_budget.is_some_and(|b| self.mapped >= b) {
            return Err(MapError::OutOfMemory);
        }
        assert_eq!(va.as_u64() % PAGE as u64, 0, "unaligned map");
        let previous = self.mappings.insert(va.as_u64(), (frame, permissions));
        assert!(previous.is_none(), "page {va} mapped twice");
        self.mapped += 1;
        Ok(())
    }

    fn unmap_page(&mut self, va: VirtualAddress) -> Option<FrameHandle> {
        self.mappings.remove(&va.as_u64()).map(|(f, _)| f)
    }

    fn frame_behind(&self, va: VirtualAddress) -> Option<FrameHandle> {
        self.mappings.get(&va.as_u64()).map(|(f, _)| *f)
    }

    fn physical_address_of(&self, frame: FrameHandle) -> PhysicalAddress {
        PhysicalAddress::new(RAM_BASE + frame.raw() * PAGE as u64)
    }

    fn copy_mapped(
        &mut self,
        src: VirtualAddress,
        dst: VirtualAddress,
        len: usize,
    ) -> Result<(), MapError> {
        if self.refuse_copy {
            return Err(MapError::NotMapped(src));
        }
        let bytes = (0..len)
            .map(|i| {
                let (frame, off) = self.locate(src.as_u64() + i as u64)?;
                Ok(self.ram[frame][off])
            })
            .collect::<Result<Vec<u8>, MapError>>()?;
        for (i, b) in bytes.into_iter().enumerate() {
            let (frame, off) = self.locate(dst.as_u64() + i as u64)?;
            self.ram[frame][off] = b;
        }
        Ok(())
    }
}
