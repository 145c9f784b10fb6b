//! In-memory kernel for exercising the process heap.

use crate::boundary::{KernelBoundary, OwnerId};
use crate::heap::ProcessHeap;
use heap_core::{
    BoundaryError, HeapConfig, PAGE_SIZE, Region, SharedObjectId, SlotPolicy, VirtualAddress,
};
use kernel_info::memory::USER_HEAP_START;
use std::collections::BTreeMap;

pub const PAGE: usize = PAGE_SIZE;
pub const BASE: u64 = USER_HEAP_START;

pub fn heap(pages: u64) -> ProcessHeap<SimKernel> {
    heap_with(pages, SlotPolicy::Monotonic)
}

pub fn heap_with(pages: u64, policy: SlotPolicy) -> ProcessHeap<SimKernel> {
    let region = Region::new(BASE, BASE + pages * PAGE as u64).unwrap();
    ProcessHeap::with_config(region, SimKernel::default(), HeapConfig::new(policy))
}

#[derive(Debug, Clone)]
pub struct SimObject {
    pub owner: OwnerId,
    pub name: String,
    pub size: usize,
    pub writable: bool,
    pub id: SharedObjectId,
}

/// Backing store, shared-object registry and strategy flag of one process.
pub struct SimKernel {
    pub best_fit: bool,
    /// Number of further `back_memory` calls that succeed.
    pub back_budget: Option<usize>,
    /// Refuse `unback_memory` for the range starting here.
    pub refuse_unback: Option<VirtualAddress>,
    pub refuse_move: bool,
    pub refuse_attach: bool,
    /// Fail size queries as if the kernel were out of memory.
    pub refuse_size: bool,
    /// Process the heap belongs to.
    pub current: OwnerId,
    pub objects: Vec<SimObject>,
    /// Object id to the address it is attached at in this process.
    pub attached: BTreeMap<u32, VirtualAddress>,
    pages: BTreeMap<u64, Box<[u8; PAGE]>>,
}

impl Default for SimKernel {
    fn default() -> Self {
        Self {
            best_fit: true,
            back_budget: None,
            refuse_unback: None,
            refuse_move: false,
            refuse_attach: false,
            refuse_size: false,
            current: OwnerId(1),
            objects: Vec::new(),
            attached: BTreeMap::new(),
            pages: BTreeMap::new(),
        }
    }
}

impl SimKernel {
    pub fn backed_pages(&self) -> usize {
        self.pages.len()
    }

    pub fn is_backed(&self, va: VirtualAddress) -> bool {
        self.pages.contains_key(&page_of(va.as_u64()))
    }

    pub fn write(&mut self, va: VirtualAddress, bytes: &[u8]) {
        for (i, b) in bytes.iter().enumerate() {
            let at = va.as_u64() + i as u64;
            let page = self.pages.get_mut(&page_of(at)).expect("write to unbacked page");
            page[offset_of(at)] = *b;
        }
    }

    pub fn read(&self, va: VirtualAddress, len: usize) -> Vec<u8> {
        (0..len as u64)
            .map(|i| {
                let at = va.as_u64() + i;
                self.pages.get(&page_of(at)).expect("read from unbacked page")[offset_of(at)]
            })
            .collect()
    }

    fn back(&mut self, va: VirtualAddress, size: usize) -> Result<(), BoundaryError> {
        let range = page_range(va, size);
        if range.clone().any(|p| self.pages.contains_key(&p)) {
            return Err(BoundaryError::Rejected(-17));
        }
        for p in range {
            self.pages.insert(p, Box::new([0; PAGE]));
        }
        Ok(())
    }

    fn unback(&mut self, va: VirtualAddress, size: usize) {
        for p in page_range(va, size) {
            self.pages.remove(&p);
        }
    }
}

fn page_of(at: u64) -> u64 {
    at & !(PAGE as u64 - 1)
}

fn offset_of(at: u64) -> usize {
    (at & (PAGE as u64 - 1)) as usize
}

fn page_range(va: VirtualAddress, size: usize) -> impl Iterator<Item = u64> + Clone {
    let start = va.as_u64();
    (0..size.div_ceil(PAGE) as u64).map(move |i| start + i * PAGE as u64)
}

impl KernelBoundary for SimKernel {
    fn back_memory(&mut self, va: VirtualAddress, size: usize) -> Result<(), BoundaryError> {
        if let Some(budget) = self.back_budget.as_mut() {
            if *budget == 0 {
                return Err(BoundaryError::NoMemory);
            }
            *budget -= 1;
        }
        self.back(va, size)
    }

    fn unback_memory(&mut self, va: VirtualAddress, size: usize) -> Result<(), BoundaryError> {
        if self.refuse_unback == Some(va) {
            return Err(BoundaryError::Rejected(-1_000));
        }
        self.unback(va, size);
        Ok(())
    }

    fn move_memory(
        &mut self,
        src: VirtualAddress,
        dst: VirtualAddress,
        size: usize,
    ) -> Result<(), BoundaryError> {
        if self.refuse_move {
            return Err(BoundaryError::Rejected(-14));
        }
        let bytes = self.read(src, size);
        self.write(dst, &bytes);
        Ok(())
    }

    fn placement_is_best_fit(&self) -> bool {
        self.best_fit
    }

    fn create_shared_object(
        &mut self,
        name: &str,
        size: usize,
        writable: bool,
        va: VirtualAddress,
    ) -> Result<SharedObjectId, BoundaryError> {
        if self
            .objects
            .iter()
            .any(|o| o.owner == self.current && o.name == name)
        {
            return Err(BoundaryError::AlreadyExists);
        }
        self.back(va, size)?;
        let id = SharedObjectId(u32::try_from(self.objects.len()).unwrap() + 100);
        self.objects.push(SimObject {
            owner: self.current,
            name: name.into(),
            size,
            writable,
            id,
        });
        self.attached.insert(id.0, va);
        Ok(id)
    }

    fn shared_object_size(&self, owner: OwnerId, name: &str) -> Result<usize, BoundaryError> {
        if self.refuse_size {
            return Err(BoundaryError::NoMemory);
        }
        self.objects
            .iter()
            .find(|o| o.owner == owner && o.name == name)
            .map(|o| o.size)
            .ok_or(BoundaryError::NotFound)
    }

    fn attach_shared_object(
        &mut self,
        owner: OwnerId,
        name: &str,
        va: VirtualAddress,
    ) -> Result<SharedObjectId, BoundaryError> {
        if self.refuse_attach {
            return Err(BoundaryError::NoMemory);
        }
        let object = self
            .objects
            .iter()
            .find(|o| o.owner == owner && o.name == name)
            .cloned()
            .ok_or(BoundaryError::NotFound)?;
        self.back(va, object.size)?;
        self.attached.insert(object.id.0, va);
        Ok(object.id)
    }

    fn detach_shared_object(&mut self, id: SharedObjectId) -> Result<(), BoundaryError> {
        let va = self.attached.remove(&id.0).ok_or(BoundaryError::NotFound)?;
        let size = self
            .objects
            .iter()
            .find(|o| o.id == id)
            .map_or(0, |o| o.size);
        self.unback(va, size);
        Ok(())
    }
}
