//! Paged 32-bit virtual memory with fixed read-only/heap/input/stack zones
//! (spec §3 Memory, §4.3 Memory).

mod error;
mod page;

pub use error::{MemoryError, ViolationInfo, ViolationKind};
pub use page::{Page, PageFlags};

use crate::consts::{align_up, Z_I, Z_P, Z_Z};

/// The fixed zone layout derived from the sizes of the read-only, input, and
/// stack regions (spec §3 Memory).
#[derive(Debug, Clone, Copy)]
pub struct MemoryLayout {
    pub read_only_base: u32,
    pub heap_base: u32,
    pub input_base: u32,
    pub stack_top: u32,
}

impl MemoryLayout {
    pub fn compute(read_only_len: u32, stack_len: u32) -> MemoryLayout {
        let read_only_base = Z_Z;
        let heap_base = 2 * Z_Z + align_up(read_only_len, Z_P);
        let input_base = u32::MAX - Z_Z - Z_I;
        let stack_top = u32::MAX - 2 * Z_Z - Z_I;
        let _ = stack_len; // stack pages are placed below `stack_top`, see `Memory::init_with_capacity`.
        MemoryLayout {
            read_only_base,
            heap_base,
            input_base,
            stack_top,
        }
    }
}

/// Paged memory for a single execution context.
#[derive(Debug, Clone)]
pub struct Memory {
    /// Pages sorted by `base`; no two pages overlap (spec §4.3 invariant).
    pages: Vec<Page>,
    layout: MemoryLayout,
    heap_allocation_limit: Option<u32>,
    last_violation: Option<ViolationInfo>,
}

impl Memory {
    /// Build an empty memory with the given zone sizes, allocating backing
    /// pages for each zone but leaving their contents zeroed. `heap_len` is the
    /// number of bytes of heap pre-allocated at the heap base (e.g. the
    /// read-write data segment plus any configured heap pages).
    pub fn init_with_capacity(read_only_len: u32, heap_len: u32, input_len: u32, stack_len: u32) -> Memory {
        let layout = MemoryLayout::compute(read_only_len, stack_len);
        let mut memory = Memory {
            pages: Vec::new(),
            layout,
            heap_allocation_limit: None,
            last_violation: None,
        };

        memory.allocate_pages_at(
            layout.read_only_base,
            pages_for(read_only_len),
            PageFlags::ReadOnly,
        ).expect("zones never overlap on a fresh memory");

        if heap_len > 0 {
            memory.allocate_pages_at(layout.heap_base, pages_for(heap_len), PageFlags::ReadWrite)
                .expect("zones never overlap on a fresh memory");
        }

        if input_len > 0 {
            memory
                .allocate_pages_at(layout.input_base, pages_for(input_len), PageFlags::ReadOnly)
                .expect("zones never overlap on a fresh memory");
        }

        if stack_len > 0 {
            let stack_pages = pages_for(stack_len);
            let stack_base = layout.stack_top - stack_pages * Z_P;
            memory
                .allocate_pages_at(stack_base, stack_pages, PageFlags::ReadWrite)
                .expect("zones never overlap on a fresh memory");
        }

        memory
    }

    pub fn layout(&self) -> MemoryLayout {
        self.layout
    }

    pub fn set_heap_allocation_limit(&mut self, limit: Option<u32>) {
        self.heap_allocation_limit = limit;
    }

    pub fn last_violation(&self) -> Option<ViolationInfo> {
        self.last_violation
    }

    fn record_violation(&mut self, kind: ViolationKind, address: u32, length: u32) {
        self.last_violation = Some(ViolationInfo { kind, address, length });
    }

    fn page_index(&self, addr: u32) -> Option<usize> {
        match self.pages.binary_search_by_key(&addr, |p| p.base) {
            Ok(i) => Some(i),
            Err(0) => None,
            Err(i) => {
                let candidate = i - 1;
                if self.pages[candidate].contains(addr) {
                    Some(candidate)
                } else {
                    None
                }
            }
        }
    }

    /// Insert pages in address order, keeping `pages` sorted (spec §4.3
    /// invariant: pages are kept sorted by insertion sort after every
    /// allocation).
    fn insert_page(&mut self, page: Page) {
        let pos = self.pages.partition_point(|p| p.base < page.base);
        self.pages.insert(pos, page);
    }

    /// Allocate `n` pages starting at the page-aligned `addr`. Fails with
    /// [`MemoryError::UnalignedAddress`] or [`MemoryError::PageOverlap`].
    pub fn allocate_pages_at(&mut self, addr: u32, n: u32, flags: PageFlags) -> Result<(), MemoryError> {
        if addr % Z_P != 0 {
            return Err(MemoryError::UnalignedAddress);
        }
        for i in 0..n {
            let base = addr + i * Z_P;
            if self.page_index(base).is_some() {
                return Err(MemoryError::PageOverlap);
            }
        }
        for i in 0..n {
            self.insert_page(Page::new(addr + i * Z_P, flags));
        }
        Ok(())
    }

    /// Grow the heap by `bytes`, rounded up to a whole number of pages, placed
    /// directly above the highest existing read-write page in the heap zone.
    /// `bytes == 0` returns the next page address without growing.
    pub fn allocate(&mut self, bytes: u32) -> Result<u32, MemoryError> {
        let top = self
            .pages
            .iter()
            .filter(|p| p.flags == PageFlags::ReadWrite && p.base >= self.layout.heap_base)
            .map(|p| p.end())
            .max()
            .unwrap_or(self.layout.heap_base);

        if bytes == 0 {
            return Ok(top);
        }

        let n = pages_for(bytes);
        if let Some(limit) = self.heap_allocation_limit {
            if top + n * Z_P > self.layout.heap_base + limit {
                return Err(MemoryError::MemoryLimitExceeded);
            }
        }
        self.allocate_pages_at(top, n, PageFlags::ReadWrite)?;
        Ok(top)
    }

    /// Bulk-write `data` into contiguous pages starting at `addr`, bypassing
    /// the read-only check (used only to seed memory on construction).
    pub fn init_memory(&mut self, addr: u32, data: &[u8]) -> Result<(), MemoryError> {
        let mut offset = 0usize;
        while offset < data.len() {
            let cur_addr = addr + offset as u32;
            let idx = self
                .page_index(cur_addr)
                .ok_or(MemoryError::PageFault(cur_addr))?;
            let page = &mut self.pages[idx];
            let page_offset = (cur_addr - page.base) as usize;
            let n = (Z_P as usize - page_offset).min(data.len() - offset);
            page.data[page_offset..page_offset + n].copy_from_slice(&data[offset..offset + n]);
            offset += n;
        }
        Ok(())
    }

    /// Read `len` bytes starting at `addr`, crossing at most one page
    /// boundary (two contiguously allocated pages).
    fn read_bytes(&mut self, addr: u32, len: usize) -> Result<Vec<u8>, MemoryError> {
        let idx = match self.page_index(addr) {
            Some(i) => i,
            None => {
                self.record_violation(ViolationKind::NonAllocated, addr, len as u32);
                return Err(MemoryError::PageFault(addr));
            }
        };
        let page = &self.pages[idx];
        let offset = (addr - page.base) as usize;
        if offset + len <= Z_P as usize {
            return Ok(page.data[offset..offset + len].to_vec());
        }

        let first_part = Z_P as usize - offset;
        let mut out = page.data[offset..].to_vec();
        let next_addr = page.end();
        let next_idx = match self.page_index(next_addr) {
            Some(i) if self.pages[i].base == next_addr => i,
            _ => {
                self.record_violation(ViolationKind::NonAllocated, next_addr, (len - first_part) as u32);
                return Err(MemoryError::PageFault(next_addr));
            }
        };
        out.extend_from_slice(&self.pages[next_idx].data[..len - first_part]);
        Ok(out)
    }

    /// Read a `WIDTH`-byte little-endian integer, zero-extended into a `u64`.
    pub fn read_int<const WIDTH: usize>(&mut self, addr: u32) -> Result<u64, MemoryError> {
        let bytes = self.read_bytes(addr, WIDTH)?;
        let mut buf = [0u8; 8];
        buf[..WIDTH].copy_from_slice(&bytes);
        Ok(u64::from_le_bytes(buf))
    }

    /// Read `len` bytes without crossing a page boundary.
    pub fn read_slice(&mut self, addr: u32, len: usize) -> Result<Vec<u8>, MemoryError> {
        let idx = match self.page_index(addr) {
            Some(i) => i,
            None => {
                self.record_violation(ViolationKind::NonAllocated, addr, len as u32);
                return Err(MemoryError::PageFault(addr));
            }
        };
        let page = &self.pages[idx];
        let offset = (addr - page.base) as usize;
        if offset + len > Z_P as usize {
            return Err(MemoryError::CrossPageRead);
        }
        Ok(page.data[offset..offset + len].to_vec())
    }

    fn require_writable(&mut self, idx: usize, addr: u32, len: u32) -> Result<(), MemoryError> {
        if self.pages[idx].flags != PageFlags::ReadWrite {
            self.record_violation(ViolationKind::WriteProtection, addr, len);
            return Err(MemoryError::WriteProtection);
        }
        Ok(())
    }

    /// Write a `WIDTH`-byte little-endian integer, crossing at most one page
    /// boundary; both touched pages must be `ReadWrite`.
    pub fn write_int<const WIDTH: usize>(&mut self, addr: u32, value: u64) -> Result<(), MemoryError> {
        let bytes = value.to_le_bytes();
        self.write_slice_cross(addr, &bytes[..WIDTH])
    }

    /// Write `data` without crossing a page boundary.
    pub fn write_slice(&mut self, addr: u32, data: &[u8]) -> Result<(), MemoryError> {
        let idx = match self.page_index(addr) {
            Some(i) => i,
            None => {
                self.record_violation(ViolationKind::AccessViolation, addr, data.len() as u32);
                return Err(MemoryError::CouldNotFindRwPage);
            }
        };
        let offset = (addr - self.pages[idx].base) as usize;
        if offset + data.len() > Z_P as usize {
            return Err(MemoryError::CrossPageWrite);
        }
        self.require_writable(idx, addr, data.len() as u32)?;
        self.pages[idx].data[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn write_slice_cross(&mut self, addr: u32, data: &[u8]) -> Result<(), MemoryError> {
        let idx = match self.page_index(addr) {
            Some(i) => i,
            None => {
                self.record_violation(ViolationKind::AccessViolation, addr, data.len() as u32);
                return Err(MemoryError::CouldNotFindRwPage);
            }
        };
        let offset = (addr - self.pages[idx].base) as usize;
        if offset + data.len() <= Z_P as usize {
            self.require_writable(idx, addr, data.len() as u32)?;
            self.pages[idx].data[offset..offset + data.len()].copy_from_slice(data);
            return Ok(());
        }

        let first_part = Z_P as usize - offset;
        let next_addr = self.pages[idx].end();
        let next_idx = match self.page_index(next_addr) {
            Some(i) if self.pages[i].base == next_addr => i,
            _ => {
                self.record_violation(
                    ViolationKind::AccessViolation,
                    next_addr,
                    (data.len() - first_part) as u32,
                );
                return Err(MemoryError::CouldNotFindRwPage);
            }
        };
        self.require_writable(idx, addr, data.len() as u32)?;
        self.require_writable(next_idx, next_addr, (data.len() - first_part) as u32)?;
        self.pages[idx].data[offset..].copy_from_slice(&data[..first_part]);
        self.pages[next_idx].data[..data.len() - first_part].copy_from_slice(&data[first_part..]);
        Ok(())
    }
}

fn pages_for(bytes: u32) -> u32 {
    align_up(bytes, Z_P) / Z_P
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_allocation_scenario() {
        let mut memory = Memory::init_with_capacity(0, Z_P, 0, 4096);
        let addr = memory.allocate(4097).unwrap();
        assert_eq!(memory.read_int::<4>(addr).unwrap(), 0);
        let after = memory
            .pages
            .iter()
            .filter(|p| p.flags == PageFlags::ReadWrite && p.base >= memory.layout.heap_base)
            .count();
        assert!(after >= 3); // 1 pre-allocated + 2 newly allocated
    }

    #[test]
    fn reading_non_allocated_page_faults() {
        let mut memory = Memory::init_with_capacity(0, 0, 0, 0);
        let err = memory.read_int::<4>(0x1234).unwrap_err();
        assert_eq!(err, MemoryError::PageFault(0x1234));
        assert_eq!(
            memory.last_violation().unwrap().kind,
            ViolationKind::NonAllocated
        );
    }

    #[test]
    fn writing_read_only_page_is_rejected() {
        let mut memory = Memory::init_with_capacity(Z_P, 0, 0, 0);
        let base = memory.layout().read_only_base;
        assert_eq!(
            memory.write_slice(base, &[1, 2, 3]),
            Err(MemoryError::WriteProtection)
        );
    }

    #[test]
    fn writing_to_unmapped_address_reports_could_not_find_rw_page() {
        let mut memory = Memory::init_with_capacity(0, 0, 0, 0);
        assert_eq!(
            memory.write_slice(0x2000, &[1, 2, 3]),
            Err(MemoryError::CouldNotFindRwPage)
        );
        assert_eq!(
            memory.last_violation().unwrap().kind,
            ViolationKind::AccessViolation
        );
    }

    #[test]
    fn cross_page_slice_read_is_rejected() {
        let mut memory = Memory::init_with_capacity(0, 2 * Z_P, 0, 0);
        let base = memory.layout().heap_base;
        let addr = base + Z_P - 2;
        assert_eq!(
            memory.read_slice(addr, 4),
            Err(MemoryError::CrossPageRead)
        );
    }
}
