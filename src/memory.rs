use crate::constants::*;
use crate::error::{VmError, VmResult};

/// The entire simulated RAM as one flat byte array.
///
/// Page 0 is reserved: its first PAGE_COUNT bytes are the allocation
/// bitmap (one byte per page, 0 = free, 1 = used) and the bytes from
/// PROC_DIR_BASE up hold the process directory.
pub struct PhysicalMemory {
    data: Box<[u8; MEM_SIZE]>,
}

impl PhysicalMemory {
    /// Create a zeroed physical memory with page 0 marked allocated.
    ///
    /// Validates the sizing constants first; an inconsistent layout is
    /// a fatal configuration error and no memory is handed out.
    pub fn new() -> VmResult<Self> {
        verify_layout()?;
        // Use vec! to allocate on heap, then convert to boxed array
        let data = vec![0u8; MEM_SIZE].into_boxed_slice();
        let data: Box<[u8; MEM_SIZE]> = data.try_into().unwrap();
        let mut mem = PhysicalMemory { data };
        // Page 0 hosts the bitmap and the process directory
        mem.data[0] = 1;
        Ok(mem)
    }

    /// Read a byte from physical memory
    #[inline]
    pub fn read(&self, address: usize) -> u8 {
        self.data[address]
    }

    /// Write a byte to physical memory
    #[inline]
    pub fn write(&mut self, address: usize, value: u8) {
        self.data[address] = value;
    }

    /// Grant the lowest-numbered free page, marking it used.
    ///
    /// First-fit: slots are scanned in increasing order, so the result
    /// is reproducible from the bitmap state alone. Exhaustion has no
    /// side effect.
    pub fn allocate_page(&mut self) -> VmResult<u8> {
        for page in 0..PAGE_COUNT {
            if self.data[page] == 0 {
                self.data[page] = 1;
                log::trace!("allocated page {}", page);
                return Ok(page as u8);
            }
        }
        Err(VmError::OutOfPages)
    }

    /// Release an allocated page back to the bitmap.
    ///
    /// Page 0, out-of-range page numbers and pages already free are
    /// caller contract violations and leave the bitmap untouched.
    pub fn free_page(&mut self, page: u8) -> VmResult<()> {
        let slot = page as usize;
        if slot >= PAGE_COUNT {
            return Err(VmError::PageOutOfRange(slot));
        }
        if slot == 0 {
            return Err(VmError::ReservedPage);
        }
        if self.data[slot] == 0 {
            return Err(VmError::PageNotAllocated(page));
        }
        self.data[slot] = 0;
        log::trace!("freed page {}", page);
        Ok(())
    }

    /// Whether the bitmap currently marks `page` as allocated
    #[inline]
    pub fn page_is_allocated(&self, page: usize) -> bool {
        self.data[page] != 0
    }

    /// Number of pages currently free
    pub fn free_page_count(&self) -> usize {
        self.data[..PAGE_COUNT].iter().filter(|&&slot| slot == 0).count()
    }
}

/// Combine a page number and in-page offset into a flat address.
///
/// Never validates: callers must keep `page` below PAGE_COUNT and
/// `offset` below PAGE_SIZE.
#[inline]
pub fn address(page: usize, offset: usize) -> usize {
    (page << PAGE_SHIFT) | offset
}

/// Page number holding a flat address
#[inline]
pub fn page_of(address: usize) -> usize {
    address >> PAGE_SHIFT
}

/// Offset of a flat address within its page
#[inline]
pub fn offset_of(address: usize) -> usize {
    address & OFFSET_MASK
}

/// Check the sizing constants against each other.
pub fn verify_layout() -> VmResult<()> {
    if PAGE_COUNT * PAGE_SIZE != MEM_SIZE {
        return Err(VmError::InconsistentLayout("PAGE_COUNT * PAGE_SIZE == MEM_SIZE"));
    }
    if PAGE_SIZE != 1 << PAGE_SHIFT {
        return Err(VmError::InconsistentLayout("PAGE_SIZE == 1 << PAGE_SHIFT"));
    }
    if PAGE_COUNT > PROC_DIR_BASE {
        return Err(VmError::InconsistentLayout("PAGE_COUNT <= PROC_DIR_BASE"));
    }
    if PROC_DIR_BASE + MAX_PROCESSES > PAGE_SIZE {
        return Err(VmError::InconsistentLayout("PROC_DIR_BASE + MAX_PROCESSES <= PAGE_SIZE"));
    }
    Ok(())
}
