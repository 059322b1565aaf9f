/// Total simulated RAM in bytes. MUST equal PAGE_COUNT * PAGE_SIZE.
pub const MEM_SIZE: usize = 16384;

/// Bytes per physical page. MUST equal 1 << PAGE_SHIFT.
pub const PAGE_SIZE: usize = 256;

/// Number of physical page slots tracked by the bitmap.
pub const PAGE_COUNT: usize = 64;

/// Shift that converts a page number into a byte address.
pub const PAGE_SHIFT: u32 = 8;

/// Mask selecting the in-page offset bits of an address.
pub const OFFSET_MASK: usize = PAGE_SIZE - 1;

/// Highest valid process id is MAX_PROCESSES - 1.
pub const MAX_PROCESSES: usize = 64;

/// Byte offset within page 0 of the process directory,
/// one byte per process id (0 = no process).
pub const PROC_DIR_BASE: usize = 64;

/// Pages per output row in the free-map report.
pub const FREE_MAP_WIDTH: usize = 16;
