//! Read-only renderers over the simulated memory. Nothing here mutates.

use crate::constants::*;
use crate::error::VmResult;
use crate::memory::{PhysicalMemory, address};
use crate::process::page_table_page;

/// Render the allocation bitmap, one glyph per page: `#` used, `.` free.
/// Rows wrap after FREE_MAP_WIDTH pages.
pub fn free_map(mem: &PhysicalMemory) -> String {
    let mut out = String::with_capacity(PAGE_COUNT + PAGE_COUNT / FREE_MAP_WIDTH);
    for page in 0..PAGE_COUNT {
        out.push(if mem.read(address(0, page)) == 0 { '.' } else { '#' });
        if (page + 1) % FREE_MAP_WIDTH == 0 {
            out.push('\n');
        }
    }
    out
}

/// Render a process's virtual-to-physical map, one `vv -> pp` line (hex)
/// per mapped entry in ascending virtual order.
pub fn page_table(mem: &PhysicalMemory, process_id: usize) -> VmResult<String> {
    let table_page = page_table_page(mem, process_id)?;

    let mut out = String::new();
    for v in 0..PAGE_COUNT {
        let page = mem.read(address(table_page as usize, v));
        if page != 0 {
            out.push_str(&format!("{:02x} -> {:02x}\n", v, page));
        }
    }
    Ok(out)
}
