//! Process lifecycle over the simulated memory.
//!
//! Each process owns one table page plus its data pages. The directory
//! region of page 0 maps a process id to the table page; the table page's
//! byte at offset `v` is the physical page backing virtual page `v`, with
//! 0 meaning unmapped. Every allocated data page is referenced by exactly
//! one table entry of exactly one process.

use crate::constants::*;
use crate::error::{VmError, VmResult};
use crate::memory::{PhysicalMemory, address};

/// Look up the physical page holding a process's page table.
pub fn page_table_page(mem: &PhysicalMemory, process_id: usize) -> VmResult<u8> {
    if process_id >= MAX_PROCESSES {
        return Err(VmError::ProcessIdOutOfRange(process_id));
    }
    let table_page = mem.read(PROC_DIR_BASE + process_id);
    if table_page == 0 {
        return Err(VmError::NoSuchProcess(process_id));
    }
    Ok(table_page)
}

/// Allocate the page set for a new process: one table page plus
/// `page_count` data pages, mapped at virtual indices `0..page_count`.
///
/// Exhaustion while the table page is requested consumes nothing.
/// Exhaustion on a later data page aborts at that point and the pages
/// granted so far stay allocated and mapped; the caller may destroy the
/// partially built process or leave it.
pub fn create_process(
    mem: &mut PhysicalMemory,
    process_id: usize,
    page_count: usize,
) -> VmResult<()> {
    if process_id >= MAX_PROCESSES {
        return Err(VmError::ProcessIdOutOfRange(process_id));
    }
    if mem.read(PROC_DIR_BASE + process_id) != 0 {
        // Overwriting the directory entry would orphan the old pages
        return Err(VmError::ProcessInUse(process_id));
    }
    if page_count > PAGE_COUNT {
        return Err(VmError::TooManyPages(page_count));
    }

    let table_page = match mem.allocate_page() {
        Ok(page) => page,
        Err(e) => {
            log::error!("process {}: no page left for the page table", process_id);
            return Err(e);
        }
    };
    mem.write(PROC_DIR_BASE + process_id, table_page);

    for i in 0..page_count {
        let data_page = match mem.allocate_page() {
            Ok(page) => page,
            Err(e) => {
                log::error!(
                    "process {}: out of pages after {} of {} data pages",
                    process_id,
                    i,
                    page_count
                );
                return Err(e);
            }
        };
        mem.write(address(table_page as usize, i), data_page);
    }

    log::debug!(
        "process {}: created with table page {} and {} data pages",
        process_id,
        table_page,
        page_count
    );
    Ok(())
}

/// Release every page a process owns and remove it from the directory.
///
/// Frees exactly the pages mapped by the process's table page, then the
/// table page itself. Each entry is cleared as it is freed, so it is
/// never read twice.
pub fn destroy_process(mem: &mut PhysicalMemory, process_id: usize) -> VmResult<()> {
    let table_page = page_table_page(mem, process_id)?;

    for v in 0..PAGE_COUNT {
        let entry_addr = address(table_page as usize, v);
        let data_page = mem.read(entry_addr);
        if data_page != 0 {
            mem.free_page(data_page)?;
            mem.write(entry_addr, 0);
        }
    }

    mem.free_page(table_page)?;
    mem.write(PROC_DIR_BASE + process_id, 0);

    log::debug!("process {}: destroyed, table page {} released", process_id, table_page);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_memory() -> PhysicalMemory {
        PhysicalMemory::new().unwrap()
    }

    #[test]
    fn test_create_maps_pages_in_order() {
        // Fresh memory: page 0 reserved, so the table page is 1 and the
        // two data pages are 2 and 3.
        let mut mem = fresh_memory();
        create_process(&mut mem, 1, 2).unwrap();

        assert_eq!(page_table_page(&mem, 1), Ok(1));
        assert_eq!(mem.read(PROC_DIR_BASE + 1), 1); // raw directory byte
        assert_eq!(mem.read(address(1, 0)), 2);
        assert_eq!(mem.read(address(1, 1)), 3);
        assert_eq!(mem.read(address(1, 2)), 0); // rest of the table unmapped
    }

    #[test]
    fn test_create_with_no_data_pages() {
        let mut mem = fresh_memory();
        create_process(&mut mem, 3, 0).unwrap();

        assert_eq!(page_table_page(&mem, 3), Ok(1));
        assert_eq!(mem.free_page_count(), PAGE_COUNT - 2);
    }

    #[test]
    fn test_lookup_contract_violations() {
        let mem = fresh_memory();

        assert_eq!(page_table_page(&mem, 9), Err(VmError::NoSuchProcess(9)));
        assert_eq!(
            page_table_page(&mem, MAX_PROCESSES),
            Err(VmError::ProcessIdOutOfRange(MAX_PROCESSES))
        );
    }

    #[test]
    fn test_create_contract_violations() {
        let mut mem = fresh_memory();
        create_process(&mut mem, 1, 1).unwrap();
        let free_before = mem.free_page_count();

        assert_eq!(create_process(&mut mem, 1, 1), Err(VmError::ProcessInUse(1)));
        assert_eq!(
            create_process(&mut mem, MAX_PROCESSES, 1),
            Err(VmError::ProcessIdOutOfRange(MAX_PROCESSES))
        );
        assert_eq!(
            create_process(&mut mem, 2, PAGE_COUNT + 1),
            Err(VmError::TooManyPages(PAGE_COUNT + 1))
        );

        // Rejected calls allocated nothing
        assert_eq!(mem.free_page_count(), free_before);
    }

    #[test]
    fn test_destroy_returns_every_owned_page() {
        let mut mem = fresh_memory();
        let free_before = mem.free_page_count();

        create_process(&mut mem, 5, 3).unwrap();
        assert_eq!(mem.free_page_count(), free_before - 4); // table + 3 data

        destroy_process(&mut mem, 5).unwrap();
        assert_eq!(mem.free_page_count(), free_before);
        assert_eq!(mem.read(PROC_DIR_BASE + 5), 0);
        assert_eq!(page_table_page(&mem, 5), Err(VmError::NoSuchProcess(5)));
    }

    #[test]
    fn test_destroy_twice_is_a_contract_violation() {
        let mut mem = fresh_memory();
        create_process(&mut mem, 2, 1).unwrap();

        destroy_process(&mut mem, 2).unwrap();
        assert_eq!(destroy_process(&mut mem, 2), Err(VmError::NoSuchProcess(2)));
    }

    #[test]
    fn test_destroy_leaves_other_processes_alone() {
        let mut mem = fresh_memory();
        create_process(&mut mem, 1, 2).unwrap(); // table 1, data 2 and 3
        create_process(&mut mem, 2, 2).unwrap(); // table 4, data 5 and 6

        destroy_process(&mut mem, 1).unwrap();

        for page in 1..=3 {
            assert!(!mem.page_is_allocated(page));
        }
        for page in 4..=6 {
            assert!(mem.page_is_allocated(page));
        }
        assert_eq!(page_table_page(&mem, 2), Ok(4));
        assert_eq!(mem.read(address(4, 0)), 5);
        assert_eq!(mem.read(address(4, 1)), 6);

        // First-fit hands the reclaimed pages out again, lowest first
        assert_eq!(mem.allocate_page(), Ok(1));
    }

    #[test]
    fn test_table_page_exhaustion_consumes_nothing() {
        let mut mem = fresh_memory();
        create_process(&mut mem, 1, PAGE_COUNT - 2).unwrap(); // every page
        assert_eq!(mem.free_page_count(), 0);

        assert_eq!(create_process(&mut mem, 2, 0), Err(VmError::OutOfPages));
        assert_eq!(mem.read(PROC_DIR_BASE + 2), 0);
    }

    #[test]
    fn test_partial_create_keeps_granted_pages() {
        let mut mem = fresh_memory();
        create_process(&mut mem, 1, 60).unwrap(); // 61 pages, 2 left free

        // Table page fits and one of the five data pages does
        assert_eq!(create_process(&mut mem, 2, 5), Err(VmError::OutOfPages));
        assert_eq!(mem.free_page_count(), 0);

        let table_page = page_table_page(&mem, 2).unwrap();
        assert_ne!(mem.read(address(table_page as usize, 0)), 0);
        assert_eq!(mem.read(address(table_page as usize, 1)), 0);

        // The half-built process is still internally consistent and can
        // be destroyed to reclaim its table page and lone data page
        destroy_process(&mut mem, 2).unwrap();
        assert_eq!(mem.free_page_count(), 2);
    }

    #[test]
    fn test_create_destroy_round_trip_restores_bitmap() {
        let mut mem = fresh_memory();
        let before: Vec<u8> = (0..PAGE_COUNT).map(|page| mem.read(page)).collect();

        create_process(&mut mem, 7, 4).unwrap();
        destroy_process(&mut mem, 7).unwrap();

        let after: Vec<u8> = (0..PAGE_COUNT).map(|page| mem.read(page)).collect();
        assert_eq!(before, after);
    }
}
