use std::fmt;

use crate::constants::*;

/// Errors raised by the memory core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmError {
    /// The sizing constants violate one of their mutual-consistency
    /// relations; fatal at startup, carries the relation that failed
    InconsistentLayout(&'static str),
    /// No free physical page left
    OutOfPages,
    /// Process id outside [0, MAX_PROCESSES)
    ProcessIdOutOfRange(usize),
    /// No page table registered for this process id
    NoSuchProcess(usize),
    /// A live process already owns this id
    ProcessInUse(usize),
    /// More data pages requested than a page table can hold
    TooManyPages(usize),
    /// Page number outside [0, PAGE_COUNT)
    PageOutOfRange(usize),
    /// Page is not currently marked allocated
    PageNotAllocated(u8),
    /// Page 0 hosts the bitmap and process directory and is never freed
    ReservedPage,
}

pub type VmResult<T> = Result<T, VmError>;

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmError::InconsistentLayout(relation) => {
                write!(f, "inconsistent memory layout: {} does not hold", relation)
            }
            VmError::OutOfPages => write!(f, "out of physical pages"),
            VmError::ProcessIdOutOfRange(id) => {
                write!(f, "process id {} out of range (max {})", id, MAX_PROCESSES - 1)
            }
            VmError::NoSuchProcess(id) => write!(f, "process {} does not exist", id),
            VmError::ProcessInUse(id) => write!(f, "process {} already exists", id),
            VmError::TooManyPages(count) => {
                write!(f, "{} pages requested, a page table maps at most {}", count, PAGE_COUNT)
            }
            VmError::PageOutOfRange(page) => {
                write!(f, "page number {} out of range (max {})", page, PAGE_COUNT - 1)
            }
            VmError::PageNotAllocated(page) => write!(f, "page {} is not allocated", page),
            VmError::ReservedPage => write!(f, "page 0 is reserved"),
        }
    }
}

impl std::error::Error for VmError {}
