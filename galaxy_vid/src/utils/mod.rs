pub mod slot_allocator;
pub mod dirty_flag;

pub use slot_allocator::SlotAllocator;
pub use dirty_flag::DirtyFlag;
