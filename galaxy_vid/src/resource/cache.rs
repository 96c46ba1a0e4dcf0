/// Per-context physical object cache of a logical resource
///
/// A logical resource (texture, program, geometry) holds CPU-side data and
/// one `ResourceCache`. The cache maps each `RenderContext` the resource was
/// used on to a `CacheEntry`: the physical objects created on that context
/// plus the update flags still pending for them.
///
/// ```text
/// ResourceCache ──▶ CacheTable ─┬─ ctx#1 ─▶ CacheEntry { objects, flags, queue }
///        ▲                      └─ ctx#2 ─▶ CacheEntry { ... }
///        │ (weak)
/// RenderContext::bound_caches
/// ```
///
/// Release runs both ways: dropping the resource retires every entry into
/// the deletion queue of its context, and dropping a context removes its
/// entry from every cache it was registered with.

use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use bitflags::bitflags;
use rustc_hash::FxHashMap;
use crate::context::{ContextId, DeletionQueue, RenderContext};
use crate::error::Result;
use crate::graphics_device::GraphicsDevice;
use crate::engine_debug;

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a logical resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    pub(crate) fn next() -> Self {
        ResourceId(NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "res#{}", self.0)
    }
}

bitflags! {
    /// Work still pending before a cache entry matches its logical resource
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct UpdateFlags: u32 {
        /// Vertex or texel data changed
        const DATA = 1 << 0;
        /// Index data changed
        const INDICES = 1 << 1;
        /// Shader sources changed
        const COMPILE = 1 << 2;
        /// Uniform values changed
        const UNIFORMS = 1 << 3;
    }
}

/// Physical objects one resource owns on one context
pub trait PhysicalObjects: 'static {
    /// Hand every handle over to `queue` for deferred destruction
    fn retire(self, queue: &mut DeletionQueue);
}

/// Physical objects of one resource on one context
pub struct CacheEntry<H> {
    objects: H,
    flags: UpdateFlags,
    queue: Rc<RefCell<DeletionQueue>>,
}

impl<H> CacheEntry<H> {
    pub fn objects(&self) -> &H {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut H {
        &mut self.objects
    }

    /// Pending updates
    pub fn flags(&self) -> UpdateFlags {
        self.flags
    }

    /// Whether any of `flags` is pending
    pub fn needs(&self, flags: UpdateFlags) -> bool {
        self.flags.intersects(flags)
    }

    /// Clear `flags` once the physical objects are up to date
    pub fn mark_synced(&mut self, flags: UpdateFlags) {
        self.flags.remove(flags);
    }

    pub fn invalidate(&mut self, flags: UpdateFlags) {
        self.flags.insert(flags);
    }
}

impl<H: PhysicalObjects> CacheEntry<H> {
    fn retire(self) {
        let CacheEntry { objects, queue, .. } = self;
        objects.retire(&mut queue.borrow_mut());
    }
}

struct CacheTable<H> {
    entries: FxHashMap<ContextId, CacheEntry<H>>,
}

/// Context-side view of a resource cache
pub(crate) trait ContextBound {
    /// Retire the entry held for `context`, returning whether there was one
    fn release_context(&self, context: ContextId) -> bool;
}

impl<H: PhysicalObjects> ContextBound for RefCell<CacheTable<H>> {
    fn release_context(&self, context: ContextId) -> bool {
        let entry = match self.try_borrow_mut() {
            Ok(mut table) => table.entries.remove(&context),
            Err(_) => None,
        };
        match entry {
            Some(entry) => {
                entry.retire();
                true
            }
            None => false,
        }
    }
}

/// Context to entry map owned by one logical resource
pub struct ResourceCache<H: PhysicalObjects> {
    resource: ResourceId,
    table: Rc<RefCell<CacheTable<H>>>,
}

impl<H: PhysicalObjects> ResourceCache<H> {
    pub fn new() -> Self {
        Self {
            resource: ResourceId::next(),
            table: Rc::new(RefCell::new(CacheTable {
                entries: FxHashMap::default(),
            })),
        }
    }

    /// Identity of the owning resource, readable while an entry is being synced
    pub fn id(&self) -> ResourceId {
        self.resource
    }

    /// Number of contexts holding physical objects for this resource
    pub fn len(&self) -> usize {
        self.table.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, context: ContextId) -> bool {
        self.table.borrow().entries.contains_key(&context)
    }

    /// Flags pending on the entry of `context`
    pub fn pending(&self, context: ContextId) -> Option<UpdateFlags> {
        self.table.borrow().entries.get(&context).map(|entry| entry.flags)
    }

    /// Mark `flags` pending on every context
    pub fn invalidate(&self, flags: UpdateFlags) {
        for entry in self.table.borrow_mut().entries.values_mut() {
            entry.invalidate(flags);
        }
    }

    /// Bring the entry of `ctx` up to date and use it
    ///
    /// On first use on `ctx`, `create` builds the physical objects and the new
    /// entry starts with every flag pending. `sync` then receives the entry
    /// and the context; it is expected to push whatever its flags require and
    /// clear them.
    ///
    /// If `create` fails no entry is stored. If `sync` fails the entry keeps
    /// its remaining flags and the next call retries.
    pub fn resolve<R>(
        &self,
        ctx: &mut RenderContext,
        create: impl FnOnce(&mut dyn GraphicsDevice) -> Result<H>,
        sync: impl FnOnce(&mut CacheEntry<H>, &mut RenderContext) -> Result<R>,
    ) -> Result<R> {
        let context = ctx.id();
        let resource = self.resource;
        let mut table = self.table.borrow_mut();

        let entry = match table.entries.entry(context) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                let objects = create(ctx.device_mut())?;
                let bound: Weak<dyn ContextBound> = Rc::downgrade(&self.table) as Weak<RefCell<CacheTable<H>>>;
                ctx.track(bound);
                engine_debug!("galaxy_vid::ResourceCache", "Resource {} created objects on context {}",
                    resource, context);
                vacant.insert(CacheEntry {
                    objects,
                    flags: UpdateFlags::all(),
                    queue: ctx.deletion_queue(),
                })
            }
        };

        sync(entry, ctx)
    }

    /// Read the entry of `context`, if any
    pub fn with_entry<R>(&self, context: ContextId, f: impl FnOnce(&CacheEntry<H>) -> R) -> Option<R> {
        self.table.borrow().entries.get(&context).map(f)
    }

    /// Retire the entry of one context
    pub fn release_context(&self, context: ContextId) -> bool {
        ContextBound::release_context(&*self.table, context)
    }

    /// Retire every entry, returning how many there were
    ///
    /// Handles go to the deletion queue of their own context and are
    /// destroyed at that context's next sweep.
    pub fn release(&self) -> usize {
        let entries: Vec<CacheEntry<H>> = match self.table.try_borrow_mut() {
            Ok(mut table) => table.entries.drain().map(|(_, entry)| entry).collect(),
            Err(_) => return 0,
        };
        let count = entries.len();
        for entry in entries {
            entry.retire();
        }
        count
    }
}

impl<H: PhysicalObjects> Default for ResourceCache<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: PhysicalObjects> Drop for ResourceCache<H> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
