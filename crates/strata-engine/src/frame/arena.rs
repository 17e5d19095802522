use crate::error::{ArenaKind, RenderError};

/// Capacity after growing an arena holding `used` units by `requested` more.
///
/// `max(used + requested, floor)` plus half the previous capacity, so repeated
/// small allocations reallocate O(log n) times.
#[inline]
pub(crate) fn grown_capacity(used: usize, requested: usize, capacity: usize, floor: usize) -> usize {
    (used + requested).max(floor).saturating_add(capacity / 2)
}

/// Frame-scoped growable buffer addressed by offset.
///
/// Offsets handed out stay valid until [`Arena::clear`] or a [`Arena::truncate`]
/// below them. Clearing keeps the backing storage for the next frame.
#[derive(Debug)]
pub struct Arena<T> {
    items: Vec<T>,
    kind: ArenaKind,
    floor: usize,
    grow_count: usize,
}

impl<T: Copy> Arena<T> {
    pub fn new(kind: ArenaKind, floor: usize) -> Self {
        Self {
            items: Vec::new(),
            kind,
            floor,
            grow_count: 0,
        }
    }

    /// Makes room for `n` more units without writing them.
    pub fn reserve(&mut self, n: usize) -> Result<(), RenderError> {
        let exhausted = RenderError::ResourceExhausted { arena: self.kind, requested: n };

        let used = self.items.len();
        let needed = used.checked_add(n).ok_or(exhausted.clone())?;
        let capacity = self.items.capacity();
        if needed <= capacity {
            return Ok(());
        }

        let new_cap = grown_capacity(used, n, capacity, self.floor);
        self.items.try_reserve_exact(new_cap - used).map_err(|_| exhausted)?;
        self.grow_count += 1;

        log::debug!("{} arena grew {capacity} -> {}", self.kind, self.items.capacity());
        Ok(())
    }

    /// Appends `n` copies of `fill` and returns the offset of the first.
    pub fn alloc(&mut self, n: usize, fill: T) -> Result<usize, RenderError> {
        self.reserve(n)?;
        let offset = self.items.len();
        self.items.resize(offset + n, fill);
        Ok(offset)
    }

    /// Appends `src` and returns the offset of its first element.
    pub fn push_slice(&mut self, src: &[T]) -> Result<usize, RenderError> {
        self.reserve(src.len())?;
        let offset = self.items.len();
        self.items.extend_from_slice(src);
        Ok(offset)
    }

    #[inline]
    pub fn push(&mut self, item: T) -> Result<usize, RenderError> {
        self.push_slice(std::slice::from_ref(&item))
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Number of reallocations since the arena was created.
    #[inline]
    pub fn grow_count(&self) -> usize {
        self.grow_count
    }

    /// Current length, to [`truncate`](Self::truncate) back to.
    #[inline]
    pub fn mark(&self) -> usize {
        self.items.len()
    }

    /// Drops everything allocated after `mark`.
    #[inline]
    pub fn truncate(&mut self, mark: usize) {
        self.items.truncate(mark);
    }

    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
