//! Connection slab: slot index == readiness token.
//!
//! Slots grow on demand up to the cap and are recycled through a free
//! list, so a token stays valid exactly as long as its connection.

pub(crate) struct ConnSlab<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    max: usize,
    live: usize,
}

impl<T> ConnSlab<T> {
    pub(crate) fn new(max: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            max: max.max(1),
            live: 0,
        }
    }

    /// Store `item`, returning its index, or give it back when full.
    pub(crate) fn insert(&mut self, item: T) -> Result<usize, T> {
        let idx = match self.free.pop() {
            Some(idx) => idx,
            None if self.slots.len() < self.max => {
                self.slots.push(None);
                self.slots.len() - 1
            }
            None => return Err(item),
        };
        self.slots[idx] = Some(item);
        self.live += 1;
        Ok(idx)
    }

    pub(crate) fn get(&self, idx: usize) -> Option<&T> {
        self.slots.get(idx)?.as_ref()
    }

    pub(crate) fn remove(&mut self, idx: usize) -> Option<T> {
        let item = self.slots.get_mut(idx)?.take()?;
        self.free.push(idx);
        self.live -= 1;
        Some(item)
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }
}
