/// Index of a slot in a [`SlotArena`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SlotId(usize);

/// One linked-list node.
#[derive(Clone, Debug)]
pub(crate) struct Slot<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) prev: Option<SlotId>,
    pub(crate) next: Option<SlotId>,
}

/// Dense slot storage with a free list.
///
/// Links between nodes are slot indices, so unlinking never moves or drops
/// neighbors and released slots are reused by later inserts.
#[derive(Clone, Debug)]
pub(crate) struct SlotArena<K, V> {
    slots: Vec<Option<Slot<K, V>>>,
    free: Vec<SlotId>,
}

impl<K, V> Default for SlotArena<K, V> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<K, V> SlotArena<K, V> {
    pub(crate) fn alloc(&mut self, key: K, value: V) -> SlotId {
        let slot = Slot {
            key,
            value,
            prev: None,
            next: None,
        };
        match self.free.pop() {
            Some(id) => {
                debug_assert!(self.slots[id.0].is_none(), "free list points at live slot");
                self.slots[id.0] = Some(slot);
                id
            }
            None => {
                self.slots.push(Some(slot));
                SlotId(self.slots.len() - 1)
            }
        }
    }

    pub(crate) fn release(&mut self, id: SlotId) -> Slot<K, V> {
        let slot = self.slots[id.0].take().expect("release of vacant slot");
        self.free.push(id);
        slot
    }

    pub(crate) fn get(&self, id: SlotId) -> &Slot<K, V> {
        self.slots[id.0].as_ref().expect("access to vacant slot")
    }

    pub(crate) fn get_mut(&mut self, id: SlotId) -> &mut Slot<K, V> {
        self.slots[id.0].as_mut().expect("access to vacant slot")
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    #[cfg(test)]
    pub(crate) fn allocated(&self) -> usize {
        self.slots.len()
    }
}
