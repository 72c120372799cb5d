//! Entry chains: a slab of entries linked by generational ids.
//!
//! Every entry lives in one `SlotMap`; a bucket holds only the id of its
//! chain head and each entry holds the id of its successor. Moving an
//! entry between chains (as growth does) rewrites links and never touches
//! the allocation of the entry itself.

use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Slab id of an entry.
    pub(crate) struct EntryId;
}

/// Head link of a bucket: `None` when the bucket is empty.
pub(crate) type Head = Option<EntryId>;

/// A stored key/value pair.
#[derive(Debug)]
pub struct Entry {
    key: Box<str>,
    value: i64,
    next: Head,
}

impl Entry {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub(crate) fn value_mut(&mut self) -> &mut i64 {
        &mut self.value
    }
}

#[derive(Debug)]
pub(crate) struct Arena {
    slots: SlotMap<EntryId, Entry>,
}

impl Arena {
    pub(crate) fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn get(&self, id: EntryId) -> Option<&Entry> {
        self.slots.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.slots.get_mut(id)
    }

    /// Successor of `id` in its chain.
    pub(crate) fn next_of(&self, id: EntryId) -> Head {
        self.slots.get(id).and_then(|e| e.next)
    }

    pub(crate) fn chain(&self, head: Head) -> Chain<'_> {
        Chain {
            arena: self,
            cursor: head,
        }
    }

    /// First entry of the chain whose key equals `key`.
    pub(crate) fn find(&self, head: Head, key: &str) -> Option<EntryId> {
        let mut cursor = head;
        while let Some(id) = cursor {
            let e = &self.slots[id];
            if *e.key == *key {
                return Some(id);
            }
            cursor = e.next;
        }
        None
    }

    /// Creates an entry and appends it at the tail of the chain.
    pub(crate) fn push(&mut self, head: &mut Head, key: &str, value: i64) -> EntryId {
        let id = self.slots.insert(Entry {
            key: key.into(),
            value,
            next: None,
        });
        self.link_tail(head, id);
        id
    }

    /// Appends an existing entry at the tail of the chain, detaching it
    /// from whatever successor it had before.
    pub(crate) fn link_tail(&mut self, head: &mut Head, id: EntryId) {
        self.slots[id].next = None;
        let Some(mut tail) = *head else {
            *head = Some(id);
            return;
        };
        while let Some(next) = self.slots[tail].next {
            tail = next;
        }
        self.slots[tail].next = Some(id);
    }

    /// Unlinks and releases the entry matching `key`, re-linking its
    /// predecessor (or the head) to its successor. `None` if no entry
    /// matches; the chain is then left untouched.
    pub(crate) fn unlink(&mut self, head: &mut Head, key: &str) -> Option<Entry> {
        let first = (*head)?;
        if *self.slots[first].key == *key {
            let removed = self.slots.remove(first)?;
            *head = removed.next;
            return Some(removed);
        }

        let mut prev = first;
        while let Some(cur) = self.slots[prev].next {
            if *self.slots[cur].key == *key {
                let removed = self.slots.remove(cur)?;
                self.slots[prev].next = removed.next;
                return Some(removed);
            }
            prev = cur;
        }
        None
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }
}

/// Iterator over the entries of one chain, head to tail.
pub struct Chain<'a> {
    arena: &'a Arena,
    cursor: Head,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Entry;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let e = self.arena.get(id)?;
        self.cursor = e.next;
        Some(e)
    }
}
