/// Vec-backed map handing out reusable `usize` slots. Free slots form an
/// intrusive list threaded through the `Err` entries.
#[derive(Debug)]
pub struct SlotMap<T> {
    head: u32,
    len: usize,
    entries: Vec<Result<T, u32>>,
}
impl<T> SlotMap<T> {
    pub fn new() -> Self {
        Self {
            head: u32::MAX,
            len: 0,
            entries: vec![],
        }
    }
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    pub fn get(&self, i: usize) -> Option<&T> {
        self.entries.get(i).and_then(|r| r.as_ref().ok())
    }
    pub fn get_mut(&mut self, i: usize) -> Option<&mut T> {
        self.entries.get_mut(i).and_then(|r| r.as_mut().ok())
    }
    /// The slot the next `insert` will fill.
    pub fn next_idx(&self) -> usize {
        if self.head == u32::MAX {
            self.entries.len()
        } else {
            self.head as usize
        }
    }
    pub fn insert(&mut self, value: T) -> usize {
        self.len += 1;
        if self.head == u32::MAX {
            let i = self.entries.len();
            self.entries.push(Ok(value));
            i
        } else {
            let id = self.head as usize;
            let slot = &mut self.entries[id];
            match core::mem::replace(slot, Ok(value)) {
                Err(next) => self.head = next,
                Ok(_) => unreachable!("free list points at a live slot"),
            }
            id
        }
    }
    pub fn release(&mut self, i: usize) -> Option<T> {
        let head = self.head;
        let entry = self.entries.get_mut(i)?;
        match core::mem::replace(entry, Err(head)) {
            Ok(v) => {
                self.head = i as u32;
                self.len -= 1;
                Some(v)
            }
            Err(next) => {
                *entry = Err(next);
                None
            }
        }
    }
}
impl<T> Default for SlotMap<T> {
    fn default() -> Self {
        Self::new()
    }
}
pub struct Iter<'a, T> {
    entries: core::iter::Enumerate<core::slice::Iter<'a, Result<T, u32>>>,
}
impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (usize, &'a T);
    fn next(&mut self) -> Option<Self::Item> {
        for (i, v) in self.entries.by_ref() {
            if let Ok(v) = v {
                return Some((i, v));
            }
        }
        None
    }
}
impl<T> SlotMap<T> {
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { entries: self.entries.iter().enumerate() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_released_slots() {
        let mut map = SlotMap::new();
        let a = map.insert("a");
        let b = map.insert("b");
        let c = map.insert("c");
        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(map.len(), 3);

        assert_eq!(map.release(b), Some("b"));
        assert_eq!(map.release(b), None);
        assert_eq!(map.get(b), None);
        assert_eq!(map.release(a), Some("a"));
        assert_eq!(map.len(), 1);

        // last released is handed out first
        assert_eq!(map.next_idx(), a);
        assert_eq!(map.insert("d"), a);
        assert_eq!(map.insert("e"), b);
        assert_eq!(map.insert("f"), 3);
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn iterates_live_entries() {
        let mut map = SlotMap::new();
        for i in 0..5 {
            map.insert(i * 10);
        }
        map.release(1);
        map.release(3);
        if let Some(v) = map.get_mut(4) {
            *v += 1;
        }
        let live: Vec<_> = map.iter().map(|(i, v)| (i, *v)).collect();
        assert_eq!(live, [(0, 0), (2, 20), (4, 41)]);
        assert!(map.release(99).is_none());
    }
}
