// Copyright 2026 The Skein Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Generation-checked arena storage, replacing the original's pervasive
//! intrusive doubly-linked owning pointers (spec §9, Design Notes). Every
//! cross-reference that used to be a raw pointer (buffer siblings, line
//! lists, window tree edges, scroll-list entries) is a `Handle<T>` into one
//! of these arenas. `is_valid` is O(1) and never dangles: a freed slot's
//! generation is bumped so stale handles compare unequal.

use slab::Slab;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

pub struct Handle<T> {
    index: usize,
    generation: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}
impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handle({}, gen {})", self.index, self.generation)
    }
}

impl<T> Handle<T> {
    /// A handle that is never valid in any arena (generation `0` is never
    /// issued by `Arena::insert`, which starts counting at `1`). Used as a
    /// throwaway placeholder while wiring up a node and its payload in the
    /// same insertion step, before the real handle is known.
    pub fn dangling() -> Self {
        Handle { index: usize::MAX, generation: 0, _marker: PhantomData }
    }
}

struct Slot<T> {
    value: T,
    generation: u64,
}

/// An arena of `T`, addressed by generation-checked `Handle<T>`.
pub struct Arena<T> {
    slots: Slab<Slot<T>>,
    next_generation: u64,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self { slots: Slab::new(), next_generation: 1 }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> Handle<T> {
        let generation = self.next_generation;
        self.next_generation += 1;
        let index = self.slots.insert(Slot { value, generation });
        Handle { index, generation, _marker: PhantomData }
    }

    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        if !self.is_valid(handle) {
            return None;
        }
        Some(self.slots.remove(handle.index).value)
    }

    pub fn is_valid(&self, handle: Handle<T>) -> bool {
        self.slots.get(handle.index).map(|s| s.generation == handle.generation).unwrap_or(false)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.slots
            .get(handle.index)
            .filter(|s| s.generation == handle.generation)
            .map(|s| &s.value)
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index)
            .filter(|s| s.generation == handle.generation)
            .map(|s| &mut s.value)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots.iter().map(|(index, slot)| {
            (Handle { index, generation: slot.generation, _marker: PhantomData }, &slot.value)
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.slots.iter_mut().map(|(index, slot)| {
            (Handle { index, generation: slot.generation, _marker: PhantomData }, &mut slot.value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_handle_invalid_after_remove() {
        let mut arena: Arena<&'static str> = Arena::new();
        let h1 = arena.insert("a");
        assert!(arena.is_valid(h1));
        arena.remove(h1);
        assert!(!arena.is_valid(h1));
        let h2 = arena.insert("b");
        // same slot index may be reused, but generation differs.
        assert_ne!(h1, h2);
        assert!(arena.get(h1).is_none());
        assert_eq!(arena.get(h2), Some(&"b"));
    }
}
