//! Sharing and locking primitives selected by the `threadsafe` feature.
//!
//! With `threadsafe` (the default) state is shared through `Arc`, flags are
//! atomics, containers sit behind a `parking_lot::Mutex` and the publisher
//! map is a `dashmap::DashMap`. Without it the same API is backed by `Rc`,
//! `Cell` and `RefCell`: ordering is unchanged, and the compiler rejects any
//! attempt to move the types across threads.
//!
//! Guards returned by `Lock::lock` must never be held while user code runs.

pub use imp::{Flag, KeyedMap, Lock, Shareable, Shared, WeakShared};

#[cfg(feature = "threadsafe")]
mod imp {
    use dashmap::DashMap;
    use std::hash::Hash;
    use std::sync::atomic::{AtomicBool, Ordering};

    pub use std::sync::{Arc as Shared, Weak as WeakShared};

    /// Bound placed on slots and shared values: `Send + Sync` in this build.
    pub trait Shareable: Send + Sync {}

    impl<T: Send + Sync + ?Sized> Shareable for T {}

    #[derive(Debug, Default)]
    pub struct Lock<T>(parking_lot::Mutex<T>);

    impl<T> Lock<T> {
        pub fn new(value: T) -> Self {
            Self(parking_lot::Mutex::new(value))
        }

        pub fn lock(&self) -> parking_lot::MutexGuard<'_, T> {
            self.0.lock()
        }
    }

    #[derive(Debug, Default)]
    pub struct Flag(AtomicBool);

    impl Flag {
        pub fn new(value: bool) -> Self {
            Self(AtomicBool::new(value))
        }

        pub fn get(&self) -> bool {
            self.0.load(Ordering::Acquire)
        }

        pub fn set(&self, value: bool) {
            self.0.store(value, Ordering::Release);
        }

        /// Store `value`, returning the previous one.
        pub fn replace(&self, value: bool) -> bool {
            self.0.swap(value, Ordering::AcqRel)
        }
    }

    pub struct KeyedMap<K, V>(DashMap<K, V>);

    impl<K: Eq + Hash, V> KeyedMap<K, V> {
        pub fn new() -> Self {
            Self(DashMap::new())
        }

        /// Run `f` on the value for `key`, inserting a default first if absent.
        pub fn with_or_default<R>(&self, key: K, f: impl FnOnce(&V) -> R) -> R
        where
            V: Default,
        {
            let entry = self.0.entry(key).or_default();
            f(entry.value())
        }

        pub fn with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
            self.0.get(key).map(|entry| f(entry.value()))
        }

        pub fn remove(&self, key: &K) -> Option<V> {
            self.0.remove(key).map(|(_, value)| value)
        }

        pub fn contains_key(&self, key: &K) -> bool {
            self.0.contains_key(key)
        }

        pub fn len(&self) -> usize {
            self.0.len()
        }

        pub fn clear(&self) {
            self.0.clear();
        }
    }
}

#[cfg(not(feature = "threadsafe"))]
mod imp {
    use std::cell::{Cell, RefCell, RefMut};
    use std::collections::HashMap;
    use std::hash::Hash;

    pub use std::rc::{Rc as Shared, Weak as WeakShared};

    /// Bound placed on slots and shared values: no requirement in this build.
    pub trait Shareable {}

    impl<T: ?Sized> Shareable for T {}

    #[derive(Debug, Default)]
    pub struct Lock<T>(RefCell<T>);

    impl<T> Lock<T> {
        pub fn new(value: T) -> Self {
            Self(RefCell::new(value))
        }

        pub fn lock(&self) -> RefMut<'_, T> {
            self.0.borrow_mut()
        }
    }

    #[derive(Debug, Default)]
    pub struct Flag(Cell<bool>);

    impl Flag {
        pub fn new(value: bool) -> Self {
            Self(Cell::new(value))
        }

        pub fn get(&self) -> bool {
            self.0.get()
        }

        pub fn set(&self, value: bool) {
            self.0.set(value);
        }

        /// Store `value`, returning the previous one.
        pub fn replace(&self, value: bool) -> bool {
            self.0.replace(value)
        }
    }

    pub struct KeyedMap<K, V>(RefCell<HashMap<K, V>>);

    impl<K: Eq + Hash, V> KeyedMap<K, V> {
        pub fn new() -> Self {
            Self(RefCell::new(HashMap::new()))
        }

        /// Run `f` on the value for `key`, inserting a default first if absent.
        pub fn with_or_default<R>(&self, key: K, f: impl FnOnce(&V) -> R) -> R
        where
            V: Default,
        {
            let mut map = self.0.borrow_mut();
            f(map.entry(key).or_default())
        }

        pub fn with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
            self.0.borrow().get(key).map(f)
        }

        pub fn remove(&self, key: &K) -> Option<V> {
            self.0.borrow_mut().remove(key)
        }

        pub fn contains_key(&self, key: &K) -> bool {
            self.0.borrow().contains_key(key)
        }

        pub fn len(&self) -> usize {
            self.0.borrow().len()
        }

        pub fn clear(&self) {
            self.0.borrow_mut().clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_replace_returns_previous() {
        let flag = Flag::new(true);
        assert!(flag.replace(false));
        assert!(!flag.replace(false));
        assert!(!flag.get());
    }

    #[test]
    fn test_keyed_map_inserts_default_once() {
        let map: KeyedMap<&str, Lock<Vec<u32>>> = KeyedMap::new();
        map.with_or_default("a", |v| v.lock().push(1));
        map.with_or_default("a", |v| v.lock().push(2));

        assert_eq!(map.len(), 1);
        assert_eq!(map.with(&"a", |v| v.lock().clone()), Some(vec![1, 2]));
        assert_eq!(map.with(&"b", |v| v.lock().len()), None);
        assert!(map.remove(&"a").is_some());
        assert!(!map.contains_key(&"a"));
    }
}
