//! ## Primitive dynamic arrays
//!
//! Growable sequences over `i32` and `f32` with amortized-constant push,
//! used as stacks (`push`/`peek`/`pop`) and as scratch storage inside
//! traversals (e.g. the nearest-entry id collection in
//! [`crate::traversal::nearest`]). Backed by a plain `Vec` — there is no
//! boxing to avoid in Rust the way the teacher's tree-of-boxes code must
//! avoid it at the entry level, but keeping these as dedicated types (rather
//! than bare `Vec<i32>`/`Vec<f32>` at every call site) keeps the `reset`
//! vs. `clear` distinction explicit.

/// Below this capacity, `clear` keeps the backing allocation instead of
/// releasing it, the same way the arena-style examples in the reference
/// pack avoid reallocating small scratch buffers on every traversal.
const CLEAR_SHRINK_THRESHOLD: usize = 64;

macro_rules! primitive_array {
    ($name:ident, $elem:ty) => {
        #[derive(Debug, Clone, Default)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize)
        )]
        pub struct $name {
            items: Vec<$elem>,
        }

        impl $name {
            pub fn new() -> Self {
                Self { items: Vec::new() }
            }

            pub fn with_capacity(capacity: usize) -> Self {
                Self {
                    items: Vec::with_capacity(capacity),
                }
            }

            pub fn push(&mut self, value: $elem) {
                self.items.push(value);
            }

            pub fn pop(&mut self) -> Option<$elem> {
                self.items.pop()
            }

            pub fn peek(&self) -> Option<$elem> {
                self.items.last().copied()
            }

            pub fn get(&self, index: usize) -> $elem {
                self.items[index]
            }

            pub fn set(&mut self, index: usize, value: $elem) {
                self.items[index] = value;
            }

            pub fn size(&self) -> usize {
                self.items.len()
            }

            pub fn is_empty(&self) -> bool {
                self.items.is_empty()
            }

            /// Sets the logical size to zero without releasing capacity.
            pub fn reset(&mut self) {
                self.items.clear();
            }

            /// Sets the logical size to zero, releasing the backing
            /// allocation once its capacity exceeds a small threshold.
            pub fn clear(&mut self) {
                self.items.clear();
                if self.items.capacity() > CLEAR_SHRINK_THRESHOLD {
                    self.items.shrink_to_fit();
                }
            }

            pub fn iter(&self) -> std::slice::Iter<'_, $elem> {
                self.items.iter()
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a $elem;
            type IntoIter = std::slice::Iter<'a, $elem>;

            fn into_iter(self) -> Self::IntoIter {
                self.items.iter()
            }
        }
    };
}

primitive_array!(IntArray, i32);
primitive_array!(FloatArray, f32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_peek_round_trip() {
        let mut a = IntArray::new();
        a.push(1);
        a.push(2);
        a.push(3);
        assert_eq!(a.size(), 3);
        assert_eq!(a.peek(), Some(3));
        assert_eq!(a.pop(), Some(3));
        assert_eq!(a.size(), 2);
    }

    #[test]
    fn reset_keeps_capacity() {
        let mut a = FloatArray::with_capacity(32);
        a.push(1.0);
        a.push(2.0);
        let cap_before = a.items.capacity();
        a.reset();
        assert_eq!(a.size(), 0);
        assert_eq!(a.items.capacity(), cap_before);
    }

    #[test]
    fn clear_shrinks_past_threshold() {
        let mut a = IntArray::with_capacity(CLEAR_SHRINK_THRESHOLD + 8);
        for i in 0..(CLEAR_SHRINK_THRESHOLD as i32 + 8) {
            a.push(i);
        }
        a.clear();
        assert_eq!(a.size(), 0);
        assert!(a.items.capacity() <= CLEAR_SHRINK_THRESHOLD);
    }

    #[test]
    fn get_set_index_into_array() {
        let mut a = FloatArray::new();
        a.push(1.0);
        a.push(2.0);
        a.set(1, 9.5);
        assert_eq!(a.get(1), 9.5);
    }
}
