//! Stack growth for the recursive walks over expression trees
//!
//! Nesting depth is limited by memory, not by the thread's stack. Every
//! recursive step (parsing, resolution, rendering, evaluation) runs through
//! `guarded`, which moves onto a fresh heap-allocated segment once the
//! current one is nearly used up.

use crate::config::compile_time::evaluation::{STACK_RED_ZONE, STACK_SEGMENT_SIZE};

#[inline]
pub fn guarded<R>(step: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, step)
}

#[cfg(test)]
mod tests {
    use super::guarded;

    fn count_down(n: usize) -> usize {
        if n == 0 {
            0
        } else {
            guarded(|| 1 + count_down(n - 1))
        }
    }

    #[test]
    fn test_deep_recursion_grows_stack() {
        let depth = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(|| count_down(200_000))
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(depth, 200_000);
    }
}
