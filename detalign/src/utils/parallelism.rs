//! Maps over slices in parallel if the `parallel` feature is enabled and sequentially otherwise.
//! Results are always in input order.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub trait MaybeParallelRefIterator<T> {
    fn maybe_par_map<U, F>(&self, f: F) -> Vec<U>
    where
        T: Sync,
        U: Send,
        F: Fn(usize, &T) -> U + Sync + Send;
}

impl<T> MaybeParallelRefIterator<T> for [T] {
    #[cfg(feature = "parallel")]
    fn maybe_par_map<U, F>(&self, f: F) -> Vec<U>
    where
        T: Sync,
        U: Send,
        F: Fn(usize, &T) -> U + Sync + Send,
    {
        self.par_iter()
            .enumerate()
            .map(|(i, x)| f(i, x))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn maybe_par_map<U, F>(&self, f: F) -> Vec<U>
    where
        T: Sync,
        U: Send,
        F: Fn(usize, &T) -> U + Sync + Send,
    {
        self.iter().enumerate().map(|(i, x)| f(i, x)).collect()
    }
}
