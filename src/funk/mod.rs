//! Functional combinators
//!
//! Small building blocks for a functional core:
//! - composition (`compose`, `pipe`, `flip`, `curry`)
//! - wrappers (`before`, `after`, `around`, `provided`)
//! - operator sections (`add(1)`, `gt(3)`, ...)
//! - curried persistent updates over frozen containers
//!
//! Operator sections take the operand first and the subject second, so
//! `sub_by(2)(10) == 8` and `gt(3)(&5)` is true.

use std::ops::{Add, Div, Mul, RangeBounds, Rem, Sub};
use std::sync::Arc;

use crate::frozen::{FrozenList, FrozenMap};

/// `compose(f, g)(x) == f(g(x))`
pub fn compose<A, B, C, F, G>(f: F, g: G) -> impl Fn(A) -> C
where
    F: Fn(B) -> C,
    G: Fn(A) -> B,
{
    move |x| f(g(x))
}

/// `pipe(f, g)(x) == g(f(x))`
pub fn pipe<A, B, C, F, G>(f: F, g: G) -> impl Fn(A) -> C
where
    F: Fn(A) -> B,
    G: Fn(B) -> C,
{
    move |x| g(f(x))
}

/// Swaps the two arguments of `f`
pub fn flip<A, B, R, F>(f: F) -> impl Fn(B, A) -> R
where
    F: Fn(A, B) -> R,
{
    move |b, a| f(a, b)
}

/// Turns a two-argument function into a chain of one-argument functions.
pub fn curry<A, B, R, F>(f: F) -> impl Fn(A) -> Box<dyn Fn(B) -> R>
where
    F: Fn(A, B) -> R + 'static,
    A: Clone + 'static,
    B: 'static,
    R: 'static,
{
    let f = Arc::new(f);
    move |a| {
        let f = Arc::clone(&f);
        Box::new(move |b| f(a.clone(), b))
    }
}

/// Runs `hook` on the argument, then `f`.
pub fn before<A, R, H, F>(hook: H, f: F) -> impl Fn(A) -> R
where
    H: Fn(&A),
    F: Fn(A) -> R,
{
    move |x| {
        hook(&x);
        f(x)
    }
}

/// Runs `f`, then `hook` on its result, and returns the result.
pub fn after<A, R, H, F>(hook: H, f: F) -> impl Fn(A) -> R
where
    H: Fn(&R),
    F: Fn(A) -> R,
{
    move |x| {
        let result = f(x);
        hook(&result);
        result
    }
}

/// Hands `f` and the argument to `wrapper`, which decides what to do.
pub fn around<A, R, W, F>(wrapper: W, f: F) -> impl Fn(A) -> R
where
    W: Fn(&F, A) -> R,
    F: Fn(A) -> R,
{
    move |x| wrapper(&f, x)
}

/// Calls `f` only when `guard` accepts the argument.
pub fn provided<A, R, G, F>(guard: G, f: F) -> impl Fn(A) -> Option<R>
where
    G: Fn(&A) -> bool,
    F: Fn(A) -> R,
{
    move |x| if guard(&x) { Some(f(x)) } else { None }
}

// Operator sections

pub fn add<T>(n: T) -> impl Fn(T) -> T
where
    T: Add<Output = T> + Clone,
{
    move |x| x + n.clone()
}

pub fn sub_by<T>(n: T) -> impl Fn(T) -> T
where
    T: Sub<Output = T> + Clone,
{
    move |x| x - n.clone()
}

pub fn mul_by<T>(n: T) -> impl Fn(T) -> T
where
    T: Mul<Output = T> + Clone,
{
    move |x| x * n.clone()
}

pub fn div_by<T>(n: T) -> impl Fn(T) -> T
where
    T: Div<Output = T> + Clone,
{
    move |x| x / n.clone()
}

pub fn mod_by<T>(n: T) -> impl Fn(T) -> T
where
    T: Rem<Output = T> + Clone,
{
    move |x| x % n.clone()
}

pub fn eq<T: PartialEq>(n: T) -> impl Fn(&T) -> bool {
    move |x| *x == n
}

pub fn ne<T: PartialEq>(n: T) -> impl Fn(&T) -> bool {
    move |x| *x != n
}

pub fn gt<T: PartialOrd>(n: T) -> impl Fn(&T) -> bool {
    move |x| *x > n
}

pub fn ge<T: PartialOrd>(n: T) -> impl Fn(&T) -> bool {
    move |x| *x >= n
}

pub fn lt<T: PartialOrd>(n: T) -> impl Fn(&T) -> bool {
    move |x| *x < n
}

pub fn le<T: PartialOrd>(n: T) -> impl Fn(&T) -> bool {
    move |x| *x <= n
}

// Persistent updates. Every function returns a new container.

pub fn get_item<K, V>(key: K) -> impl Fn(&FrozenMap<K, V>) -> Option<V>
where
    K: Ord,
    V: Clone,
{
    move |map| map.get(&key).cloned()
}

pub fn set_item<K, V>(key: K, value: V) -> impl Fn(&FrozenMap<K, V>) -> FrozenMap<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    move |map| map.with(key.clone(), value.clone())
}

pub fn delete_item<K, V>(key: K) -> impl Fn(&FrozenMap<K, V>) -> FrozenMap<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    move |map| map.without(&key)
}

pub fn set_slice<T, R>(range: R, items: Vec<T>) -> impl Fn(&FrozenList<T>) -> FrozenList<T>
where
    T: Clone,
    R: RangeBounds<usize> + Clone,
{
    move |list| list.set_slice(range.clone(), items.iter().cloned())
}

pub fn delete_slice<T, R>(range: R) -> impl Fn(&FrozenList<T>) -> FrozenList<T>
where
    T: Clone,
    R: RangeBounds<usize> + Clone,
{
    move |list| list.delete_slice(range.clone())
}
