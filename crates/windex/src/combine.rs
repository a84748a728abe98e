use std::path::PathBuf;

use crate::enumerate::OrderingStrategy;

pub trait Combine {
    /// Combine two settings layers, preferring the values in `self`.
    ///
    /// Scalars from the higher precedence layer win outright. Lists are joined with the higher
    /// precedence items placed first, so a project-level module directory is searched before a
    /// user-level one.
    #[must_use]
    fn combine(self, other: Self) -> Self;
}

macro_rules! impl_combine_or {
    ($name:ty) => {
        impl Combine for Option<$name> {
            fn combine(self, other: Option<$name>) -> Option<$name> {
                self.or(other)
            }
        }
    };
}

impl_combine_or!(bool);
impl_combine_or!(PathBuf);
impl_combine_or!(OrderingStrategy);

impl<T: PartialEq> Combine for Option<Vec<T>> {
    /// Extend the higher precedence vector (`self`) with the entries of the lower precedence
    /// vector (`other`) it does not already hold.
    fn combine(self, other: Option<Vec<T>>) -> Option<Vec<T>> {
        match (self, other) {
            (Some(mut a), Some(b)) => {
                for item in b {
                    if !a.contains(&item) {
                        a.push(item);
                    }
                }
                Some(a)
            }
            (a, b) => a.or(b),
        }
    }
}
