//! Generic filter, sort, and selection helpers for user-visible lists.
//!
//! Each helper returns a fresh list and never mutates its input, so
//! callers can chain them over snapshots taken from the store.

use core::cmp::Ordering;

/// Keep the items matching `predicate`, preserving their order.
pub fn filter_by_condition<T, P>(items: &[T], predicate: P) -> Vec<T>
where
    T: Clone,
    P: Fn(&T) -> bool,
{
    items.iter().filter(|item| predicate(item)).cloned().collect()
}

/// Sort a copy of `items` with `comparator`. Equal items keep their
/// relative order.
pub fn sort_by_criteria<T, C>(items: &[T], comparator: C) -> Vec<T>
where
    T: Clone,
    C: Fn(&T, &T) -> Ordering,
{
    let mut sorted = items.to_vec();
    sorted.sort_by(comparator);
    sorted
}

/// Let `chooser` pick one item by index.
///
/// The chooser sees the whole slice and returns an index, or `None` to
/// withdraw. Returns `None` for an empty slice (without consulting the
/// chooser), a withdrawal, or an out-of-range index.
pub fn select_one<T, F>(items: &[T], chooser: F) -> Option<&T>
where
    F: FnOnce(&[T]) -> Option<usize>,
{
    if items.is_empty() {
        return None;
    }
    chooser(items).and_then(|index| items.get(index))
}

/// The field a catalog list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortCriteria {
    /// Alphabetical, ignoring case.
    #[default]
    Name,
    /// Cheapest first.
    Price,
    /// Oldest first; unreleased last.
    ReleaseDate,
}

impl SortCriteria {
    /// The criterion after this one, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Name => Self::Price,
            Self::Price => Self::ReleaseDate,
            Self::ReleaseDate => Self::Name,
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Price => "price",
            Self::ReleaseDate => "release date",
        }
    }
}

impl core::fmt::Display for SortCriteria {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Case-insensitive string ordering shared by the name comparators.
pub(crate) fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Unicode case-insensitive equality, the uniqueness rule for usernames
/// and game names.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    cmp_ignore_case(a, b).is_eq()
}

/// Ordering of optional dates with `None` last.
pub(crate) fn cmp_dates_none_last<T: Ord>(a: Option<&T>, b: Option<&T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
