//! Powerset enumeration.
//!
//! `combinations(items)` yields all `2^n` subsets of `items` by ascending
//! bitmask over item positions. Subset `k` contains `items[i]` exactly when
//! bit `i` of `k` is set, and keeps the input order. The first subset is
//! always empty and the last is always the full list.

/// Iterator over every subset of a slice. Created by [`combinations`].
#[derive(Debug, Clone)]
pub struct Combinations<'a, T> {
    items: &'a [T],
    mask: u128,
    end: u128,
}

/// Enumerate every subset of `items`, including the empty and full subsets.
///
/// # Panics
///
/// Panics if `items` holds 128 or more elements; such a powerset could never
/// be enumerated anyway.
pub fn combinations<T: Clone>(items: &[T]) -> Combinations<'_, T> {
    assert!(
        items.len() < 128,
        "cannot enumerate the powerset of {} items",
        items.len()
    );
    Combinations {
        items,
        mask: 0,
        end: 1u128 << items.len(),
    }
}

impl<T: Clone> Iterator for Combinations<'_, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if self.mask >= self.end {
            return None;
        }
        let mask = self.mask;
        self.mask += 1;
        Some(
            self.items
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1u128 << i) != 0)
                .map(|(_, item)| item.clone())
                .collect(),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.mask;
        match usize::try_from(remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::combinations;

    #[test]
    fn empty_input_yields_only_the_empty_subset() {
        let subsets: Vec<Vec<u8>> = combinations(&[]).collect();
        assert_eq!(subsets, vec![Vec::<u8>::new()]);
    }

    #[test]
    fn single_item_yields_empty_and_full() {
        let subsets: Vec<Vec<&str>> = combinations(&["delete"]).collect();
        assert_eq!(subsets, vec![vec![], vec!["delete"]]);
    }

    #[test]
    fn two_items_in_bitmask_order() {
        let subsets: Vec<Vec<&str>> = combinations(&["create", "update"]).collect();
        assert_eq!(
            subsets,
            vec![vec![], vec!["create"], vec!["update"], vec!["create", "update"]]
        );
    }

    #[test]
    fn yields_two_to_the_n_distinct_subsets() {
        for n in 0..=10usize {
            let items: Vec<usize> = (0..n).collect();
            let subsets: Vec<Vec<usize>> = combinations(&items).collect();
            assert_eq!(subsets.len(), 1 << n, "wrong subset count for n={n}");

            let unique: HashSet<Vec<usize>> = subsets.iter().cloned().collect();
            assert_eq!(unique.len(), subsets.len(), "duplicate subset for n={n}");

            assert_eq!(subsets.first().unwrap(), &Vec::<usize>::new());
            assert_eq!(subsets.last().unwrap(), &items);
        }
    }

    #[test]
    fn subsets_preserve_input_order() {
        for subset in combinations(&[3, 1, 2]) {
            let positions: Vec<usize> = subset
                .iter()
                .map(|x| [3, 1, 2].iter().position(|y| y == x).unwrap())
                .collect();
            let mut sorted = positions.clone();
            sorted.sort();
            assert_eq!(positions, sorted);
        }
    }

    #[test]
    fn size_hint_is_exact() {
        let mut iter = combinations(&['a', 'b', 'c']);
        assert_eq!(iter.size_hint(), (8, Some(8)));
        iter.next();
        assert_eq!(iter.size_hint(), (7, Some(7)));
    }

    #[test]
    fn iteration_is_deterministic() {
        let first: Vec<Vec<u8>> = combinations(&[1, 2, 3, 4]).collect();
        let second: Vec<Vec<u8>> = combinations(&[1, 2, 3, 4]).collect();
        assert_eq!(first, second);
    }
}
