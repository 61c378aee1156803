/// Priority given to items that have none, so they sort after every real priority.
pub const MISSING_PRIORITY: u8 = 99;

/// Items that carry an optional priority (1 is most important).
pub trait Prioritized {
    fn prio(&self) -> Option<u8>;
}

/// Stable ascending sort by priority. Items without a priority go last and
/// items with equal priority keep their insertion order.
pub fn sort_by_priority<T: Prioritized + Clone>(items: &[T]) -> Vec<T> {
    let mut sorted = items.to_vec();
    // sort_by_key is a stable sort
    sorted.sort_by_key(|item| item.prio().unwrap_or(MISSING_PRIORITY));
    sorted
}

/// Next priority in the None -> 1 -> 2 -> 3 -> None cycle
pub fn cycle_priority(prio: Option<u8>) -> Option<u8> {
    match prio {
        None => Some(1),
        Some(p) if p < 3 => Some(p + 1),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        label: &'static str,
        prio: Option<u8>,
    }

    impl Prioritized for Entry {
        fn prio(&self) -> Option<u8> {
            self.prio
        }
    }

    fn entry(label: &'static str, prio: Option<u8>) -> Entry {
        Entry { label, prio }
    }

    #[test]
    fn test_missing_priority_sorts_last_and_stays_stable() {
        let items = vec![
            entry("two", Some(2)),
            entry("none-a", None),
            entry("one", Some(1)),
            entry("none-b", None),
        ];
        let labels: Vec<_> = sort_by_priority(&items).iter().map(|e| e.label).collect();
        assert_eq!(labels, vec!["one", "two", "none-a", "none-b"]);
    }

    #[test]
    fn test_equal_priorities_keep_insertion_order() {
        let items = vec![
            entry("first", Some(2)),
            entry("second", Some(2)),
            entry("top", Some(1)),
            entry("third", Some(2)),
        ];
        let labels: Vec<_> = sort_by_priority(&items).iter().map(|e| e.label).collect();
        assert_eq!(labels, vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_cycle_priority() {
        assert_eq!(cycle_priority(None), Some(1));
        assert_eq!(cycle_priority(Some(1)), Some(2));
        assert_eq!(cycle_priority(Some(3)), None);
    }
}
