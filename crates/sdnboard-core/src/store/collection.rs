// ── Generic reactive entity collection ──
//
// Concurrent keyed storage with push-based change notification via
// `watch` channels. Snapshots are ordered by natural key order so tables
// list `h2` before `h10`.

use std::cmp::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

/// A reactive collection for a single entity type.
///
/// The only mutation is `replace_all`, which swaps the whole content and
/// publishes exactly one snapshot to subscribers.
pub(crate) struct EntityCollection<T: Clone + Send + Sync + 'static> {
    /// Primary storage: key string -> entity.
    by_key: DashMap<String, Arc<T>>,

    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_key: DashMap::new(),
            snapshot,
        }
    }

    /// Replace the whole collection. Later duplicates of a key win.
    pub(crate) fn replace_all(&self, entries: impl IntoIterator<Item = (String, T)>) {
        self.by_key.clear();
        for (key, entity) in entries {
            self.by_key.insert(key, Arc::new(entity));
        }
        self.rebuild_snapshot();
    }

    pub(crate) fn get_by_key(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    /// All current keys in natural order.
    pub(crate) fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.by_key.iter().map(|r| r.key().clone()).collect();
        keys.sort_by(|a, b| natural_cmp(a, b));
        keys
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn rebuild_snapshot(&self) {
        let mut entries: Vec<(String, Arc<T>)> = self
            .by_key
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        entries.sort_by(|a, b| natural_cmp(&a.0, &b.0));
        let values: Vec<Arc<T>> = entries.into_iter().map(|(_, v)| v).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}

/// Compare strings treating embedded digit runs as numbers.
pub(crate) fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();
    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let lhs = take_number(&mut left);
                let rhs = take_number(&mut right);
                // Longer digit runs (after stripping zeros) are larger.
                let ord = lhs
                    .trim_start_matches('0')
                    .len()
                    .cmp(&rhs.trim_start_matches('0').len())
                    .then_with(|| lhs.trim_start_matches('0').cmp(rhs.trim_start_matches('0')))
                    .then_with(|| lhs.len().cmp(&rhs.len()));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(&'static str);

    #[test]
    fn replace_all_swaps_content_and_publishes_once() {
        let col: EntityCollection<Item> = EntityCollection::new();
        col.replace_all([("h1".to_owned(), Item("one")), ("h2".to_owned(), Item("two"))]);
        let mut rx = col.subscribe();

        col.replace_all([("h3".to_owned(), Item("three"))]);

        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert!(!rx.has_changed().unwrap());
        assert_eq!(col.len(), 1);
        assert!(col.get_by_key("h1").is_none());
        assert!(col.contains_key("h3"));
        assert_eq!(col.snapshot()[0].0, "three");
    }

    #[test]
    fn replace_all_with_same_data_is_stable() {
        let col: EntityCollection<Item> = EntityCollection::new();
        let data = || vec![("h1".to_owned(), Item("a")), ("h2".to_owned(), Item("b"))];
        col.replace_all(data());
        let first: Vec<Item> = col.snapshot().iter().map(|i| (**i).clone()).collect();
        col.replace_all(data());
        let second: Vec<Item> = col.snapshot().iter().map(|i| (**i).clone()).collect();
        assert_eq!(first, second);
        assert_eq!(col.len(), 2);
    }

    #[test]
    fn snapshot_uses_natural_order() {
        let col: EntityCollection<Item> = EntityCollection::new();
        col.replace_all([
            ("h10".to_owned(), Item("ten")),
            ("h2".to_owned(), Item("two")),
            ("h1".to_owned(), Item("one")),
        ]);
        let names: Vec<&str> = col.snapshot().iter().map(|i| i.0).collect();
        assert_eq!(names, ["one", "two", "ten"]);
        assert_eq!(col.keys(), ["h1", "h2", "h10"]);
    }

    #[test]
    fn natural_cmp_handles_link_keys() {
        assert_eq!(natural_cmp("2-3", "10-2"), Ordering::Less);
        assert_eq!(natural_cmp("1-10", "1-9"), Ordering::Greater);
        assert_eq!(natural_cmp("h01", "h1"), Ordering::Greater);
        assert_eq!(natural_cmp("abc", "abc"), Ordering::Equal);
    }

    #[test]
    fn later_duplicate_keys_win() {
        let col: EntityCollection<Item> = EntityCollection::new();
        col.replace_all([("b".to_owned(), Item("first")), ("b".to_owned(), Item("second"))]);
        assert_eq!(col.len(), 1);
        assert_eq!(col.get_by_key("b").unwrap().0, "second");
    }

    #[tokio::test]
    async fn subscribers_see_replacement() {
        let col: EntityCollection<Item> = EntityCollection::new();
        let mut rx = col.subscribe();
        col.replace_all([("k".to_owned(), Item("v"))]);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 1);
    }
}
