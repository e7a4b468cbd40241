// Record trait for items kept in a persisted collection

use serde::{Deserialize, Serialize};

/// Core trait that any item stored in a collection slot must implement
pub trait Record: Serialize + for<'de> Deserialize<'de> + Clone + 'static {
    /// Unique identifier for this record
    fn id(&self) -> &str;

    /// Collection name for this record type (e.g., "taskflow-tasks")
    /// Doubles as the storage key the whole collection is persisted under.
    fn collection_name() -> &'static str
    where
        Self: Sized;
}

/// Find a record by exact id
pub fn find<'a, R: Record>(records: &'a [R], id: &str) -> Option<&'a R> {
    records.iter().find(|r| r.id() == id)
}

/// Find a record by exact id, mutably
pub fn find_mut<'a, R: Record>(records: &'a mut [R], id: &str) -> Option<&'a mut R> {
    records.iter_mut().find(|r| r.id() == id)
}

/// Resolve an id prefix to the single record id it identifies
///
/// An exact match always wins. Otherwise the prefix must match exactly one
/// record; ambiguous or unknown prefixes resolve to `None`.
pub fn resolve_prefix<'a, R: Record>(records: &'a [R], prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    if let Some(exact) = find(records, prefix) {
        return Some(exact.id());
    }

    let mut matches = records.iter().filter(|r| r.id().starts_with(prefix));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Some(only.id()),
        _ => None,
    }
}

/// Shortest prefix length (at least `min`) that keeps every record id distinct
pub fn unique_prefix_len<R: Record>(records: &[R], min: usize) -> usize {
    let longest = records.iter().map(|r| r.id().len()).max().unwrap_or(0);
    let mut len = min;
    while len < longest {
        let mut prefixes: Vec<&str> = records.iter().map(|r| r.id().get(..len).unwrap_or(r.id())).collect();
        prefixes.sort_unstable();
        let total = prefixes.len();
        prefixes.dedup();
        if prefixes.len() == total {
            break;
        }
        len += 1;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct TestRecord {
        id: String,
        name: String,
    }

    impl Record for TestRecord {
        fn id(&self) -> &str {
            &self.id
        }

        fn collection_name() -> &'static str {
            "test"
        }
    }

    fn record(id: &str) -> TestRecord {
        TestRecord {
            id: id.to_string(),
            name: format!("Record {}", id),
        }
    }

    #[test]
    fn test_record_trait_implementation() {
        let record = record("test-1");

        assert_eq!(record.id(), "test-1");
        assert_eq!(TestRecord::collection_name(), "test");
    }

    #[test]
    fn test_find_and_find_mut() {
        let mut records = vec![record("a1"), record("b2")];

        assert_eq!(find(&records, "b2").map(|r| r.name.as_str()), Some("Record b2"));
        assert!(find(&records, "c3").is_none());

        find_mut(&mut records, "a1").unwrap().name = "Renamed".to_string();
        assert_eq!(records[0].name, "Renamed");
    }

    #[test]
    fn test_resolve_prefix() {
        let records = vec![record("abc123"), record("abd456"), record("ab")];

        // Exact match beats the ambiguous prefix
        assert_eq!(resolve_prefix(&records, "ab"), Some("ab"));
        assert_eq!(resolve_prefix(&records, "abc"), Some("abc123"));
        assert_eq!(resolve_prefix(&records, "abd4"), Some("abd456"));
        assert_eq!(resolve_prefix(&records, "zz"), None);
        assert_eq!(resolve_prefix(&records, ""), None);
    }

    #[test]
    fn test_unique_prefix_len() {
        let records = vec![record("aaaa1111"), record("aaaa2222"), record("bbbb0000")];
        assert_eq!(unique_prefix_len(&records, 2), 5);
        assert_eq!(unique_prefix_len(&records, 6), 6);

        let single = vec![record("abc")];
        assert_eq!(unique_prefix_len(&single, 2), 2);
        assert_eq!(unique_prefix_len::<TestRecord>(&[], 8), 8);
    }

    #[test]
    fn test_resolve_prefix_ambiguous() {
        let records = vec![record("abc123"), record("abc456")];
        assert_eq!(resolve_prefix(&records, "abc"), None);
    }
}
