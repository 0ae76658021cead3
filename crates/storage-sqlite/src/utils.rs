//! Helpers for working within SQLite's limits.

/// Largest id list bound into a single `IN (...)` clause.
///
/// SQLite caps statement parameters (historically at 999), so long id lists
/// are split and queried chunk by chunk.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Splits `items` into slices small enough for one `IN (...)` query.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_for_sqlite_empty() {
        let items: Vec<String> = vec![];
        assert_eq!(chunk_for_sqlite(&items).count(), 0);
    }

    #[test]
    fn test_chunk_for_sqlite_over_limit() {
        let ids: Vec<String> = (0..1200).map(|i| format!("campaign-{}", i)).collect();
        let sizes: Vec<usize> = chunk_for_sqlite(&ids).map(<[String]>::len).collect();
        assert_eq!(sizes, vec![SQLITE_MAX_PARAMS_CHUNK, SQLITE_MAX_PARAMS_CHUNK, 200]);
    }
}
