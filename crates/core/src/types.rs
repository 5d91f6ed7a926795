/// Record identifiers as issued by the listing backend.
pub type DbId = i64;

/// Identifier of a row inside a single dynamic list. Unique per list,
/// never reused after removal.
pub type RowId = u64;
