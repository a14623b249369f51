/// Numeric primary keys (locations, tags, shipments, bases).
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Human-readable box identifier printed on the box label.
pub type LabelIdentifier = String;
