/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Chat-server identifier supplied by the chat adapter.
pub type CommunityId = String;
