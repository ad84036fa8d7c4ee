/// Camera deployments are identified by the backend's integer primary key.
pub type DeploymentId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
