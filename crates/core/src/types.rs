/// All database primary keys are SQLite INTEGER PRIMARY KEY.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (birthdays, scheduled deliveries) carry no time zone.
pub type Date = chrono::NaiveDate;
