//! Response envelope used by the analytics endpoints.

use serde::Serialize;

/// `{ "data": T }`.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
