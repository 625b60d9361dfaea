use serde::{Deserialize, Serialize};

/// A user profile as returned by the remote directory endpoint.
///
/// The remote response carries many more fields (address, company, phone);
/// only the three below are kept. All three are required, so an entry
/// missing any of them fails the decode instead of propagating a partial
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}
