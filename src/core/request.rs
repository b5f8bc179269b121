//! Identity of a queued move request.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifies one accepted `move_to` request.
///
/// Returned to the caller when a request is queued; used to cancel it
/// before it starts and to correlate notifications and history records.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn uuid_and_display_agree() {
        let id = RequestId::new();
        assert_eq!(id.as_uuid().get_version_num(), 4);
        assert_eq!(id.to_string(), id.as_uuid().to_string());
    }
}
