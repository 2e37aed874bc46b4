//! Update-stream checkpoints.

use serde::{Deserialize, Serialize};

/// Last-seen position in the server's update stream for one account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateState {
    pub pts: i32,
    pub qts: i32,
    /// Unix seconds.
    pub date: i64,
    pub seq: i32,
    /// Not persisted; always 0 after a reload.
    #[serde(default)]
    pub unread_count: i32,
}

impl UpdateState {
    pub fn new(pts: i32, qts: i32, date: i64, seq: i32) -> Self {
        Self {
            pts,
            qts,
            date,
            seq,
            unread_count: 0,
        }
    }
}
