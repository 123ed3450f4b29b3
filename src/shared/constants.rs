/// Most activity entries returned by `GET /api/activity`
pub const RECENT_ACTIVITY_LIMIT: i64 = 50;
