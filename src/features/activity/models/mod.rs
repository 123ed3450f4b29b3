pub mod activity;

pub use activity::{ActivityEntry, ActivityType, NewActivity};
