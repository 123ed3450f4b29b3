pub mod activity_handler;

pub use activity_handler::{__path_list_activity, list_activity};
