pub mod user_handler;

pub use user_handler::{
    __path_delete_user, __path_get_profile, __path_list_users, __path_login, __path_register,
    delete_user, get_profile, list_users, login, register,
};
