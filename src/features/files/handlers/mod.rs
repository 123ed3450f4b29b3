pub mod file_handler;

pub use file_handler::{
    __path_delete_file, __path_download_file, __path_get_file_data, __path_list_files,
    __path_upload_file, delete_file, download_file, get_file_data, list_files, upload_file,
};
