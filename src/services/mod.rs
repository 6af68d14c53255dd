pub mod board_service;
pub mod bucket_service;
pub mod filter;
pub mod import_service;
pub mod permissions;
pub mod position;
pub mod project_service;
pub mod task_filter;
pub mod task_service;
pub mod user_service;
