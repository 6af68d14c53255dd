pub mod bucket_handlers;
pub mod health_handlers;
pub mod import_handlers;
pub mod project_handlers;
pub mod task_handlers;
pub mod user_handlers;
