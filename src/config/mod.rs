pub mod application_info;
pub mod proc_loader;
pub mod properties;
pub mod settings;
