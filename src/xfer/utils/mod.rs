pub mod format;
pub mod path_resolver;
