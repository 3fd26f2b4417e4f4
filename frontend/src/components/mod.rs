pub mod format;
pub mod search;
pub mod status;
pub mod template;
