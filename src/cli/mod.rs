pub mod command;
pub mod info;
pub mod record;
pub mod report;
