pub mod accounts;
pub mod init;
pub mod maintenance;
pub mod notes;
