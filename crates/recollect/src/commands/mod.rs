pub mod capture;
pub mod context;
pub mod display;
pub mod entries;
pub mod goals;
pub mod hooks;
pub mod import;
pub mod init;
pub mod search;
pub mod sessions;
pub mod status;
pub mod version;
