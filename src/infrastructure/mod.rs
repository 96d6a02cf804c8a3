pub mod audio;
pub mod notify;
pub mod observability;
pub mod persistence;
pub mod storage;
