pub mod capture_backend;
pub mod coordinator_delegate;
pub mod network_quality;
