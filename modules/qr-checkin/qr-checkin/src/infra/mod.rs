pub mod http_validation_client;

pub use http_validation_client::HttpValidationClient;
