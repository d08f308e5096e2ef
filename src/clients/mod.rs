pub mod dify_client;

pub use dify_client::DifyClient;
