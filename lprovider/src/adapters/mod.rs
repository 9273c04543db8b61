#[cfg(feature = "http-transport")]
pub mod http;

pub mod llama_cpp;
