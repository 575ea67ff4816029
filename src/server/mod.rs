// file: src/server/mod.rs
// description: MCP server service, request schemas and prompt text
// reference: https://docs.rs/rmcp

pub mod prompts;
pub mod requests;
pub mod service;

pub use requests::{
    CacheErrorResponse, CacheLookupResponse, CacheQueryRequest, ComputeSecretRequest,
    GenerateItemsRequest, HelloRequest, SetTestContextRequest, StoreSecretRequest,
};
pub use service::RefServeMcp;
