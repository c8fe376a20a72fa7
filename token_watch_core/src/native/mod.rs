// Native implementations

pub mod http;
pub mod storage_impl;
pub mod rpc_impl;

pub use http::NativeHttpClient;
pub use storage_impl::FileStorage;
pub use rpc_impl::NativeRpcClient;
