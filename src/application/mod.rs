// Application layer - Ports and use cases
pub mod block_renderer;
pub mod dashboard_service;
pub mod gateway_port;
pub mod poller;
pub mod query_binder;
