//! custody-bootstrap - 网关启动骨架

mod runtime;

pub use runtime::*;
