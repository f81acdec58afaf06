//! gRPC 客户端

pub mod custody {
    tonic::include_proto!("lab.system.custody");
}

use std::time::{Duration, Instant};

use async_trait::async_trait;
use custody::custody_service_client::CustodyServiceClient;
use custody::{Custodies, CustodyAdd, CustodyFilter, Empty};
use custody_config::CustodyConfig;
use custody_errors::{code_name, AppError, AppResult};
use custody_telemetry::record_rpc_call;
use tonic::transport::{Channel, Endpoint};
use tonic::Code;
use tracing::error;

use crate::custody::CustodyPort;

/// custody 服务 gRPC 客户端
///
/// 底层 `Channel` 是多路复用的 HTTP/2 连接，每次调用 clone 一份客户端即可并发使用。
#[derive(Clone)]
pub struct GrpcCustodyClient {
    client: CustodyServiceClient<Channel>,
}

impl GrpcCustodyClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            client: CustodyServiceClient::new(channel),
        }
    }

    /// 创建客户端，首次调用时才建立连接
    pub fn connect_lazy(config: &CustodyConfig) -> Result<Self, tonic::transport::Error> {
        let mut endpoint = Endpoint::from_shared(config.endpoint_uri())?;

        if let Some(ms) = config.timeout_ms {
            endpoint = endpoint.timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = config.connect_timeout_ms {
            endpoint = endpoint.connect_timeout(Duration::from_millis(ms));
        }

        Ok(Self::new(endpoint.connect_lazy()))
    }
}

#[async_trait]
impl CustodyPort for GrpcCustodyClient {
    async fn get_custody(&self, filter: CustodyFilter) -> AppResult<Custodies> {
        let started = Instant::now();
        let mut client = self.client.clone();
        let result = client.get_custody(filter).await;
        finish("GetCustody", started, result)
    }

    async fn add_custody_stock(&self, update: CustodyAdd) -> AppResult<Empty> {
        let started = Instant::now();
        let mut client = self.client.clone();
        let result = client.add_custody_stock(update).await;
        finish("AddCustodyStock", started, result)
    }
}

fn finish<T>(
    method: &'static str,
    started: Instant,
    result: Result<tonic::Response<T>, tonic::Status>,
) -> AppResult<T> {
    match result {
        Ok(response) => {
            record_rpc_call(method, "ok", started.elapsed());
            Ok(response.into_inner())
        }
        Err(status) => {
            let code = effective_code(&status);
            error!(
                method,
                code = ?code,
                message = %status.message(),
                "Custody RPC failed"
            );
            record_rpc_call(method, code_name(code), started.elapsed());
            Err(AppError::remote_call(code, status.message()))
        }
    }
}

/// 客户端超时在 tonic 中表现为 `Cancelled`，这里还原为 `DeadlineExceeded`
fn effective_code(status: &tonic::Status) -> Code {
    let mut source = std::error::Error::source(status);
    while let Some(err) = source {
        if err.is::<tonic::TimeoutExpired>() {
            return Code::DeadlineExceeded;
        }
        source = err.source();
    }
    status.code()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_timeout_becomes_deadline_exceeded() {
        let status = tonic::Status::from_error(Box::new(tonic::TimeoutExpired(())));

        assert_eq!(status.code(), Code::Cancelled);
        assert_eq!(effective_code(&status), Code::DeadlineExceeded);
    }

    #[test]
    fn test_remote_cancellation_is_kept() {
        let status = tonic::Status::cancelled("client went away");

        assert_eq!(effective_code(&status), Code::Cancelled);
    }

    #[test]
    fn test_finish_maps_timeout_to_gateway_timeout() {
        let status = tonic::Status::from_error(Box::new(tonic::TimeoutExpired(())));
        let result: Result<tonic::Response<Empty>, _> = Err(status);

        let err = finish("AddCustodyStock", Instant::now(), result).unwrap_err();
        assert_eq!(err.grpc_code(), Some(Code::DeadlineExceeded));
        assert_eq!(err.status_code(), 504);
    }
}
