//! custody-errors - 统一错误处理
//!
//! 基于 RFC 7807 Problem Details 规范

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用错误类型
///
/// 远程调用失败是唯一的业务错误：网络故障、远端校验失败、服务不可用
/// 都走同一条路径，差别只体现在 gRPC 状态码上。`InvalidPayload` 只用于
/// 无法编码进 RPC 消息的字段值（例如把对象传给字符串字段）。
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Remote call failed: {message}")]
    RemoteCall { code: tonic::Code, message: String },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl AppError {
    pub fn remote_call(code: tonic::Code, msg: impl Into<String>) -> Self {
        Self::RemoteCall {
            code,
            message: msg.into(),
        }
    }

    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self::InvalidPayload(msg.into())
    }

    /// 转换为 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::RemoteCall { code, .. } => http_status_for(*code),
            Self::InvalidPayload(_) => 400,
        }
    }

    /// 远程调用失败时对应的 gRPC 状态码
    pub fn grpc_code(&self) -> Option<tonic::Code> {
        match self {
            Self::RemoteCall { code, .. } => Some(*code),
            Self::InvalidPayload(_) => None,
        }
    }

    /// 转换为 Problem Details
    pub fn to_problem_details(&self) -> ProblemDetails {
        ProblemDetails {
            r#type: self.problem_type(),
            title: self.problem_title(),
            status: self.status_code(),
            detail: self.to_string(),
            instance: None,
            grpc_code: self.grpc_code().map(|c| c as i32),
        }
    }

    fn problem_type(&self) -> String {
        match self {
            Self::RemoteCall { .. } => "/problems/remote-call".to_string(),
            Self::InvalidPayload(_) => "/problems/invalid-payload".to_string(),
        }
    }

    fn problem_title(&self) -> String {
        match self {
            Self::RemoteCall { .. } => "Remote Call Failed".to_string(),
            Self::InvalidPayload(_) => "Invalid Payload".to_string(),
        }
    }
}

/// gRPC 状态码名称，用作 metrics 标签
pub fn code_name(code: tonic::Code) -> &'static str {
    use tonic::Code;

    match code {
        Code::Ok => "Ok",
        Code::Cancelled => "Cancelled",
        Code::Unknown => "Unknown",
        Code::InvalidArgument => "InvalidArgument",
        Code::DeadlineExceeded => "DeadlineExceeded",
        Code::NotFound => "NotFound",
        Code::AlreadyExists => "AlreadyExists",
        Code::PermissionDenied => "PermissionDenied",
        Code::ResourceExhausted => "ResourceExhausted",
        Code::FailedPrecondition => "FailedPrecondition",
        Code::Aborted => "Aborted",
        Code::OutOfRange => "OutOfRange",
        Code::Unimplemented => "Unimplemented",
        Code::Internal => "Internal",
        Code::Unavailable => "Unavailable",
        Code::DataLoss => "DataLoss",
        Code::Unauthenticated => "Unauthenticated",
    }
}

/// gRPC 状态码到 HTTP 状态码的映射
pub fn http_status_for(code: tonic::Code) -> u16 {
    use tonic::Code;

    match code {
        Code::InvalidArgument | Code::OutOfRange | Code::FailedPrecondition => 400,
        Code::Unauthenticated => 401,
        Code::PermissionDenied => 403,
        Code::NotFound => 404,
        Code::AlreadyExists | Code::Aborted => 409,
        Code::ResourceExhausted => 429,
        Code::Cancelled => 499,
        Code::Unimplemented => 501,
        Code::Unavailable => 503,
        Code::DeadlineExceeded => 504,
        Code::Ok | Code::Unknown | Code::Internal | Code::DataLoss => 502,
    }
}

impl From<tonic::Status> for AppError {
    fn from(status: tonic::Status) -> Self {
        Self::RemoteCall {
            code: status.code(),
            message: status.message().to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let problem = self.to_problem_details();
        let status =
            StatusCode::from_u16(problem.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = (status, Json(problem)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}

/// RFC 7807 Problem Details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    pub r#type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grpc_code: Option<i32>,
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn test_status_mapping_table() {
        let cases = [
            (Code::InvalidArgument, 400),
            (Code::FailedPrecondition, 400),
            (Code::Unauthenticated, 401),
            (Code::PermissionDenied, 403),
            (Code::NotFound, 404),
            (Code::AlreadyExists, 409),
            (Code::ResourceExhausted, 429),
            (Code::Cancelled, 499),
            (Code::Unimplemented, 501),
            (Code::Unavailable, 503),
            (Code::DeadlineExceeded, 504),
            (Code::Internal, 502),
            (Code::Unknown, 502),
        ];

        for (code, expected) in cases {
            assert_eq!(http_status_for(code), expected, "code {:?}", code);
        }
    }

    #[test]
    fn test_from_status_keeps_code_and_message() {
        let err = AppError::from(tonic::Status::unavailable("connection refused"));

        assert_eq!(err.grpc_code(), Some(Code::Unavailable));
        assert_eq!(err.status_code(), 503);
        assert_eq!(err.to_string(), "Remote call failed: connection refused");
    }

    #[test]
    fn test_problem_details_shape() {
        let problem = AppError::remote_call(Code::InvalidArgument, "bad period").to_problem_details();
        let json = serde_json::to_value(&problem).unwrap();

        assert_eq!(json["type"], "/problems/remote-call");
        assert_eq!(json["status"], 400);
        assert_eq!(json["grpc_code"], 3);
        assert!(json.get("instance").is_none());
    }

    #[test]
    fn test_invalid_payload_is_bad_request_without_grpc_code() {
        let problem = AppError::invalid_payload("field 'stock' cannot be encoded").to_problem_details();

        assert_eq!(problem.status, 400);
        assert_eq!(problem.r#type, "/problems/invalid-payload");
        assert!(problem.grpc_code.is_none());
    }

    #[test]
    fn test_code_name_matches_debug_name() {
        for code in [Code::Unavailable, Code::DeadlineExceeded, Code::InvalidArgument, Code::Ok] {
            assert_eq!(code_name(code), format!("{:?}", code));
        }
    }

    #[test]
    fn test_into_response_sets_problem_content_type() {
        let response = AppError::remote_call(Code::NotFound, "missing").into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/problem+json"
        );
    }
}
