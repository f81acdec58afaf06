//! 请求体
//!
//! 字段按原始 JSON 值接收，不在网关做类型校验：数字可以填到字符串字段，
//! 数字字符串可以填到 `quantity`，由远端服务决定是否合法。

use custody_errors::{AppError, AppResult};
use serde::Deserialize;
use serde_json::Value;

use crate::grpc::custody::{CustodyAdd, CustodyFilter};

/// 查询请求
///
/// 缺失或为 null 的字段按 proto3 默认值（空字符串）转发。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustodyQuery {
    pub period: Option<Value>,
    pub stock: Option<Value>,
    pub client_id: Option<Value>,
}

/// 持仓变更请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustodyStockUpdate {
    pub period: Option<Value>,
    pub stock: Option<Value>,
    pub client_id: Option<Value>,
    /// 不补默认值，缺失时 RPC 字段也缺失
    pub quantity: Option<Value>,
}

impl TryFrom<CustodyQuery> for CustodyFilter {
    type Error = AppError;

    fn try_from(query: CustodyQuery) -> AppResult<Self> {
        Ok(Self {
            period: text_field("period", query.period)?,
            stock: text_field("stock", query.stock)?,
            client_id: text_field("client_id", query.client_id)?,
        })
    }
}

impl TryFrom<CustodyStockUpdate> for CustodyAdd {
    type Error = AppError;

    fn try_from(update: CustodyStockUpdate) -> AppResult<Self> {
        Ok(Self {
            period: text_field("period", update.period)?,
            stock: text_field("stock", update.stock)?,
            client_id: text_field("client_id", update.client_id)?,
            quantity: quantity_field(update.quantity)?,
        })
    }
}

fn text_field(name: &str, value: Option<Value>) -> AppResult<String> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(AppError::invalid_payload(format!(
            "field '{}' cannot be encoded as a string: {}",
            name, other
        ))),
    }
}

/// 小数向零截断，超出 i64 范围时饱和
fn quantity_field(value: Option<Value>) -> AppResult<Option<i64>> {
    let quantity = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f as i64)
            })
        }
        Some(_) => None,
    };

    quantity.map(Some).ok_or_else(|| {
        AppError::invalid_payload("field 'quantity' cannot be encoded as an integer")
    })
}
