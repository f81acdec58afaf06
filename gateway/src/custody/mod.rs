//! custody 路由
//!
//! 两个处理器都是 请求体 → 一次远程调用 → 原样返回 JSON。

mod dto;
mod port;

pub use dto::{CustodyQuery, CustodyStockUpdate};
pub use port::CustodyPort;
#[cfg(test)]
pub use port::MockCustodyPort;

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use custody_errors::AppResult;
use tracing::debug;

use crate::grpc::custody::{Custodies, CustodyAdd, CustodyFilter, Empty};

/// custody 路由状态
#[derive(Clone)]
pub struct CustodyState {
    pub custody: Arc<dyn CustodyPort>,
}

impl CustodyState {
    pub fn new(custody: Arc<dyn CustodyPort>) -> Self {
        Self { custody }
    }
}

pub fn custody_routes() -> Router<CustodyState> {
    Router::new()
        .route("/api/custody/get", post(get_custody))
        .route("/api/custody/add", post(add_custody_stock))
}

/// 查询持仓
async fn get_custody(
    State(state): State<CustodyState>,
    Json(query): Json<CustodyQuery>,
) -> AppResult<Json<Custodies>> {
    debug!(
        period = ?query.period,
        stock = ?query.stock,
        client_id = ?query.client_id,
        "Get custody request"
    );

    let filter = CustodyFilter::try_from(query)?;
    let custodies = state.custody.get_custody(filter).await?;
    Ok(Json(custodies))
}

/// 增加持仓
async fn add_custody_stock(
    State(state): State<CustodyState>,
    Json(update): Json<CustodyStockUpdate>,
) -> AppResult<Json<Empty>> {
    debug!(
        period = ?update.period,
        stock = ?update.stock,
        client_id = ?update.client_id,
        quantity = ?update.quantity,
        "Add custody stock request"
    );

    let update = CustodyAdd::try_from(update)?;
    let empty = state.custody.add_custody_stock(update).await?;
    Ok(Json(empty))
}
