//! custody 服务端口

use async_trait::async_trait;
use custody_errors::AppResult;

use crate::grpc::custody::{Custodies, CustodyAdd, CustodyFilter, Empty};

/// 远程 custody 服务
///
/// 每个方法对应一次远程调用，不做重试也不做本地校验。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustodyPort: Send + Sync {
    /// 按 period / stock / client_id 查询
    async fn get_custody(&self, filter: CustodyFilter) -> AppResult<Custodies>;

    /// 增加某个客户的持仓数量
    async fn add_custody_stock(&self, update: CustodyAdd) -> AppResult<Empty>;
}
