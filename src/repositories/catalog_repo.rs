//! 商品目录数据访问接口
//!
//! 远程数据表（categories / products）由外部后端提供，这里只定义分类删除所需的操作。

use crate::errors::AppError;
use crate::models::Category;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_category(&self, category_id: Uuid) -> Result<Option<Category>, AppError>;

    /// 引用该分类的商品数量
    async fn count_products_in_category(&self, category_id: Uuid) -> Result<u64, AppError>;

    async fn deactivate_category(&self, category_id: Uuid) -> Result<(), AppError>;

    /// 解除商品与分类的关联，返回受影响的商品数
    async fn detach_products(&self, category_id: Uuid) -> Result<u64, AppError>;

    async fn delete_category(&self, category_id: Uuid) -> Result<(), AppError>;
}
