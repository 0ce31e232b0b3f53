use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entities::product;
use crate::errors::ServiceError;

/// Applies a signed delta to a product's `current_stock` as a single
/// relative UPDATE, so concurrent mutations never lose increments.
///
/// Stock can go arbitrarily negative here; callers that must not oversell
/// (issuance) check availability inside the same transaction before calling.
pub async fn adjust_stock<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    delta: i32,
) -> Result<(), ServiceError> {
    product::Entity::update_many()
        .col_expr(
            product::Column::CurrentStock,
            Expr::col(product::Column::CurrentStock).add(delta),
        )
        .filter(product::Column::Id.eq(product_id))
        .exec(conn)
        .await?;

    Ok(())
}
