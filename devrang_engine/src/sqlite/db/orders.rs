use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{types::Json, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
    order_objects::OrderQueryFilter,
    traits::{CapturedPayment, OrderManagementError, TransitionResult},
};

/// Inserts a new order in the `created` state. Fails with `OrderAlreadyExists` if the gateway id is already known.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderManagementError> {
    if fetch_order_by_order_id(&order.order_id, conn).await?.is_some() {
        return Err(OrderManagementError::OrderAlreadyExists(order.order_id));
    }
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                payment_link_id,
                payment_url,
                placed_by,
                customer_id,
                product,
                contact,
                amount,
                currency
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(order.order_id)
    .bind(order.payment_link_id)
    .bind(order.payment_url)
    .bind(order.placed_by)
    .bind(order.customer_id)
    .bind(Json(order.product))
    .bind(Json(order.contact))
    .bind(order.amount)
    .bind(order.currency)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order [{}] inserted with id {}", order.order_id, order.id);
    Ok(order)
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// Finds the order for a captured payment, by gateway order id or by payment link id. If the two ids match different
/// orders, the one matching the order id is returned.
pub async fn fetch_order_for_payment(
    order_id: Option<&OrderId>,
    payment_link_id: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
        SELECT * FROM orders WHERE order_id = $1 OR payment_link_id = $2
        ORDER BY CASE WHEN order_id = $1 THEN 0 ELSE 1 END
        LIMIT 1
        "#,
    )
    .bind(order_id.map(|id| id.as_str()))
    .bind(payment_link_id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`
///
/// Resulting orders are ordered by `created_at` in ascending order
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(order_id) = query.order_id {
        where_clause.push("order_id = ");
        where_clause.push_bind_unseparated(order_id.0);
    }
    if let Some(email) = query.placed_by {
        where_clause.push("placed_by = ");
        where_clause.push_bind_unseparated(email);
    }
    if let Some(cid) = query.customer_id {
        where_clause.push("customer_id = ");
        where_clause.push_bind_unseparated(cid);
    }
    if let Some(statuses) = query.status.filter(|s| !s.is_empty()) {
        where_clause.push("status IN (");
        for (i, status) in statuses.into_iter().enumerate() {
            if i > 0 {
                where_clause.push_unseparated(", ");
            }
            where_clause.push_bind_unseparated(status);
        }
        where_clause.push_unseparated(")");
    }
    if let Some(since) = query.since {
        where_clause.push("datetime(created_at) >= datetime(");
        where_clause.push_bind_unseparated(since);
        where_clause.push_unseparated(")");
    }
    if let Some(until) = query.until {
        where_clause.push("datetime(created_at) <= datetime(");
        where_clause.push_bind_unseparated(until);
        where_clause.push_unseparated(")");
    }
    builder.push(" ORDER BY created_at ASC, id ASC");

    trace!("📝️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Order>();
    let orders = query.fetch_all(conn).await?;
    trace!("📝️ Result of search_orders: {:?}", orders.len());
    Ok(orders)
}

/// Records a captured payment against the matching order. Run this inside a transaction: the lookup and the
/// conditional update must see the same row.
pub async fn mark_payment_captured(
    payment: CapturedPayment,
    conn: &mut SqliteConnection,
) -> Result<TransitionResult, OrderManagementError> {
    let CapturedPayment { order_id, payment_link_id, payment_id, method, captured_at } = payment;
    let Some(order) = fetch_order_for_payment(order_id.as_ref(), payment_link_id.as_deref(), conn).await? else {
        return Ok(TransitionResult::NotFound);
    };
    let requested = OrderStatusType::Paid;
    if !order.status.can_transition_to(requested) {
        return Ok(TransitionResult::Ignored { order, requested });
    }
    if order.status == requested && order.payment_id.as_deref() == Some(payment_id.as_str()) {
        trace!("📝️ Payment {payment_id} is already recorded against order {}", order.order_id);
        return Ok(TransitionResult::Unchanged(order));
    }
    let updated: Option<Order> = sqlx::query_as(
        r#"
        UPDATE orders SET
            status = 'paid',
            payment_id = $1,
            payment_method = $2,
            paid_at = $3,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = $4 AND status IN ('created', 'paid')
        RETURNING *
        "#,
    )
    .bind(payment_id)
    .bind(method)
    .bind(captured_at)
    .bind(order.id)
    .fetch_optional(conn)
    .await?;
    Ok(applied_or_ignored(order, updated, requested))
}

/// Marks the order for a payment link as paid. An existing `paid_at` is kept.
pub async fn mark_link_paid(
    order_id: &OrderId,
    paid_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<TransitionResult, OrderManagementError> {
    let Some(order) = fetch_order_by_order_id(order_id, conn).await? else {
        return Ok(TransitionResult::NotFound);
    };
    let requested = OrderStatusType::Paid;
    if !order.status.can_transition_to(requested) {
        return Ok(TransitionResult::Ignored { order, requested });
    }
    if order.status == requested {
        return Ok(TransitionResult::Unchanged(order));
    }
    let updated: Option<Order> = sqlx::query_as(
        r#"
        UPDATE orders SET
            status = 'paid',
            paid_at = COALESCE(paid_at, $1),
            updated_at = CURRENT_TIMESTAMP
        WHERE id = $2 AND status = 'created'
        RETURNING *
        "#,
    )
    .bind(paid_at)
    .bind(order.id)
    .fetch_optional(conn)
    .await?;
    Ok(applied_or_ignored(order, updated, requested))
}

/// Marks the order for a payment link as expired, if it has not been paid.
pub async fn mark_link_expired(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<TransitionResult, OrderManagementError> {
    let Some(order) = fetch_order_by_order_id(order_id, conn).await? else {
        return Ok(TransitionResult::NotFound);
    };
    let requested = OrderStatusType::Expired;
    if !order.status.can_transition_to(requested) {
        return Ok(TransitionResult::Ignored { order, requested });
    }
    if order.status == requested {
        return Ok(TransitionResult::Unchanged(order));
    }
    let updated: Option<Order> = sqlx::query_as(
        r#"
        UPDATE orders SET status = 'expired', updated_at = CURRENT_TIMESTAMP
        WHERE id = $1 AND status = 'created'
        RETURNING *
        "#,
    )
    .bind(order.id)
    .fetch_optional(conn)
    .await?;
    Ok(applied_or_ignored(order, updated, requested))
}

fn applied_or_ignored(before: Order, after: Option<Order>, requested: OrderStatusType) -> TransitionResult {
    match after {
        Some(order) => {
            debug!("📝️ Order {} moved from {} to {}", order.order_id, before.status, order.status);
            TransitionResult::Applied { previous: before.status, order }
        },
        // The guard in the UPDATE statement lost a race with another writer
        None => TransitionResult::Ignored { order: before, requested },
    }
}
