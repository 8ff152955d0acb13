//! Order repository for database operations.
//!
//! Order placement is the one multi-statement write in the system: the cart
//! read, total computation, order and line inserts, and cart deletion all
//! happen inside a single transaction. If any step fails the transaction
//! rolls back and the cart is left untouched.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use sage_bistro_core::{MenuItemId, OrderId, OrderLineId, UserId, money};

use super::RepositoryError;
use crate::models::{Order, OrderLine};

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    delivery_crew_id: Option<i32>,
    status: bool,
    order_date: NaiveDate,
    total: Decimal,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            delivery_crew_id: row.delivery_crew_id.map(UserId::new),
            status: row.status,
            order_date: row.order_date,
            total: row.total,
        }
    }
}

/// Internal row type for order line queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    id: i32,
    order_id: i32,
    menu_item_id: i32,
    quantity: i32,
    price: Decimal,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            id: OrderLineId::new(row.id),
            order_id: OrderId::new(row.order_id),
            menu_item_id: MenuItemId::new(row.menu_item_id),
            quantity: row.quantity,
            price: row.price,
        }
    }
}

const SELECT_ORDER: &str = r"
    SELECT id, user_id, delivery_crew_id, status, order_date, total
    FROM bistro.customer_order
";

const SELECT_ORDER_LINE: &str = r"
    SELECT id, order_id, menu_item_id, quantity, price
    FROM bistro.order_line
";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Convert the user's cart into an order.
    ///
    /// In one transaction: read the cart lines, compute the total as the sum
    /// of their prices, insert the order (not delivered, dated today) and one
    /// order line per cart line, then delete the cart lines.
    ///
    /// # Returns
    ///
    /// `None` when the cart is empty; no order is created and nothing is
    /// written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back and the cart is left intact.
    pub async fn place(
        &self,
        user: UserId,
    ) -> Result<Option<(Order, Vec<OrderLine>)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct PendingLine {
            menu_item_id: i32,
            quantity: i32,
            price: Decimal,
        }

        let mut tx = self.pool.begin().await?;

        let cart_lines = sqlx::query_as::<_, PendingLine>(
            r"
            SELECT menu_item_id, quantity, price
            FROM bistro.cart_line
            WHERE user_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(user.as_i32())
        .fetch_all(&mut *tx)
        .await?;

        if cart_lines.is_empty() {
            return Ok(None);
        }

        let total = money::order_total(cart_lines.iter().map(|l| l.price));
        let today = Utc::now().date_naive();

        let order_row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO bistro.customer_order (user_id, status, order_date, total)
            VALUES ($1, FALSE, $2, $3)
            RETURNING id, user_id, delivery_crew_id, status, order_date, total
            ",
        )
        .bind(user.as_i32())
        .bind(today)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(cart_lines.len());
        for cart_line in &cart_lines {
            let line_row = sqlx::query_as::<_, OrderLineRow>(
                r"
                INSERT INTO bistro.order_line (order_id, menu_item_id, quantity, price)
                VALUES ($1, $2, $3, $4)
                RETURNING id, order_id, menu_item_id, quantity, price
                ",
            )
            .bind(order_row.id)
            .bind(cart_line.menu_item_id)
            .bind(cart_line.quantity)
            .bind(cart_line.price)
            .fetch_one(&mut *tx)
            .await?;
            lines.push(line_row.into());
        }

        sqlx::query("DELETE FROM bistro.cart_line WHERE user_id = $1")
            .bind(user.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some((order_row.into(), lines)))
    }

    /// All orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_ORDER} ORDER BY id DESC"))
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Orders assigned to the given delivery crew member, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_assigned_to(&self, crew: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{SELECT_ORDER} WHERE delivery_crew_id = $1 ORDER BY id DESC"
        ))
        .bind(crew.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Orders placed by the given user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_owned_by(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{SELECT_ORDER} WHERE user_id = $1 ORDER BY id DESC"
        ))
        .bind(user.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an order by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_ORDER} WHERE id = $1"))
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// The lines of one order, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines_for_order(&self, order: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderLineRow>(&format!(
            "{SELECT_ORDER_LINE} WHERE order_id = $1 ORDER BY id ASC"
        ))
        .bind(order.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// The lines of several orders at once, grouped client-side.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines_for_orders(
        &self,
        orders: &[OrderId],
    ) -> Result<Vec<OrderLine>, RepositoryError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = orders.iter().map(|o| o.as_i32()).collect();
        let rows = sqlx::query_as::<_, OrderLineRow>(&format!(
            "{SELECT_ORDER_LINE} WHERE order_id = ANY($1) ORDER BY order_id ASC, id ASC"
        ))
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Replace the order's delivery assignment and delivered flag.
    ///
    /// The caller is responsible for checking that `delivery_crew` names a
    /// member of the delivery crew group; this is an endpoint rule, not a
    /// storage constraint.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Conflict` if `delivery_crew` names no user.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_assignment(
        &self,
        id: OrderId,
        delivery_crew: Option<UserId>,
        status: bool,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            UPDATE bistro.customer_order
            SET delivery_crew_id = $2, status = $3
            WHERE id = $1
            RETURNING id, user_id, delivery_crew_id, status, order_date, total
            ",
        )
        .bind(id.as_i32())
        .bind(delivery_crew.map(|u| u.as_i32()))
        .bind(status)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::Conflict("delivery crew user does not exist".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Set only the order's delivered flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(&self, id: OrderId, status: bool) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            UPDATE bistro.customer_order
            SET status = $2
            WHERE id = $1
            RETURNING id, user_id, delivery_crew_id, status, order_date, total
            ",
        )
        .bind(id.as_i32())
        .bind(status)
        .fetch_optional(self.pool)
        .await?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Hard-delete an order; its lines cascade.
    ///
    /// # Returns
    ///
    /// Returns `true` if the order was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM bistro.customer_order WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
