//! Order checkout, listings, and lifecycle updates.

use chrono::NaiveDateTime;
use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use crate::sqlite::SqliteStore;
use crate::status::OrderStatus;
use crate::types::*;
use fooddel_core::{Error, Result};

/// Orders joined with the names listings show.
const SUMMARY_SELECT: &str = "SELECT o.*, \
     r.name AS restaurant_name, r.location AS restaurant_location, \
     c.name AS customer_name, c.phone_no AS customer_phone, \
     da.name AS delivery_agent_name, da.phone_no AS delivery_agent_phone \
     FROM Orders o \
     LEFT JOIN Restaurant r ON o.restaurant_id = r.restaurant_id \
     LEFT JOIN Customer c ON o.customer_id = c.customer_id \
     LEFT JOIN DeliveryAgent da ON o.delivery_agent_id = da.agent_id";

const NEWEST_FIRST: &str = "ORDER BY o.date DESC, o.time DESC, o.order_id DESC";

impl SqliteStore {
    // ---------------------------------------------------------------
    // Checkout
    // ---------------------------------------------------------------

    /// Insert a new `pending` order stamped with `placed_at`.
    pub fn create_order(&self, new: &NewOrder) -> Result<Order> {
        let date = new.placed_at.format("%Y-%m-%d").to_string();
        let time = new.placed_at.format("%H:%M:%S").to_string();

        let conn = self.conn.lock();
        let order_id = conn
            .prepare_cached(
                "INSERT INTO Orders (customer_id, restaurant_id, date, time, total_amount, \
                 delivery_address, payment_method, status) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .insert(params![
                new.customer_id,
                new.restaurant_id,
                date,
                time,
                new.total_amount,
                new.delivery_address,
                new.payment_method,
                OrderStatus::Pending,
            ])
            .map_err(|e| Error::Database(e.to_string()))?;

        let order = conn
            .query_row(
                "SELECT * FROM Orders WHERE order_id = ?1",
                params![order_id],
                Self::row_to_order,
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        info!(
            "Order {} created: customer={}, restaurant={}, total={:.2}",
            order_id, new.customer_id, new.restaurant_id, new.total_amount
        );
        Ok(order)
    }

    /// Insert the cart lines of an order. All lines land or none do.
    pub fn add_order_items(&self, order_id: i64, items: &[NewOrderItem]) -> Result<usize> {
        if items.is_empty() {
            debug!("No items to add to order {}", order_id);
            return Ok(0);
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(|e| Error::Database(e.to_string()))?;
        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO order_items (order_id, menu_id, item_name, price, quantity) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(|e| Error::Database(e.to_string()))?;
            for item in items {
                stmt.execute(params![
                    order_id,
                    item.menu_id,
                    item.name(),
                    item.price,
                    item.quantity(),
                ])
                .map_err(|e| Error::Database(e.to_string()))?;
            }
        }
        tx.commit().map_err(|e| Error::Database(e.to_string()))?;

        debug!("Inserted {} items for order {}", items.len(), order_id);
        Ok(items.len())
    }

    // ---------------------------------------------------------------
    // Lookups
    // ---------------------------------------------------------------

    pub fn get_order(&self, order_id: i64) -> Result<Option<Order>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM Orders WHERE order_id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![order_id], Self::row_to_order)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    pub fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT * FROM order_items WHERE order_id = ?1 ORDER BY id")
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![order_id], |row| {
                Ok(OrderItem {
                    id: row.get("id")?,
                    order_id: row.get("order_id")?,
                    menu_id: row.get("menu_id")?,
                    item_name: row.get("item_name")?,
                    price: row.get("price")?,
                    quantity: row.get("quantity")?,
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?;
        let items = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(items)
    }

    /// An order with customer, restaurant and agent names plus its items.
    pub fn get_order_details(&self, order_id: i64) -> Result<Option<OrderDetails>> {
        let summary = {
            let conn = self.conn.lock();
            let sql = format!("{} WHERE o.order_id = ?1", SUMMARY_SELECT);
            let row = conn
                .prepare_cached(&sql)
                .map_err(|e| Error::Database(e.to_string()))?
                .query_row(params![order_id], Self::row_to_summary)
                .optional()
                .map_err(|e| Error::Database(e.to_string()))?;
            row
        };

        match summary {
            Some(summary) => {
                let items = self.order_items(order_id)?;
                Ok(Some(OrderDetails { summary, items }))
            }
            None => Ok(None),
        }
    }

    pub fn orders_for_customer(&self, customer_id: i64) -> Result<Vec<OrderSummary>> {
        self.query_summaries("WHERE o.customer_id = ?1", Some(customer_id))
    }

    pub fn orders_for_restaurant(&self, restaurant_id: i64) -> Result<Vec<OrderSummary>> {
        self.query_summaries("WHERE o.restaurant_id = ?1", Some(restaurant_id))
    }

    pub fn orders_for_agent(&self, agent_id: i64) -> Result<Vec<OrderSummary>> {
        self.query_summaries("WHERE o.delivery_agent_id = ?1", Some(agent_id))
    }

    /// Orders ready for pickup that no agent has accepted yet.
    pub fn available_for_delivery(&self) -> Result<Vec<OrderSummary>> {
        let orders = self.query_summaries(
            "WHERE o.status = 'ready' AND o.delivery_agent_id IS NULL",
            None,
        )?;
        debug!("Found {} orders available for delivery", orders.len());
        Ok(orders)
    }

    fn query_summaries(&self, filter: &str, id: Option<i64>) -> Result<Vec<OrderSummary>> {
        let sql = format!("{} {} {}", SUMMARY_SELECT, filter, NEWEST_FIRST);
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(&sql)
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = match id {
            Some(id) => stmt.query_map(params![id], Self::row_to_summary),
            None => stmt.query_map([], Self::row_to_summary),
        }
        .map_err(|e| Error::Database(e.to_string()))?;
        let orders = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(orders)
    }

    // ---------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------

    /// Move an order to `next`, checked against the lifecycle.
    ///
    /// `picked_up` is only reached through [`Self::assign_delivery_agent`]
    /// and `delivered` only through [`Self::complete_delivery`].
    /// Returns the status the order had before the update.
    pub fn update_status(&self, order_id: i64, next: OrderStatus) -> Result<OrderStatus> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(|e| Error::Database(e.to_string()))?;

        let (current, _) = current_state(&tx, order_id)?;
        current.check_transition(next)?;
        if current != next {
            match next {
                OrderStatus::PickedUp => {
                    return Err(Error::Conflict(format!(
                        "Order {} is picked up when a delivery agent accepts it",
                        order_id
                    )))
                }
                OrderStatus::Delivered => {
                    return Err(Error::Conflict(format!(
                        "Order {} is delivered by its delivery agent",
                        order_id
                    )))
                }
                _ => {}
            }
        }

        tx.execute(
            "UPDATE Orders SET status = ?1 WHERE order_id = ?2",
            params![next, order_id],
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        tx.commit().map_err(|e| Error::Database(e.to_string()))?;

        info!("Order {} status {} -> {}", order_id, current, next);
        Ok(current)
    }

    /// Record `agent_id` as the courier and mark the order `picked_up`.
    ///
    /// Only succeeds while no agent is assigned and the order is not
    /// finished; a second accept on the same order is a conflict.
    pub fn assign_delivery_agent(&self, order_id: i64, agent_id: i64) -> Result<()> {
        let conn = self.conn.lock();
        let count = conn
            .execute(
                "UPDATE Orders SET delivery_agent_id = ?1, status = ?2 \
                 WHERE order_id = ?3 AND delivery_agent_id IS NULL \
                 AND status NOT IN ('delivered', 'cancelled')",
                params![agent_id, OrderStatus::PickedUp, order_id],
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        if count == 0 {
            let existing: Option<(Option<i64>, OrderStatus)> = conn
                .query_row(
                    "SELECT delivery_agent_id, status FROM Orders WHERE order_id = ?1",
                    params![order_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
                .map_err(|e| Error::Database(e.to_string()))?;
            return Err(match existing {
                None => Error::NotFound(format!("Order {} not found", order_id)),
                Some((Some(current_agent), _)) => Error::Conflict(format!(
                    "Order {} already assigned to agent {}",
                    order_id, current_agent
                )),
                Some((None, status)) => Error::InvalidTransition {
                    from: status.to_string(),
                    to: OrderStatus::PickedUp.to_string(),
                },
            });
        }

        info!("Order {} assigned to agent {}", order_id, agent_id);
        Ok(())
    }

    /// Mark an assigned order `delivered` and stamp the completion time.
    pub fn complete_delivery(&self, order_id: i64, delivered_at: NaiveDateTime) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(|e| Error::Database(e.to_string()))?;

        let (current, agent_id) = current_state(&tx, order_id)?;
        if current == OrderStatus::Delivered {
            return Ok(());
        }
        current.check_transition(OrderStatus::Delivered)?;
        if agent_id.is_none() {
            return Err(Error::Conflict(format!(
                "Order {} has no delivery agent",
                order_id
            )));
        }

        tx.execute(
            "UPDATE Orders SET status = ?1, delivery_time = ?2 WHERE order_id = ?3",
            params![
                OrderStatus::Delivered,
                delivered_at.format("%H:%M:%S").to_string(),
                order_id
            ],
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        tx.commit().map_err(|e| Error::Database(e.to_string()))?;

        info!("Order {} delivered", order_id);
        Ok(())
    }

    // ---------------------------------------------------------------
    // Row mappers
    // ---------------------------------------------------------------

    fn row_to_order(row: &rusqlite::Row<'_>) -> rusqlite::Result<Order> {
        Ok(Order {
            order_id: row.get("order_id")?,
            customer_id: row.get("customer_id")?,
            restaurant_id: row.get("restaurant_id")?,
            delivery_agent_id: row.get("delivery_agent_id")?,
            date: row.get("date")?,
            time: row.get("time")?,
            total_amount: row.get("total_amount")?,
            delivery_address: row.get("delivery_address")?,
            payment_method: row.get("payment_method")?,
            status: row.get("status")?,
            delivery_time: row.get("delivery_time")?,
        })
    }

    fn row_to_summary(row: &rusqlite::Row<'_>) -> rusqlite::Result<OrderSummary> {
        Ok(OrderSummary {
            order: Self::row_to_order(row)?,
            restaurant_name: row.get("restaurant_name")?,
            restaurant_location: row.get("restaurant_location")?,
            customer_name: row.get("customer_name")?,
            customer_phone: row.get("customer_phone")?,
            delivery_agent_name: row.get("delivery_agent_name")?,
            delivery_agent_phone: row.get("delivery_agent_phone")?,
        })
    }
}

/// Status and assigned agent of an order.
fn current_state(
    conn: &rusqlite::Connection,
    order_id: i64,
) -> Result<(OrderStatus, Option<i64>)> {
    conn.query_row(
        "SELECT status, delivery_agent_id FROM Orders WHERE order_id = ?1",
        params![order_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
    .map_err(|e| Error::Database(e.to_string()))?
    .ok_or_else(|| Error::NotFound(format!("Order {} not found", order_id)))
}
