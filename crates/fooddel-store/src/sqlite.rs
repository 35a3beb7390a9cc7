//! SQLite-backed store for the FoodDel API.
//!
//! One connection guarded by a mutex; every statement is serialized through
//! it. Order lifecycle methods live in `orders.rs`, revenue in `revenue.rs`.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::schema::{ACCOUNTS_SQL, CATALOG_SQL, ORDERS_SQL};
use crate::types::*;
use fooddel_core::{Error, Result};

/// SQLite store holding users, catalog, orders, and payments.
pub struct SqliteStore {
    pub(crate) conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open or create the SQLite store.
    ///
    /// `db_dir` is the directory (e.g., `data/db/`). The file will be `db_dir/fooddel.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir).map_err(|e| Error::Storage(e.to_string()))?;
        let db_path = db_dir.join("fooddel.db");

        let conn = Self::create_connection(&db_path)?;
        Self::init_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };

        info!(
            "SqliteStore initialized: {} restaurants, {} orders, path={}",
            store.count("Restaurant")?,
            store.count("Orders")?,
            store.db_path.display()
        );

        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(conn)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        let full_schema = format!("{}\n{}\n{}", ACCOUNTS_SQL, CATALOG_SQL, ORDERS_SQL);
        conn.execute_batch(&full_schema)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;
        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Row count of one of the schema's tables.
    pub(crate) fn count(&self, table: &'static str) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))
    }

    // ---------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------

    /// Insert a user and the profile its role owns, in one transaction.
    ///
    /// Restaurant owners get a fresh restaurant; delivery agents get an agent
    /// profile. Customer profiles are created lazily at first checkout.
    pub fn register_user(&self, new_user: &NewUser) -> Result<RegisteredUser> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(|e| Error::Database(e.to_string()))?;

        let user_id = tx
            .prepare_cached(
                "INSERT INTO users (name, email, password_hash, phone_no, address, role) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .insert(params![
                new_user.name,
                new_user.email,
                new_user.password_hash,
                new_user.phone_no,
                new_user.address,
                new_user.role,
            ])
            .map_err(|e| {
                if e.to_string().contains("UNIQUE constraint") {
                    Error::Conflict(format!("User already exists with email {}", new_user.email))
                } else {
                    Error::Database(e.to_string())
                }
            })?;

        let mut restaurant = None;
        let mut delivery_agent = None;
        match new_user.role {
            Role::Restaurant => {
                let new = NewRestaurant::for_owner(user_id, &new_user.name, &new_user.address);
                let id = insert_restaurant(&tx, &new)?;
                restaurant = Some(
                    tx.query_row(
                        "SELECT * FROM Restaurant WHERE restaurant_id = ?1",
                        params![id],
                        Self::row_to_restaurant,
                    )
                    .map_err(|e| Error::Database(e.to_string()))?,
                );
                info!("Created restaurant {} for owner {}", id, user_id);
            }
            Role::DeliveryAgent => {
                let id = tx
                    .execute(
                        "INSERT INTO DeliveryAgent (name, phone_no, user_id) VALUES (?1, ?2, ?3)",
                        params![new_user.name, new_user.phone_no, user_id],
                    )
                    .map(|_| tx.last_insert_rowid())
                    .map_err(|e| Error::Database(e.to_string()))?;
                delivery_agent = Some(
                    tx.query_row(
                        "SELECT * FROM DeliveryAgent WHERE agent_id = ?1",
                        params![id],
                        Self::row_to_agent,
                    )
                    .map_err(|e| Error::Database(e.to_string()))?,
                );
                info!("Created delivery agent profile {} for user {}", id, user_id);
            }
            Role::Customer => {}
        }

        let user = tx
            .query_row(
                "SELECT * FROM users WHERE id = ?1",
                params![user_id],
                Self::row_to_user,
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        tx.commit().map_err(|e| Error::Database(e.to_string()))?;

        Ok(RegisteredUser {
            user,
            restaurant,
            delivery_agent,
        })
    }

    pub fn find_credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM users WHERE email = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![email], |row| {
                Ok(UserCredentials {
                    user: Self::row_to_user(row)?,
                    password_hash: row.get("password_hash")?,
                })
            })
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    pub fn email_exists(&self, email: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let exists = conn
            .prepare_cached("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![email], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(exists)
    }

    pub fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM users WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![user_id], Self::row_to_user)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    // ---------------------------------------------------------------
    // Sessions
    // ---------------------------------------------------------------

    /// Issue a session for `user` valid until `now + ttl`.
    ///
    /// Expired sessions are purged on the way.
    pub fn create_session(
        &self,
        user: &User,
        now: chrono::DateTime<chrono::Utc>,
        ttl: chrono::Duration,
    ) -> Result<Session> {
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            Error::Config(format!("Token lifetime of {}h is out of range", ttl.num_hours()))
        })?;
        let session = Session {
            token: crate::credentials::new_token(),
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            expires_at: expires_at.timestamp(),
        };

        let conn = self.conn.lock();
        let purged = conn
            .execute(
                "DELETE FROM sessions WHERE expires_at <= ?1",
                params![now.timestamp()],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        if purged > 0 {
            debug!("Purged {} expired sessions", purged);
        }

        conn.prepare_cached(
            "INSERT INTO sessions (token, user_id, email, role, expires_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![
            session.token,
            session.user_id,
            session.email,
            session.role,
            session.expires_at,
        ])
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(session)
    }

    /// Look up a live session. Expired or unknown tokens yield `None`.
    pub fn find_session(
        &self,
        token: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Option<Session>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM sessions WHERE token = ?1 AND expires_at > ?2")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![token, now.timestamp()], |row| {
                Ok(Session {
                    token: row.get("token")?,
                    user_id: row.get("user_id")?,
                    email: row.get("email")?,
                    role: row.get("role")?,
                    expires_at: row.get("expires_at")?,
                })
            })
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    // ---------------------------------------------------------------
    // Customers
    // ---------------------------------------------------------------

    pub fn create_customer(
        &self,
        name: Option<&str>,
        phone_no: Option<&str>,
        address: Option<&str>,
        user_id: Option<i64>,
    ) -> Result<Customer> {
        let conn = self.conn.lock();
        let id = conn
            .prepare_cached(
                "INSERT INTO Customer (name, phone_no, address, user_id) VALUES (?1, ?2, ?3, ?4)",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .insert(params![name, phone_no, address, user_id])
            .map_err(|e| Error::Database(e.to_string()))?;
        conn.query_row(
            "SELECT * FROM Customer WHERE customer_id = ?1",
            params![id],
            Self::row_to_customer,
        )
        .map_err(|e| Error::Database(e.to_string()))
    }

    pub fn get_customer_by_user(&self, user_id: i64) -> Result<Option<Customer>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM Customer WHERE user_id = ?1 ORDER BY customer_id LIMIT 1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![user_id], Self::row_to_customer)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    /// The user's customer profile, created from the user record when missing.
    pub fn get_or_create_customer(&self, user: &User) -> Result<Customer> {
        if let Some(customer) = self.get_customer_by_user(user.id)? {
            return Ok(customer);
        }
        info!("Creating customer profile for user {}", user.id);
        let phone: &str = if user.phone_no.is_empty() { "0000000000" } else { &user.phone_no };
        let address: &str = if user.address.is_empty() { "Address not provided" } else { &user.address };
        self.create_customer(Some(&user.name), Some(phone), Some(address), Some(user.id))
    }

    /// Overwrite the given profile fields; absent fields are kept.
    pub fn update_customer(&self, customer_id: i64, update: &CustomerUpdate) -> Result<()> {
        let conn = self.conn.lock();
        let count = conn
            .execute(
                "UPDATE Customer SET \
                 name = COALESCE(?1, name), \
                 phone_no = COALESCE(?2, phone_no), \
                 address = COALESCE(?3, address), \
                 preferences = COALESCE(?4, preferences) \
                 WHERE customer_id = ?5",
                params![
                    update.name,
                    update.phone_no,
                    update.address,
                    update.preferences,
                    customer_id
                ],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        if count == 0 {
            return Err(Error::NotFound(format!("Customer {} not found", customer_id)));
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Delivery agents
    // ---------------------------------------------------------------

    pub fn get_agent_by_user(&self, user_id: i64) -> Result<Option<DeliveryAgent>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM DeliveryAgent WHERE user_id = ?1 ORDER BY agent_id LIMIT 1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![user_id], Self::row_to_agent)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    // ---------------------------------------------------------------
    // Restaurants
    // ---------------------------------------------------------------

    pub fn create_restaurant(&self, new: &NewRestaurant) -> Result<Restaurant> {
        let conn = self.conn.lock();
        let id = insert_restaurant(&conn, new)?;
        conn.query_row(
            "SELECT * FROM Restaurant WHERE restaurant_id = ?1",
            params![id],
            Self::row_to_restaurant,
        )
        .map_err(|e| Error::Database(e.to_string()))
    }

    pub fn list_restaurants(&self) -> Result<Vec<Restaurant>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT * FROM Restaurant ORDER BY restaurant_id")
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], Self::row_to_restaurant)
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Database(e.to_string()))
    }

    pub fn get_restaurant(&self, restaurant_id: i64) -> Result<Option<Restaurant>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM Restaurant WHERE restaurant_id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![restaurant_id], Self::row_to_restaurant)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    pub fn get_restaurant_by_owner(&self, user_id: i64) -> Result<Option<Restaurant>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM Restaurant WHERE user_id = ?1 ORDER BY restaurant_id LIMIT 1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![user_id], Self::row_to_restaurant)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    // ---------------------------------------------------------------
    // Menu
    // ---------------------------------------------------------------

    pub fn menu_for_restaurant(&self, restaurant_id: i64) -> Result<Vec<MenuItem>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT * FROM Menu WHERE restaurant_id = ?1 ORDER BY menu_id")
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![restaurant_id], Self::row_to_menu_item)
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Database(e.to_string()))
    }

    pub fn get_menu_item(&self, menu_id: i64) -> Result<Option<MenuItem>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM Menu WHERE menu_id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![menu_id], Self::row_to_menu_item)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    pub fn add_menu_item(&self, new: &NewMenuItem) -> Result<MenuItem> {
        let conn = self.conn.lock();
        let id = conn
            .prepare_cached(
                "INSERT INTO Menu (restaurant_id, items, price, types, cuisine) VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .insert(params![new.restaurant_id, new.items, new.price, new.types, new.cuisine])
            .map_err(|e| Error::Database(e.to_string()))?;
        conn.query_row(
            "SELECT * FROM Menu WHERE menu_id = ?1",
            params![id],
            Self::row_to_menu_item,
        )
        .map_err(|e| Error::Database(e.to_string()))
    }

    pub fn update_menu_item(&self, menu_id: i64, update: &MenuItemUpdate) -> Result<()> {
        let conn = self.conn.lock();
        let count = conn
            .execute(
                "UPDATE Menu SET \
                 items = COALESCE(?1, items), \
                 price = COALESCE(?2, price), \
                 types = COALESCE(?3, types), \
                 cuisine = COALESCE(?4, cuisine) \
                 WHERE menu_id = ?5",
                params![update.items, update.price, update.types, update.cuisine, menu_id],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        if count == 0 {
            return Err(Error::NotFound(format!("Menu item {} not found", menu_id)));
        }
        Ok(())
    }

    pub fn delete_menu_item(&self, menu_id: i64) -> Result<()> {
        let conn = self.conn.lock();
        let count = conn
            .execute("DELETE FROM Menu WHERE menu_id = ?1", params![menu_id])
            .map_err(|e| Error::Database(e.to_string()))?;
        if count == 0 {
            return Err(Error::NotFound(format!("Menu item {} not found", menu_id)));
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Payments
    // ---------------------------------------------------------------

    pub fn create_payment(&self, new: &NewPayment) -> Result<Payment> {
        let conn = self.conn.lock();
        let id = conn
            .prepare_cached(
                "INSERT INTO Payment (mode, status, discount, tip, customer_id, restaurant_id, order_id, amount) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .insert(params![
                new.mode,
                new.status,
                new.discount,
                new.tip,
                new.customer_id,
                new.restaurant_id,
                new.order_id,
                new.amount,
            ])
            .map_err(|e| Error::Database(e.to_string()))?;
        conn.query_row(
            "SELECT * FROM Payment WHERE payment_id = ?1",
            params![id],
            Self::row_to_payment,
        )
        .map_err(|e| Error::Database(e.to_string()))
    }

    pub fn payments_for_customer(&self, customer_id: i64) -> Result<Vec<Payment>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT * FROM Payment WHERE customer_id = ?1 ORDER BY payment_id DESC")
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![customer_id], Self::row_to_payment)
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Database(e.to_string()))
    }

    pub fn payment_for_order(&self, order_id: i64) -> Result<Option<Payment>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM Payment WHERE order_id = ?1 ORDER BY payment_id DESC LIMIT 1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![order_id], Self::row_to_payment)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    pub fn update_payment_status(&self, payment_id: i64, status: &str) -> Result<()> {
        let conn = self.conn.lock();
        let count = conn
            .execute(
                "UPDATE Payment SET status = ?1 WHERE payment_id = ?2",
                params![status, payment_id],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        if count == 0 {
            return Err(Error::NotFound(format!("Payment {} not found", payment_id)));
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Row mappers
    // ---------------------------------------------------------------

    pub(crate) fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            phone_no: row.get("phone_no")?,
            address: row.get("address")?,
            role: row.get("role")?,
            created_at: row.get("created_at")?,
        })
    }

    fn row_to_customer(row: &rusqlite::Row<'_>) -> rusqlite::Result<Customer> {
        Ok(Customer {
            customer_id: row.get("customer_id")?,
            name: row.get("name")?,
            phone_no: row.get("phone_no")?,
            address: row.get("address")?,
            preferences: row.get("preferences")?,
            user_id: row.get("user_id")?,
        })
    }

    fn row_to_agent(row: &rusqlite::Row<'_>) -> rusqlite::Result<DeliveryAgent> {
        Ok(DeliveryAgent {
            agent_id: row.get("agent_id")?,
            name: row.get("name")?,
            phone_no: row.get("phone_no")?,
            vehicle: row.get("vehicle")?,
            is_available: row.get("is_available")?,
            user_id: row.get("user_id")?,
        })
    }

    fn row_to_restaurant(row: &rusqlite::Row<'_>) -> rusqlite::Result<Restaurant> {
        Ok(Restaurant {
            restaurant_id: row.get("restaurant_id")?,
            name: row.get("name")?,
            location: row.get("location")?,
            cuisine: row.get("cuisine")?,
            phone_no: row.get("phone_no")?,
            rating: row.get("rating")?,
            pricing: row.get("pricing")?,
            user_id: row.get("user_id")?,
        })
    }

    fn row_to_menu_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<MenuItem> {
        Ok(MenuItem {
            menu_id: row.get("menu_id")?,
            restaurant_id: row.get("restaurant_id")?,
            items: row.get("items")?,
            price: row.get("price")?,
            types: row.get("types")?,
            cuisine: row.get("cuisine")?,
        })
    }

    fn row_to_payment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Payment> {
        Ok(Payment {
            payment_id: row.get("payment_id")?,
            mode: row.get("mode")?,
            status: row.get("status")?,
            discount: row.get("discount")?,
            tip: row.get("tip")?,
            customer_id: row.get("customer_id")?,
            restaurant_id: row.get("restaurant_id")?,
            order_id: row.get("order_id")?,
            amount: row.get("amount")?,
        })
    }
}

fn insert_restaurant(conn: &Connection, new: &NewRestaurant) -> Result<i64> {
    conn.prepare_cached(
        "INSERT INTO Restaurant (name, location, cuisine, phone_no, rating, pricing, user_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .map_err(|e| Error::Database(e.to_string()))?
    .insert(params![
        new.name,
        new.location,
        new.cuisine,
        new.phone_no,
        new.rating,
        new.pricing,
        new.user_id,
    ])
    .map_err(|e| Error::Database(e.to_string()))
}
