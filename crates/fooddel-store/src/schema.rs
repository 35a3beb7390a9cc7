//! Database schema SQL.
//!
//! Table names keep the casing the browser client and existing dumps use
//! (`Customer`, `Restaurant`, `Menu`, `Orders`, ...).

/// Accounts: users, role profiles, and bearer-token sessions.
pub const ACCOUNTS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    phone_no TEXT NOT NULL,
    address TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('customer', 'restaurant', 'delivery_agent')),
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS Customer (
    customer_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    phone_no TEXT,
    address TEXT,
    preferences TEXT,
    user_id INTEGER REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS DeliveryAgent (
    agent_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    phone_no TEXT,
    vehicle TEXT,
    is_available INTEGER NOT NULL DEFAULT 1,
    user_id INTEGER REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    email TEXT NOT NULL,
    role TEXT NOT NULL,
    expires_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_customer_user ON Customer(user_id);
CREATE INDEX IF NOT EXISTS idx_agent_user ON DeliveryAgent(user_id);
CREATE INDEX IF NOT EXISTS idx_sessions_expiry ON sessions(expires_at);
"#;

/// Catalog: restaurants and their menu items.
pub const CATALOG_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS Restaurant (
    restaurant_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    location TEXT,
    cuisine TEXT,
    phone_no TEXT,
    rating REAL,
    pricing TEXT,
    user_id INTEGER REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS Menu (
    menu_id INTEGER PRIMARY KEY AUTOINCREMENT,
    restaurant_id INTEGER NOT NULL REFERENCES Restaurant(restaurant_id),
    items TEXT NOT NULL,
    price REAL NOT NULL,
    types TEXT,
    cuisine TEXT
);

CREATE INDEX IF NOT EXISTS idx_restaurant_owner ON Restaurant(user_id);
CREATE INDEX IF NOT EXISTS idx_menu_restaurant ON Menu(restaurant_id);
"#;

/// Orders, their line items, and payments.
pub const ORDERS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS Orders (
    order_id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_id INTEGER NOT NULL REFERENCES Customer(customer_id),
    restaurant_id INTEGER NOT NULL REFERENCES Restaurant(restaurant_id),
    delivery_agent_id INTEGER REFERENCES DeliveryAgent(agent_id),
    date TEXT NOT NULL,
    time TEXT NOT NULL,
    total_amount REAL NOT NULL,
    delivery_address TEXT NOT NULL,
    payment_method TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    delivery_time TEXT
);

CREATE TABLE IF NOT EXISTS order_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id INTEGER NOT NULL REFERENCES Orders(order_id),
    menu_id INTEGER,
    item_name TEXT NOT NULL,
    price REAL NOT NULL,
    quantity INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS Payment (
    payment_id INTEGER PRIMARY KEY AUTOINCREMENT,
    mode TEXT NOT NULL,
    status TEXT NOT NULL,
    discount REAL NOT NULL DEFAULT 0,
    tip REAL NOT NULL DEFAULT 0,
    customer_id INTEGER REFERENCES Customer(customer_id),
    restaurant_id INTEGER REFERENCES Restaurant(restaurant_id),
    order_id INTEGER REFERENCES Orders(order_id),
    amount REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_customer ON Orders(customer_id);
CREATE INDEX IF NOT EXISTS idx_orders_restaurant ON Orders(restaurant_id, status, date);
CREATE INDEX IF NOT EXISTS idx_orders_agent ON Orders(delivery_agent_id);
CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id);
CREATE INDEX IF NOT EXISTS idx_payment_order ON Payment(order_id);
"#;
