use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use uuid::Uuid;

use stockroom_storage::{
    CreatePrincipalParams, CreateProductParams, Order, OrderFilter, OrderId, OrderRecord, Page,
    PlaceOrderParams, Principal, PrincipalId, Product, ProductDisplay, ProductFilter, ProductId,
    Role, Store, StoreError,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// `~/.stockroom/store.db` (creates dir with 0700 perms on unix)
    pub async fn open_default() -> Result<Self, StoreError> {
        let dir = dirs::home_dir()
            .ok_or_else(|| StoreError::Backend("no home dir".into()))?
            .join(".stockroom");
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::Backend(e.to_string()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700))
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        let path = dir.join("store.db");
        let url = format!("sqlite://{}?mode=rwc", path.to_string_lossy());
        Self::open(&url).await
    }

    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self { pool })
    }
}

fn backend_err(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Maps SQLite UNIQUE violations to `AlreadyExists`.
fn insert_err(e: sqlx::Error) -> StoreError {
    let s = e.to_string();
    if s.contains("UNIQUE") {
        StoreError::AlreadyExists
    } else {
        StoreError::Backend(s)
    }
}

fn parse_id(s: &str) -> Result<Uuid, StoreError> {
    Uuid::try_parse(s).map_err(|e| StoreError::Backend(e.to_string()))
}

// Timestamps are stored as unix microseconds so same-second writes still
// order deterministically.
fn parse_ts(micros: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| StoreError::Backend(format!("invalid timestamp: {}", micros)))
}

type PrincipalRow = (String, String, String, String, i64, i64);

fn principal_from_row(row: PrincipalRow) -> Result<Principal, StoreError> {
    let (id, username, secret_hash, role, created_at, updated_at) = row;
    Ok(Principal {
        id: PrincipalId(parse_id(&id)?),
        username,
        secret_hash,
        role: role
            .parse::<Role>()
            .map_err(|e| StoreError::Backend(e.to_string()))?,
        created_at: parse_ts(created_at)?,
        updated_at: parse_ts(updated_at)?,
    })
}

type ProductRow = (
    String,
    String,
    f64,
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    i64,
    i64,
);

fn product_from_row(row: ProductRow) -> Result<Product, StoreError> {
    let (id, name, price, stock, description, size, color, image_url, created_at, updated_at) =
        row;
    Ok(Product {
        id: ProductId(parse_id(&id)?),
        name,
        price,
        stock,
        description,
        size,
        color,
        image_url,
        created_at: parse_ts(created_at)?,
        updated_at: parse_ts(updated_at)?,
    })
}

type OrderRow = (
    String,
    String,
    String,
    String,
    i64,
    String,
    String,
    f64,
    String,
    i64,
    i64,
);

fn order_from_row(row: OrderRow) -> Result<Order, StoreError> {
    let (
        id,
        worker_id,
        product_id,
        customer_name,
        quantity,
        address,
        contact,
        cod,
        description,
        delivered,
        created_at,
    ) = row;
    Ok(Order {
        id: OrderId(parse_id(&id)?),
        worker_id: PrincipalId(parse_id(&worker_id)?),
        product_id: ProductId(parse_id(&product_id)?),
        customer_name,
        quantity,
        address,
        contact,
        cod,
        description,
        delivered: delivered != 0,
        created_at: parse_ts(created_at)?,
    })
}

#[async_trait::async_trait]
impl Store for SqliteStore {
    // ───────────────────────────── Principals ─────────────────────────────

    async fn create_principal(
        &self,
        params: &CreatePrincipalParams,
    ) -> Result<Principal, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now().timestamp_micros();
        sqlx::query(
            "INSERT INTO principals(id,username,secret_hash,role,created_at,updated_at)
             VALUES(?,?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(&params.username)
        .bind(&params.secret_hash)
        .bind(params.role.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(insert_err)?;

        Ok(Principal {
            id: PrincipalId(id),
            username: params.username.clone(),
            secret_hash: params.secret_hash.clone(),
            role: params.role,
            created_at: parse_ts(now)?,
            updated_at: parse_ts(now)?,
        })
    }

    async fn get_principal(&self, id: &PrincipalId) -> Result<Principal, StoreError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            "SELECT id,username,secret_hash,role,created_at,updated_at
             FROM principals WHERE id=?",
        )
        .bind(id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => principal_from_row(row),
        }
    }

    async fn get_principal_by_username(
        &self,
        role: Role,
        username: &str,
    ) -> Result<Principal, StoreError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            "SELECT id,username,secret_hash,role,created_at,updated_at
             FROM principals WHERE role=? AND username=?",
        )
        .bind(role.as_str())
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => principal_from_row(row),
        }
    }

    async fn update_principal_secret(
        &self,
        id: &PrincipalId,
        secret_hash: &str,
    ) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE principals SET secret_hash=?, updated_at=? WHERE id=?")
            .bind(secret_hash)
            .bind(Utc::now().timestamp_micros())
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend_err)?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    // ───────────────────────────── Products ───────────────────────────────

    async fn create_product(&self, params: &CreateProductParams) -> Result<Product, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now().timestamp_micros();
        sqlx::query(
            "INSERT INTO products(id,name,price,stock,description,size,color,image_url,created_at,updated_at)
             VALUES(?,?,?,?,?,?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(&params.name)
        .bind(params.price)
        .bind(params.stock)
        .bind(&params.description)
        .bind(&params.size)
        .bind(&params.color)
        .bind(&params.image_url)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(insert_err)?;

        Ok(Product {
            id: ProductId(id),
            name: params.name.clone(),
            price: params.price,
            stock: params.stock,
            description: params.description.clone(),
            size: params.size.clone(),
            color: params.color.clone(),
            image_url: params.image_url.clone(),
            created_at: parse_ts(now)?,
            updated_at: parse_ts(now)?,
        })
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id,name,price,stock,description,size,color,image_url,created_at,updated_at
             FROM products WHERE id=?",
        )
        .bind(id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => product_from_row(row),
        }
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM products WHERE id=?")
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend_err)?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Page<Product>, StoreError> {
        let needle = filter.name_contains.as_deref();

        let (total_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM products
             WHERE (? IS NULL OR instr(lower(name), lower(?)) > 0)",
        )
        .bind(needle)
        .bind(needle)
        .fetch_one(&self.pool)
        .await
        .map_err(backend_err)?;

        // Newest first; id breaks exact-timestamp ties.
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id,name,price,stock,description,size,color,image_url,created_at,updated_at
             FROM products
             WHERE (? IS NULL OR instr(lower(name), lower(?)) > 0)
             ORDER BY created_at DESC, id DESC
             LIMIT ? OFFSET ?",
        )
        .bind(needle)
        .bind(needle)
        .bind(filter.take)
        .bind(filter.skip)
        .fetch_all(&self.pool)
        .await
        .map_err(backend_err)?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(product_from_row(row)?);
        }
        Ok(Page { items, total_count })
    }

    // ───────────────────────────── Orders ─────────────────────────────────

    async fn place_order(&self, params: &PlaceOrderParams) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend_err)?;

        // Conditional decrement: zero rows affected means either the product
        // is gone or fewer than `quantity` units remain. Disambiguate inside
        // the same transaction so the answer cannot shift under us.
        let res = sqlx::query(
            "UPDATE products SET stock = stock - ?, updated_at = ?
             WHERE id = ? AND stock >= ?",
        )
        .bind(params.quantity)
        .bind(Utc::now().timestamp_micros())
        .bind(params.product_id.0.to_string())
        .bind(params.quantity)
        .execute(&mut *tx)
        .await
        .map_err(backend_err)?;

        if res.rows_affected() == 0 {
            let exists: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM products WHERE id=?")
                .bind(params.product_id.0.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(backend_err)?;
            return Err(if exists.is_none() {
                StoreError::NotFound
            } else {
                StoreError::InsufficientStock
            });
        }

        let id = Uuid::now_v7();
        let now = Utc::now().timestamp_micros();
        sqlx::query(
            "INSERT INTO orders(id,worker_id,product_id,customer_name,quantity,address,contact,cod,description,delivered,created_at)
             VALUES(?,?,?,?,?,?,?,?,?,0,?)",
        )
        .bind(id.to_string())
        .bind(params.worker_id.0.to_string())
        .bind(params.product_id.0.to_string())
        .bind(&params.customer_name)
        .bind(params.quantity)
        .bind(&params.address)
        .bind(&params.contact)
        .bind(params.cod)
        .bind(&params.description)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(backend_err)?;

        tx.commit().await.map_err(backend_err)?;

        Ok(Order {
            id: OrderId(id),
            worker_id: params.worker_id,
            product_id: params.product_id,
            customer_name: params.customer_name.clone(),
            quantity: params.quantity,
            address: params.address.clone(),
            contact: params.contact.clone(),
            cod: params.cod,
            description: params.description.clone(),
            delivered: false,
            created_at: parse_ts(now)?,
        })
    }

    async fn get_order(&self, id: &OrderId) -> Result<Order, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id,worker_id,product_id,customer_name,quantity,address,contact,cod,description,delivered,created_at
             FROM orders WHERE id=?",
        )
        .bind(id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => order_from_row(row),
        }
    }

    async fn set_order_delivered(
        &self,
        id: &OrderId,
        delivered: bool,
    ) -> Result<Order, StoreError> {
        let res = sqlx::query("UPDATE orders SET delivered=? WHERE id=?")
            .bind(delivered as i64)
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend_err)?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_order(id).await
    }

    async fn delete_order(&self, id: &OrderId) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM orders WHERE id=?")
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend_err)?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Page<OrderRecord>, StoreError> {
        let worker = filter.worker_id.map(|id| id.0.to_string());
        let needle = filter.customer_contains.as_deref();

        let (total_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM orders
             WHERE (? IS NULL OR worker_id = ?)
               AND (? IS NULL OR instr(lower(customer_name), lower(?)) > 0)",
        )
        .bind(&worker)
        .bind(&worker)
        .bind(needle)
        .bind(needle)
        .fetch_one(&self.pool)
        .await
        .map_err(backend_err)?;

        type JoinedRow = (
            String,
            String,
            String,
            String,
            i64,
            String,
            String,
            f64,
            String,
            i64,
            i64,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<String>,
        );

        let rows = sqlx::query_as::<_, JoinedRow>(
            "SELECT o.id,o.worker_id,o.product_id,o.customer_name,o.quantity,o.address,o.contact,
                    o.cod,o.description,o.delivered,o.created_at,
                    p.name,p.size,p.color,p.image_url,
                    w.username
             FROM orders o
             LEFT JOIN products p ON p.id = o.product_id
             LEFT JOIN principals w ON w.id = o.worker_id
             WHERE (? IS NULL OR o.worker_id = ?)
               AND (? IS NULL OR instr(lower(o.customer_name), lower(?)) > 0)
             ORDER BY o.created_at DESC, o.id DESC
             LIMIT ? OFFSET ?",
        )
        .bind(&worker)
        .bind(&worker)
        .bind(needle)
        .bind(needle)
        .bind(filter.take)
        .bind(filter.skip)
        .fetch_all(&self.pool)
        .await
        .map_err(backend_err)?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let (
                id,
                worker_id,
                product_id,
                customer_name,
                quantity,
                address,
                contact,
                cod,
                description,
                delivered,
                created_at,
                p_name,
                p_size,
                p_color,
                p_image_url,
                w_username,
            ) = row;
            let order = order_from_row((
                id,
                worker_id,
                product_id,
                customer_name,
                quantity,
                address,
                contact,
                cod,
                description,
                delivered,
                created_at,
            ))?;
            let product = p_name.map(|name| ProductDisplay {
                name,
                size: p_size,
                color: p_color,
                image_url: p_image_url,
            });
            items.push(OrderRecord {
                order,
                product,
                worker_name: w_username,
            });
        }
        Ok(Page { items, total_count })
    }
}
