//! A bounded pool of reusable store connections.
//!
//! The pool is an explicitly constructed value with an explicit shutdown
//! ([`Pool::close`]); nothing about it is process-global. Every connection
//! pulled from the idle set is health-checked first, and a dead one is
//! replaced before the caller ever sees it.

use std::{
  future::Future,
  ops::Deref,
  sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
  time::Duration,
};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

use crate::{Error, Result};

// ─── Connector ───────────────────────────────────────────────────────────────

/// How the pool opens, checks and closes connections.
pub trait Connector: Send + Sync + 'static {
  type Connection: Send + Sync + 'static;

  /// Open a brand-new connection.
  fn connect(&self) -> impl Future<Output = Result<Self::Connection>> + Send + '_;

  /// Whether `conn` can still execute statements. Called on every idle
  /// connection before it is handed out.
  fn is_healthy<'a>(
    &'a self,
    conn: &'a Self::Connection,
  ) -> impl Future<Output = bool> + Send + 'a;

  /// Tear down a connection the pool no longer wants.
  fn close(&self, conn: Self::Connection) -> impl Future<Output = ()> + Send + '_;
}

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PoolConfig {
  /// Connections established eagerly by [`Pool::new`].
  pub min_size:         usize,
  /// Upper bound on live connections, idle and checked out together.
  pub max_size:         usize,
  /// How long [`Pool::acquire`] waits for a free slot.
  pub acquire_timeout:  Duration,
  /// Connection attempts before giving up; at least 1.
  pub connect_attempts: u32,
  /// Back-off unit between attempts; attempt `n` waits `n * retry_delay`.
  pub retry_delay:      Duration,
}

impl Default for PoolConfig {
  fn default() -> Self {
    Self {
      min_size:         1,
      max_size:         5,
      acquire_timeout:  Duration::from_secs(5),
      connect_attempts: 3,
      retry_delay:      Duration::from_millis(200),
    }
  }
}

impl PoolConfig {
  pub fn with_min_size(mut self, size: usize) -> Self {
    self.min_size = size;
    self
  }

  pub fn with_max_size(mut self, size: usize) -> Self {
    self.max_size = size;
    self
  }

  pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
    self.acquire_timeout = timeout;
    self
  }

  pub fn with_connect_attempts(mut self, attempts: u32) -> Self {
    self.connect_attempts = attempts;
    self
  }

  pub fn with_retry_delay(mut self, delay: Duration) -> Self {
    self.retry_delay = delay;
    self
  }

  fn validate(&self) -> Result<()> {
    if self.max_size == 0 {
      return Err(Error::Config("max_size must be at least 1".into()));
    }
    if self.min_size > self.max_size {
      return Err(Error::Config(format!(
        "min_size {} exceeds max_size {}",
        self.min_size, self.max_size
      )));
    }
    if self.connect_attempts == 0 {
      return Err(Error::Config("connect_attempts must be at least 1".into()));
    }
    Ok(())
  }
}

/// Point-in-time view of the pool, for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
  pub live:     usize,
  pub idle:     usize,
  pub max_size: usize,
  pub closed:   bool,
}

// ─── Pool ────────────────────────────────────────────────────────────────────

pub struct Pool<C: Connector> {
  connector: C,
  config:    PoolConfig,
  /// LIFO so the most recently used connection is reused first.
  idle:      Mutex<Vec<C::Connection>>,
  /// One permit per connection that may be checked out.
  permits:   Arc<Semaphore>,
  live:      AtomicUsize,
  closed:    AtomicBool,
}

impl<C: Connector> Pool<C> {
  /// Build the pool and establish `min_size` connections up front.
  ///
  /// Fails if the configuration is inconsistent or if the initial
  /// connections cannot be opened within the retry budget.
  pub async fn new(connector: C, config: PoolConfig) -> Result<Arc<Self>> {
    config.validate()?;

    let pool = Arc::new(Self {
      connector,
      permits: Arc::new(Semaphore::new(config.max_size)),
      idle: Mutex::new(Vec::with_capacity(config.max_size)),
      live: AtomicUsize::new(0),
      closed: AtomicBool::new(false),
      config,
    });

    for _ in 0..pool.config.min_size {
      let conn = pool.establish().await?;
      pool.idle_set().push(conn);
    }

    info!(
      min_size = pool.config.min_size,
      max_size = pool.config.max_size,
      "connection pool ready"
    );
    Ok(pool)
  }

  /// Check out a live connection.
  ///
  /// Waits at most `acquire_timeout` for a free slot, then hands out the most
  /// recently released healthy connection, or opens a new one.
  pub async fn acquire(self: &Arc<Self>) -> Result<PooledConnection<C>> {
    if self.is_closed() {
      return Err(Error::PoolClosed);
    }

    let permit = tokio::time::timeout(
      self.config.acquire_timeout,
      Arc::clone(&self.permits).acquire_owned(),
    )
    .await
    .map_err(|_| Error::AcquireTimeout(self.config.acquire_timeout))?
    .map_err(|_| Error::PoolClosed)?;

    let mut discarded = false;
    let conn = loop {
      let Some(conn) = self.pop_idle() else {
        break self.establish().await?;
      };
      if self.connector.is_healthy(&conn).await {
        break conn;
      }
      warn!("discarding stale pooled connection");
      self.live.fetch_sub(1, Ordering::AcqRel);
      self.connector.close(conn).await;
      discarded = true;
    };

    if discarded {
      self.replenish().await;
    }
    Ok(self.checked_out(conn, permit))
  }

  /// Shut the pool down: refuse new acquisitions and close idle
  /// connections. Checked-out connections are closed as they come back.
  pub async fn close(&self) {
    if self.closed.swap(true, Ordering::AcqRel) {
      return;
    }
    self.permits.close();

    let drained: Vec<C::Connection> = self.idle_set().drain(..).collect();
    let count = drained.len();
    for conn in drained {
      self.live.fetch_sub(1, Ordering::AcqRel);
      self.connector.close(conn).await;
    }
    info!(closed_idle = count, "connection pool shut down");
  }

  pub fn is_closed(&self) -> bool { self.closed.load(Ordering::Acquire) }

  pub fn status(&self) -> PoolStatus {
    PoolStatus {
      live:     self.live.load(Ordering::Acquire),
      idle:     self.idle_set().len(),
      max_size: self.config.max_size,
      closed:   self.is_closed(),
    }
  }

  /// Open a connection, retrying with a linear back-off.
  async fn establish(&self) -> Result<C::Connection> {
    let mut attempt = 0;
    loop {
      attempt += 1;
      match self.connector.connect().await {
        Ok(conn) => {
          self.live.fetch_add(1, Ordering::AcqRel);
          debug!(attempt, "opened store connection");
          return Ok(conn);
        }
        Err(e) if attempt < self.config.connect_attempts => {
          warn!(attempt, error = %e, "store connection failed; retrying");
          tokio::time::sleep(self.config.retry_delay * attempt).await;
        }
        Err(e) => {
          return Err(Error::Connect { attempts: attempt, source: Box::new(e) });
        }
      }
    }
  }

  /// Open idle connections until `min_size` are live again. A failure here
  /// only leaves the pool short; the next discard tries again.
  async fn replenish(&self) {
    while !self.is_closed() && self.live.load(Ordering::Acquire) < self.config.min_size {
      match self.establish().await {
        Ok(conn) => self.idle_set().push(conn),
        Err(e) => {
          warn!(error = %e, "could not restore minimum pool size");
          return;
        }
      }
    }
  }

  /// Give a connection back. After shutdown it is dropped instead.
  fn release(&self, conn: C::Connection) {
    if self.is_closed() {
      self.live.fetch_sub(1, Ordering::AcqRel);
      debug!("dropping connection released after shutdown");
      drop(conn);
      return;
    }
    self.idle_set().push(conn);
  }

  fn pop_idle(&self) -> Option<C::Connection> { self.idle_set().pop() }

  fn idle_set(&self) -> std::sync::MutexGuard<'_, Vec<C::Connection>> {
    self.idle.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn checked_out(
    self: &Arc<Self>,
    conn: C::Connection,
    permit: OwnedSemaphorePermit,
  ) -> PooledConnection<C> {
    PooledConnection { conn: Some(conn), pool: Arc::clone(self), _permit: permit }
  }
}

// ─── Checked-out connection ──────────────────────────────────────────────────

/// A connection borrowed from a [`Pool`]. Dereferences to the underlying
/// connection and goes back to the pool when dropped.
pub struct PooledConnection<C: Connector> {
  conn:    Option<C::Connection>,
  pool:    Arc<Pool<C>>,
  // Dropped after `Drop::drop` has put the connection back, so a waiter
  // always finds it in the idle set.
  _permit: OwnedSemaphorePermit,
}

impl<C: Connector> PooledConnection<C> {
  /// Return the connection to the pool now rather than at end of scope.
  pub fn release(self) { drop(self) }
}

impl<C: Connector> Deref for PooledConnection<C> {
  type Target = C::Connection;

  fn deref(&self) -> &Self::Target {
    self.conn.as_ref().expect("connection is present until drop")
  }
}

impl<C: Connector> Drop for PooledConnection<C> {
  fn drop(&mut self) {
    if let Some(conn) = self.conn.take() {
      self.pool.release(conn);
    }
  }
}
