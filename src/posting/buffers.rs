//! Pooled byte buffers for message assembly
//!
//! Message payloads and timestamp prefixes are built in buffers recycled
//! through a factory, so a long posting run settles into a steady state with
//! no per-message allocation. Each factory hands out buffers pre-sized for
//! one purpose (large for payloads, small for prefixes).

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Maximum number of idle buffers a factory keeps around.
const MAX_POOLED_BUFFERS: usize = 64;

struct FactoryInner {
    buffer_size: usize,
    pool: Mutex<Vec<Vec<u8>>>,
    allocations: AtomicU64,
}

/// Factory for fixed-capacity pooled buffers.
///
/// Cloning the factory clones a handle to the same underlying pool.
#[derive(Clone)]
pub struct PooledBufferFactory {
    inner: Arc<FactoryInner>,
}

impl PooledBufferFactory {
    /// Create a factory handing out buffers with `buffer_size` bytes of
    /// initial capacity.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            inner: Arc::new(FactoryInner {
                buffer_size,
                pool: Mutex::new(Vec::new()),
                allocations: AtomicU64::new(0),
            }),
        }
    }

    /// Take an empty buffer from the pool, allocating a fresh one when the
    /// pool is dry.
    pub fn acquire(&self) -> PooledBuffer {
        let recycled = self.inner.pool.lock().unwrap().pop();
        let buffer = match recycled {
            Some(buffer) => buffer,
            None => {
                self.inner.allocations.fetch_add(1, Ordering::Relaxed);
                Vec::with_capacity(self.inner.buffer_size)
            }
        };

        PooledBuffer {
            buffer,
            inner: Arc::clone(&self.inner),
        }
    }

    /// Capacity of the buffers this factory creates.
    pub fn buffer_size(&self) -> usize {
        self.inner.buffer_size
    }

    /// Number of buffers allocated so far (as opposed to recycled).
    pub fn allocations(&self) -> u64 {
        self.inner.allocations.load(Ordering::Relaxed)
    }

    /// Number of idle buffers currently pooled.
    pub fn pooled(&self) -> usize {
        self.inner.pool.lock().unwrap().len()
    }
}

impl std::fmt::Debug for PooledBufferFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledBufferFactory")
            .field("buffer_size", &self.buffer_size())
            .field("allocations", &self.allocations())
            .field("pooled", &self.pooled())
            .finish()
    }
}

/// Buffer borrowed from a [`PooledBufferFactory`].
///
/// Dereferences to `Vec<u8>`. Returns to the factory pool on drop; convert
/// with `Vec::from` to take the bytes out permanently.
pub struct PooledBuffer {
    buffer: Vec<u8>,
    inner: Arc<FactoryInner>,
}

impl Deref for PooledBuffer {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

impl From<PooledBuffer> for Vec<u8> {
    fn from(mut buffer: PooledBuffer) -> Self {
        // Detach the storage; the drop impl sees an empty vec and skips the
        // pool.
        std::mem::take(&mut buffer.buffer)
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        if self.buffer.capacity() == 0 {
            return;
        }
        let mut pool = self.inner.pool.lock().unwrap();
        if pool.len() < MAX_POOLED_BUFFERS {
            self.buffer.clear();
            pool.push(std::mem::take(&mut self.buffer));
        }
    }
}
