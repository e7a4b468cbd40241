// Shared test doubles

use eyre::{Result, eyre};

use crate::kv::{KvStore, MemoryKv};

/// Store that serves reads from memory but rejects every write
#[derive(Default)]
pub(crate) struct FailingKv {
    pub(crate) inner: MemoryKv,
}

impl KvStore for FailingKv {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.read(key)
    }

    fn write(&mut self, _key: &str, _bytes: &[u8]) -> Result<()> {
        Err(eyre!("write rejected: disk full"))
    }
}
