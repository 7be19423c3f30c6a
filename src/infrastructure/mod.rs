pub mod in_memory;
pub mod rest_checkout;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
