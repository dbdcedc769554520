//! Work Queue Runtime persistence (C6): durable FIFO queue plus DLQ backed
//! by an embedded `fjall` keyspace. Workers pull directly via
//! `FjallQueue::lease` rather than through an in-process broker, since the
//! API and worker here are separate processes sharing only this durable
//! queue.

pub mod store;

pub use store::{FjallQueue, QueueError};
