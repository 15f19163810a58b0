//! Iteration drivers, one per execution model. All three run the identical
//! publish -> assign -> reduce -> update cycle for an exact iteration
//! count; they differ only in how the per-worker accumulators travel and
//! how the updated centroids become visible again.

mod barrier;
mod message;
mod serial;

pub(crate) use barrier::BarrierGated;
pub(crate) use message::MessagePassing;
pub(crate) use serial::Serial;
