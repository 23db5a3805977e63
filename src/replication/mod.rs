//! Authority/replica split
//!
//! Breaks flow down (authority to replicas) over reliable ordered channels;
//! mutation requests flow up over a request/acknowledge channel. No memory is
//! shared between the two roles.

pub mod messages;
pub mod replica;

pub use messages::{AuthorityRequest, PendingAck};
pub use replica::ReplicaSkeleton;
