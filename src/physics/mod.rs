//! Physics core
//!
//! Each tick runs three phases in order: pairwise gravity ([`gravity`],
//! fanned out over [`pool`]), motion ([`integrator`]) and merging
//! ([`collisions`]).

pub mod body;
pub mod collisions;
pub mod gravity;
pub mod integrator;
pub mod math;
pub mod pool;
pub mod trail;

pub use body::{Body, BodyHandle, BodyId, BodyState};
pub use collisions::{MergeEvent, resolve_collisions};
pub use gravity::GravityParams;
pub use math::{Plane, Scalar, Vector3};
pub use pool::ForcePool;
pub use trail::Trail;
