//! Bodies: the unit of simulation
//!
//! A [`Body`] pairs a stable identity with mutable physical state behind its
//! own lock. The container of bodies is guarded separately (see
//! [`crate::simulation`]); the per-body lock exists so that force workers can
//! update two bodies sharing a neighbour without holding the container lock.

use crate::error::BodyError;
use crate::physics::math::{Scalar, Vector3};
use crate::physics::trail::Trail;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared reference to a body, as handed to the renderer.
pub type BodyHandle = Arc<Body>;

static NEXT_BODY_ID: AtomicU64 = AtomicU64::new(1);

/// Identity by allocation: two bodies with equal state are still distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(u64);

impl BodyId {
    fn next() -> Self {
        Self(NEXT_BODY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mutable physical state of a body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyState {
    pub mass: Scalar,
    pub radius: Scalar,
    /// Accumulated heat from merges; never decreases.
    pub temperature: Scalar,
    pub position: Vector3,
    pub velocity: Vector3,
    pub trail: Trail,
    alive: bool,
}

impl BodyState {
    pub fn new(mass: Scalar, radius: Scalar, position: Vector3, velocity: Vector3) -> Self {
        Self {
            mass,
            radius,
            temperature: 0.0,
            position,
            velocity,
            trail: Trail::default(),
            alive: true,
        }
    }

    pub fn with_temperature(mut self, temperature: Scalar) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_trail_length(mut self, max_points: usize) -> Self {
        self.trail = Trail::new(max_points);
        self
    }

    pub fn validate(&self) -> Result<(), BodyError> {
        validate_parameters(self.mass, self.radius, self.position, self.velocity)?;
        if !self.temperature.is_finite() {
            return Err(BodyError::NonFinite {
                field: "temperature",
            });
        }
        Ok(())
    }

    /// Panics unless the state is usable by a physics operation.
    #[track_caller]
    pub fn assert_physical(&self) {
        assert!(
            self.mass > 0.0 && self.mass.is_finite(),
            "physics operation on body with invalid mass {}",
            self.mass
        );
        self.position.assert_finite("body position");
        self.velocity.assert_finite("body velocity");
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Marks the body as consumed; it is dropped from the container at the
    /// end of the current collision pass.
    pub(crate) fn invalidate(&mut self) {
        self.alive = false;
    }

    #[inline]
    pub fn momentum(&self) -> Vector3 {
        self.velocity * self.mass
    }

    #[inline]
    pub fn kinetic_energy(&self) -> Scalar {
        0.5 * self.mass * self.velocity.length_squared()
    }
}

/// Checks the parameters a body may be created with.
pub fn validate_parameters(
    mass: Scalar,
    radius: Scalar,
    position: Vector3,
    velocity: Vector3,
) -> Result<(), BodyError> {
    if !(mass > 0.0 && mass.is_finite()) {
        return Err(BodyError::NonPositiveMass(mass));
    }
    if !(radius >= 0.0 && radius.is_finite()) {
        return Err(BodyError::NegativeRadius(radius));
    }
    if !position.is_finite() {
        return Err(BodyError::NonFinite { field: "position" });
    }
    if !velocity.is_finite() {
        return Err(BodyError::NonFinite { field: "velocity" });
    }
    Ok(())
}

pub struct Body {
    id: BodyId,
    state: Mutex<BodyState>,
}

impl Body {
    pub fn new(
        mass: Scalar,
        radius: Scalar,
        position: Vector3,
        velocity: Vector3,
    ) -> Result<Self, BodyError> {
        Self::from_state(BodyState::new(mass, radius, position, velocity))
    }

    pub fn from_state(state: BodyState) -> Result<Self, BodyError> {
        state.validate()?;
        Ok(Self {
            id: BodyId::next(),
            state: Mutex::new(state),
        })
    }

    #[inline]
    pub fn id(&self) -> BodyId {
        self.id
    }

    /// Exclusive access to the body's state. Only the simulation writes;
    /// everyone else reads through [`Body::snapshot`] and the accessors.
    ///
    /// A poisoned lock is recovered: the panic that poisoned it already
    /// stopped the tick that was mutating this body.
    pub(crate) fn lock(&self) -> MutexGuard<'_, BodyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Point-in-time copy of the state.
    pub fn snapshot(&self) -> BodyState {
        self.lock().clone()
    }

    pub fn position(&self) -> Vector3 {
        self.lock().position
    }

    pub fn velocity(&self) -> Vector3 {
        self.lock().velocity
    }

    pub fn mass(&self) -> Scalar {
        self.lock().mass
    }

    pub fn radius(&self) -> Scalar {
        self.lock().radius
    }

    pub fn temperature(&self) -> Scalar {
        self.lock().temperature
    }

    /// Copy of the trail, oldest point first.
    pub fn trail(&self) -> Vec<Vector3> {
        self.lock().trail.points().copied().collect()
    }

    pub fn is_alive(&self) -> bool {
        self.lock().is_alive()
    }

    /// Locks two distinct bodies in ascending id order and returns the
    /// guards in argument order.
    ///
    /// # Panics
    ///
    /// Panics if `a` and `b` are the same body.
    #[track_caller]
    pub(crate) fn lock_pair<'a>(
        a: &'a Body,
        b: &'a Body,
    ) -> (MutexGuard<'a, BodyState>, MutexGuard<'a, BodyState>) {
        assert_ne!(a.id, b.id, "body {} paired with itself", a.id);

        if a.id < b.id {
            let guard_a = a.lock();
            let guard_b = b.lock();
            (guard_a, guard_b)
        } else {
            let guard_b = b.lock();
            let guard_a = a.lock();
            (guard_a, guard_b)
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("id", &self.id)
            .field("state", &*self.lock())
            .finish()
    }
}
