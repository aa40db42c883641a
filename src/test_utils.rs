//! Helpers shared by unit tests, integration tests and benchmarks

use crate::physics::body::{Body, BodyHandle};
use crate::physics::math::{Scalar, Vector3};
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

static NEXT_TEMP_FILE: AtomicUsize = AtomicUsize::new(0);

/// A path in the system temp directory that no other call in this process
/// returns. The file is not created.
pub fn temp_path(label: &str, extension: &str) -> PathBuf {
    let serial = NEXT_TEMP_FILE.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "orrery-{label}-{}-{serial}.{extension}",
        std::process::id()
    ))
}

/// Builds a validated body.
///
/// # Panics
///
/// Panics if the parameters are not physical.
pub fn body(mass: Scalar, radius: Scalar, position: Vector3, velocity: Vector3) -> BodyHandle {
    Arc::new(Body::new(mass, radius, position, velocity).expect("test body parameters are valid"))
}

/// A unit-radius body at rest.
pub fn body_at(mass: Scalar, position: Vector3) -> BodyHandle {
    body(mass, 1.0, position, Vector3::ZERO)
}

/// Two equal bodies at rest on the x axis, `separation` apart, centred on
/// the origin.
pub fn symmetric_pair(mass: Scalar, radius: Scalar, separation: Scalar) -> Vec<BodyHandle> {
    let half = Vector3::new(separation / 2.0, 0.0, 0.0);
    vec![
        body(mass, radius, -half, Vector3::ZERO),
        body(mass, radius, half, Vector3::ZERO),
    ]
}

/// `count` small bodies scattered through a cube of side `2 * extent`, far
/// enough apart on average that few of them touch.
pub fn scattered_bodies<R: Rng + ?Sized>(rng: &mut R, count: usize, extent: Scalar) -> Vec<BodyHandle> {
    (0..count)
        .map(|_| {
            let position = Vector3::new(
                rng.random_range(-extent..extent),
                rng.random_range(-extent..extent),
                rng.random_range(-extent..extent),
            );
            let velocity = Vector3::new(
                rng.random_range(-0.1..0.1),
                rng.random_range(-0.1..0.1),
                rng.random_range(-0.1..0.1),
            );
            body(rng.random_range(1.0..10.0), 0.5, position, velocity)
        })
        .collect()
}

/// Polls `condition` every millisecond until it holds or `timeout` passes.
/// Returns whether it held.
pub fn wait_until<F: FnMut() -> bool>(timeout: Duration, mut condition: F) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
}

/// Distance between the first two bodies of `bodies`.
pub fn separation(bodies: &[BodyHandle]) -> Scalar {
    let a = bodies[0].snapshot().position;
    let b = bodies[1].snapshot().position;
    a.distance(b)
}
