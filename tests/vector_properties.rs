use approx::assert_relative_eq;
use orrery::physics::{Plane, Vector3};
use proptest::prelude::*;

fn component() -> impl Strategy<Value = f64> {
    -1.0e6..1.0e6
}

fn vector() -> impl Strategy<Value = Vector3> {
    (component(), component(), component()).prop_map(|(x, y, z)| Vector3::new(x, y, z))
}

proptest! {
    #[test]
    fn test_normalized_has_unit_length(v in vector()) {
        prop_assume!(v.length() > 1e-6);
        prop_assert!((v.normalized().length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_to_self_is_zero(v in vector()) {
        prop_assert_eq!(v.distance(v), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric(a in vector(), b in vector()) {
        prop_assert_eq!(a.distance(b), b.distance(a));
    }

    #[test]
    fn test_cross_is_orthogonal(a in vector(), b in vector()) {
        let c = a.cross(b);
        let scale = a.length() * b.length() * c.length() + 1.0;
        prop_assert!(c.dot(a).abs() / scale < 1e-9);
        prop_assert!(c.dot(b).abs() / scale < 1e-9);
    }
}

#[test]
fn test_plane_distance_through_origin() {
    let plane = Plane::new(Vector3::Z, Vector3::ZERO);

    assert_relative_eq!(plane.distance(Vector3::new(0.0, 0.0, 1.0)), 1.0);
    assert_eq!(plane.distance(Vector3::ZERO), 0.0);
    assert_eq!(plane.distance(Vector3::new(1.0, 1.0, 0.0)), 0.0);
    assert!(plane.contains_in_front(Vector3::new(0.0, 0.0, 2.0)));
    assert!(!plane.contains_in_front(Vector3::new(0.0, 0.0, -2.0)));
}

#[test]
fn test_zero_vector_normalizes_to_zero() {
    assert_eq!(Vector3::ZERO.normalized(), Vector3::ZERO);
}
