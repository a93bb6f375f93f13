//! Struct and functions for working with `Vertex`s from which `Polygon`s are composed.

use crate::float_types::Real;
use nalgebra::{Point3, Vector3};

/// A vertex of a polygon, holding position and normal.
#[derive(Debug, Clone, PartialEq, Copy)]
pub struct Vertex {
    pub pos: Point3<Real>,
    pub normal: Vector3<Real>,
}

impl Vertex {
    /// Create a new [`Vertex`].
    ///
    /// * `pos`    – the position in model space
    /// * `normal` – (optionally non‑unit) normal; it will be **copied verbatim**, so make sure it is oriented the way you need it for BSP tests.
    ///
    /// Non-finite components (as found in broken STL files) are replaced with `0.0`.
    #[inline]
    pub fn new(mut pos: Point3<Real>, mut normal: Vector3<Real>) -> Self {
        for c in pos.coords.iter_mut() {
            if !c.is_finite() {
                *c = 0.0;
            }
        }

        for c in normal.iter_mut() {
            if !c.is_finite() {
                *c = 0.0;
            }
        }

        Vertex { pos, normal }
    }

    /// Flip vertex normal in place.
    ///
    /// # Example
    /// ```rust
    /// # use nalgebra::{Point3, Vector3};
    /// # use stlbool::mesh::vertex::Vertex;
    /// let mut v = Vertex::new(Point3::new(1.0, 2.0, 3.0), Vector3::x());
    /// v.flip();
    /// assert_eq!(v.pos, Point3::new(1.0, 2.0, 3.0), "position remains the same");
    /// assert_eq!(v.normal, -Vector3::x(), "the normal is negated");
    /// ```
    pub fn flip(&mut self) {
        self.normal = -self.normal;
    }

    /// Return the linear interpolation between `self` (`t = 0`) and `other` (`t = 1`).
    ///
    /// Normals are linearly interpolated as well.
    pub fn interpolate(&self, other: &Vertex, t: Real) -> Vertex {
        let new_pos = self.pos + (other.pos - self.pos) * t;
        let new_normal = self.normal + (other.normal - self.normal) * t;
        Vertex::new(new_pos, new_normal)
    }

    pub fn distance_to(&self, other: &Vertex) -> Real {
        (self.pos - other.pos).norm()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct VertexEpsilon {
    pub position: <Point3<Real> as approx::AbsDiffEq>::Epsilon,
    pub normal: <Vector3<Real> as approx::AbsDiffEq>::Epsilon,
}

impl approx::AbsDiffEq for Vertex {
    type Epsilon = VertexEpsilon;

    fn default_epsilon() -> Self::Epsilon {
        Self::Epsilon {
            position: Point3::<Real>::default_epsilon(),
            normal: Vector3::<Real>::default_epsilon(),
        }
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        approx::AbsDiffEq::abs_diff_eq(&self.pos, &other.pos, epsilon.position)
            && approx::AbsDiffEq::abs_diff_eq(&self.normal, &other.normal, epsilon.normal)
    }
}

impl approx::RelativeEq for Vertex {
    fn default_max_relative() -> Self::Epsilon {
        Self::Epsilon {
            position: Point3::<Real>::default_max_relative(),
            normal: Vector3::<Real>::default_max_relative(),
        }
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        approx::RelativeEq::relative_eq(
            &self.pos,
            &other.pos,
            epsilon.position,
            max_relative.position,
        ) && approx::RelativeEq::relative_eq(
            &self.normal,
            &other.normal,
            epsilon.normal,
            max_relative.normal,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn new_sanitises_non_finite() {
        let v = Vertex::new(
            Point3::new(Real::NAN, 2.0, Real::INFINITY),
            Vector3::new(0.0, Real::NEG_INFINITY, 1.0),
        );
        assert_eq!(v.pos, Point3::new(0.0, 2.0, 0.0));
        assert_eq!(v.normal, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn interpolate_midpoint() {
        let v1 = Vertex::new(Point3::origin(), Vector3::x());
        let v2 = Vertex::new(Point3::new(2.0, 2.0, 2.0), Vector3::y());
        let v_mid = v1.interpolate(&v2, 0.5);

        approx::assert_relative_eq!(
            v_mid,
            Vertex::new(Point3::new(1.0, 1.0, 1.0), Vector3::new(0.5, 0.5, 0.0))
        );
    }

    #[test]
    fn distance() {
        let v1 = Vertex::new(Point3::new(0.0, 0.0, 0.0), Vector3::x());
        let v2 = Vertex::new(Point3::new(3.0, 4.0, 0.0), Vector3::y());
        assert!((v1.distance_to(&v2) - 5.0).abs() < 1e-12);
    }
}
