//! Geometry

#[cfg(test)]
#[macro_export]
macro_rules! prop_range {
    ($name: ident, $t: ty, $r: expr) => {
        prop_compose! {
            fn $name()(f in $r) -> $t {
                f
            }
        }
    };
}

#[cfg(test)]
#[macro_export]
macro_rules! prop_point2 {
    ($name: ident, $t: ty, $xr: expr, $yr: expr) => {
        prop_compose! {
            fn $name()(x in $xr, y in $yr) -> Point2<$t> {
                Point2 { x, y }
            }
        }
    };
}

#[cfg(test)]
#[macro_export]
macro_rules! prop_unit_vector3 {
    ($name: ident) => {
        prop_compose! {
            fn $name()(u in 0.0f32..1.0f32, v in 0.0f32..1.0f32) -> Vector3f {
                let z = 1.0 - 2.0 * u;
                let r = (1.0 - z * z).max(0.0).sqrt();
                let phi = 2.0 * std::f32::consts::PI * v;
                Vector3f::new(r * phi.cos(), r * phi.sin(), z)
            }
        }
    };
}

mod bounds3;
mod frame;
mod point2;
mod point3;
mod ray;
mod vector3;

// Re-export
pub use bounds3::*;
pub use frame::*;
pub use point2::*;
pub use point3::*;
pub use ray::*;
pub use vector3::*;
