// Array shape generation and the bound checks shared by the array factories.

use std::fmt;

use log::debug;

use crate::errors::{check_argument, InvalidArgument};
use crate::strategies::{integers, lists, BoxedGenerator, Generator};

/// Check that `min_<name>` is at least `floor` and no larger than
/// `max_<name>`. A missing floor means the minimum is unbounded below.
pub fn order_check<T>(name: &str, floor: Option<T>, small: T, large: T) -> Result<(), InvalidArgument>
where
    T: PartialOrd + fmt::Display,
{
    match floor {
        Some(floor) => check_argument(floor <= small && small <= large, || {
            format!(
                "min_{} was {}, must be at least {} and not more than max_{} (was {})",
                name, small, floor, name, large
            )
        }),
        None => check_argument(small <= large, || {
            format!(
                "min_{} was {}, must not be more than max_{} (was {})",
                name, small, name, large
            )
        }),
    }
}

/// Bounds for [`array_shapes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeConfig {
    /// Fewest axes in a shape
    pub min_dims: usize,

    /// Most axes in a shape
    pub max_dims: usize,

    /// Shortest allowed axis
    pub min_side: usize,

    /// Longest allowed axis
    pub max_side: usize,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            min_dims: 1,
            max_dims: 3,
            min_side: 1,
            max_side: 10,
        }
    }
}

/// Shapes with between `min_dims` and `max_dims` axes, each axis between
/// `min_side` and `max_side` long.
pub fn array_shapes(config: ShapeConfig) -> Result<BoxedGenerator<Vec<usize>>, InvalidArgument> {
    order_check("dims", Some(1), config.min_dims, config.max_dims)?;
    order_check("side", Some(1), config.min_side, config.max_side)?;

    debug!(
        "array_shapes: dims in [{}, {}], sides in [{}, {}]",
        config.min_dims, config.max_dims, config.min_side, config.max_side
    );

    let side = integers(config.min_side as i128, config.max_side as i128)?.map(|n| n as usize);
    Ok(lists(side, config.min_dims, config.max_dims)?.boxed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataSource;

    #[test]
    fn test_order_check_accepts_valid_bounds() {
        assert!(order_check("dims", Some(1), 1, 3).is_ok());
        assert!(order_check("dims", Some(1), 2, 2).is_ok());
        assert!(order_check("x", None, -10i64, 5).is_ok());
    }

    #[test]
    fn test_order_check_rejects_inverted_bounds() {
        let err = order_check("dims", Some(1), 4, 2).unwrap_err();
        assert_eq!(
            err.message(),
            "min_dims was 4, must be at least 1 and not more than max_dims (was 2)"
        );
        assert!(order_check("x", None, 3, 2).is_err());
    }

    #[test]
    fn test_order_check_rejects_below_floor() {
        let err = order_check("side", Some(1), 0, 5).unwrap_err();
        assert!(err.message().starts_with("min_side was 0"));
    }

    #[test]
    fn test_default_config() {
        assert_eq!(
            ShapeConfig::default(),
            ShapeConfig {
                min_dims: 1,
                max_dims: 3,
                min_side: 1,
                max_side: 10
            }
        );
    }

    #[test]
    fn test_shapes_stay_in_bounds() {
        let shapes = array_shapes(ShapeConfig::default()).unwrap();
        let mut source = DataSource::from_seed(3);
        for _ in 0..200 {
            let shape = shapes.draw(&mut source).unwrap();
            assert!(!shape.is_empty() && shape.len() <= 3, "{:?}", shape);
            assert!(shape.iter().all(|&n| (1..=10).contains(&n)), "{:?}", shape);
        }
    }

    #[test]
    fn test_fixed_dims() {
        let shapes = array_shapes(ShapeConfig {
            min_dims: 2,
            max_dims: 2,
            min_side: 4,
            max_side: 4,
        })
        .unwrap();
        let mut source = DataSource::from_seed(0);
        assert_eq!(shapes.draw(&mut source).unwrap(), vec![4, 4]);
    }

    #[test]
    fn test_zero_dims_rejected() {
        let config = ShapeConfig {
            min_dims: 0,
            ..ShapeConfig::default()
        };
        assert!(array_shapes(config).is_err());
    }
}
