//! Property-based tests for piecewise evaluation.
//!
//! Generates arbitrary sorted bounds with matching slopes and intercepts, and
//! checks clamping, boundary inclusion, determinism, binary complementarity
//! and the shape law.

use approx::assert_abs_diff_eq;
use calibrators::inference::find_piece;
use calibrators::{
    BatchTransform, BinaryAdapter, Parallelism, PiecewiseLinearTransform, PiecewiseParams,
    TransformConfig, Transformer,
};
use ndarray::Array2;
use proptest::collection::vec as prop_vec;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Finite coefficients in a range where f32 arithmetic stays exact enough.
fn arb_coef() -> impl Strategy<Value = f32> {
    -100.0f32..100.0
}

/// Flat parameters for `n_groups` groups of `n_pieces` pieces.
fn arb_flat_params(
    n_groups: usize,
    n_pieces: usize,
) -> impl Strategy<Value = (Vec<f32>, Vec<f32>, Vec<f32>)> {
    let group_bounds = (-50.0f32..50.0, prop_vec(0.0f32..10.0, n_pieces)).prop_map(|(start, steps)| {
        let mut bounds = Vec::with_capacity(steps.len() + 1);
        bounds.push(start);
        for step in steps {
            let last = bounds[bounds.len() - 1];
            bounds.push(last + step);
        }
        bounds
    });
    (
        prop_vec(group_bounds, n_groups),
        prop_vec(arb_coef(), n_groups * n_pieces),
        prop_vec(arb_coef(), n_groups * n_pieces),
    )
        .prop_map(|(bounds, slopes, intercepts)| (bounds.concat(), slopes, intercepts))
}

fn arb_params() -> impl Strategy<Value = PiecewiseParams> {
    (1usize..4, 1usize..8)
        .prop_flat_map(|(g, p)| arb_flat_params(g, p))
        .prop_map(|(b, s, i)| PiecewiseParams::new(b, s, i).expect("generated params are valid"))
}

fn arb_single_group() -> impl Strategy<Value = PiecewiseParams> {
    (1usize..8)
        .prop_flat_map(|p| arb_flat_params(1, p))
        .prop_map(|(b, s, i)| PiecewiseParams::new(b, s, i).expect("generated params are valid"))
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn below_lower_bound_uses_first_piece(params in arb_single_group(), offset in 0.0f32..1e3) {
        let f = params.group(0);
        let expected = f.slopes()[0] * f.lower() + f.intercepts()[0];
        prop_assert_eq!(f.evaluate(f.lower() - offset), expected);
    }

    #[test]
    fn above_upper_bound_uses_last_piece(params in arb_single_group(), offset in 1e-3f32..1e3) {
        let f = params.group(0);
        let last = f.n_pieces() - 1;
        let expected = f.slopes()[last] * f.upper() + f.intercepts()[last];
        prop_assert_eq!(f.evaluate(f.upper() + offset), expected);
    }

    #[test]
    fn internal_bounds_use_lower_piece(params in arb_single_group()) {
        let f = params.group(0);
        for k in 1..f.n_pieces() {
            let x = f.bounds()[k];
            // Skip bounds shared with an earlier bound; the first piece ending there wins.
            if f.bounds()[k - 1] == x {
                continue;
            }
            prop_assert_eq!(find_piece(f.bounds(), x), k - 1);
            let expected = f.slopes()[k - 1] * x + f.intercepts()[k - 1];
            prop_assert_eq!(f.evaluate(x), expected);
            prop_assert_eq!(f.evaluate(x), f.evaluate(x));
        }
    }

    #[test]
    fn interior_values_land_in_their_piece(params in arb_single_group(), t in 0.0f32..1.0) {
        let f = params.group(0);
        let x = f.lower() + t * (f.upper() - f.lower());
        let k = find_piece(f.bounds(), x);
        prop_assert!(k < f.n_pieces());
        if x > f.lower() && x <= f.upper() {
            prop_assert!(f.bounds()[k] < x && x <= f.bounds()[k + 1]);
        }
    }

    #[test]
    fn output_shape_matches_input(params in arb_params(), n_rows in 0usize..40, seed in any::<u32>()) {
        let n_cols = params.n_groups();
        let input = Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
            ((seed as usize + r * 31 + c * 7) % 200) as f32 - 100.0
        });
        let out = Transformer::new(&params).transform(input.view()).unwrap();
        prop_assert_eq!(out.dim(), input.dim());
    }

    #[test]
    fn rebuilding_params_is_idempotent(
        (bounds, slopes, intercepts) in (1usize..4, 1usize..6).prop_flat_map(|(g, p)| arb_flat_params(g, p)),
        x in -100.0f32..100.0,
    ) {
        let build = || {
            let config = TransformConfig::builder()
                .bounds(bounds.clone())
                .slopes(slopes.clone())
                .intercepts(intercepts.clone())
                .build()
                .unwrap();
            PiecewiseLinearTransform::new(config).unwrap()
        };
        let n_cols = bounds.len() - slopes.len();
        let input = Array2::from_elem((3, n_cols), x);
        let a = build().transform(input.view()).unwrap();
        let b = build().transform(input.view()).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn parallel_matches_sequential(params in arb_params(), n_rows in 1usize..300) {
        let n_cols = params.n_groups();
        let input = Array2::from_shape_fn((n_rows, n_cols), |(r, c)| r as f32 * 0.37 - 40.0 + c as f32);
        let seq = Transformer::new(&params).transform(input.view()).unwrap();
        let par = Transformer::new(&params)
            .with_parallelism(Parallelism::Parallel)
            .transform(input.view())
            .unwrap();
        prop_assert_eq!(seq, par);
    }

    #[test]
    fn binary_outputs_stay_complementary(params in arb_single_group(), positives in prop_vec(0.0f32..1.0, 1..50)) {
        let input = Array2::from_shape_fn((positives.len(), 2), |(r, c)| {
            if c == 1 { positives[r] } else { 1.0 - positives[r] }
        });
        let out = BinaryAdapter::new(&params).unwrap().transform(input.view()).unwrap();
        for row in out.rows() {
            assert_abs_diff_eq!(row[0] + row[1], 1.0, epsilon = 1e-3 * row[1].abs().max(1.0));
        }
    }
}
