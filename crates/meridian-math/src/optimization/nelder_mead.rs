//! Nelder-Mead downhill simplex minimization.

use crate::error::{MathError, MathResult};
use crate::optimization::{OptimizationResult, SimplexConfig};

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Minimizes `f` with the Nelder-Mead downhill simplex method.
///
/// Derivative-free, so it tolerates the noisy objective surfaces produced by
/// least-squares smile errors. The initial simplex is built by perturbing
/// each coordinate of `initial` by `config.scale` (absolute when the
/// coordinate is zero).
///
/// # Errors
///
/// Returns an error if `initial` is empty.
///
/// # Example
///
/// ```rust
/// use meridian_math::optimization::{nelder_mead, SimplexConfig};
///
/// // Minimize (x-2)^2 + (y-3)^2
/// let f = |p: &[f64]| (p[0] - 2.0).powi(2) + (p[1] - 3.0).powi(2);
/// let result = nelder_mead(f, &[0.0, 0.0], &SimplexConfig::default()).unwrap();
/// assert!(result.converged);
/// ```
pub fn nelder_mead<F>(f: F, initial: &[f64], config: &SimplexConfig) -> MathResult<OptimizationResult>
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return Err(MathError::invalid_input("empty initial parameter vector"));
    }

    // Build the initial simplex: n+1 vertices
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(initial.to_vec());
    for i in 0..n {
        let mut vertex = initial.to_vec();
        let delta = if vertex[i] == 0.0 {
            config.scale
        } else {
            config.scale * vertex[i].abs()
        };
        vertex[i] += delta;
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| f(v)).collect();

    let mut iterations = 0;
    while iterations < config.max_iterations {
        // Order vertices by function value
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&i, &j| values[i].partial_cmp(&values[j]).unwrap_or(std::cmp::Ordering::Equal));
        let best = order[0];
        let worst = order[n];
        let second_worst = order[n - 1];

        // Convergence on relative function-value spread
        let spread = 2.0 * (values[worst] - values[best]).abs()
            / (values[worst].abs() + values[best].abs() + f64::MIN_POSITIVE);
        if spread < config.tolerance {
            return Ok(OptimizationResult {
                parameters: simplex[best].clone(),
                objective_value: values[best],
                iterations,
                converged: true,
            });
        }

        // Centroid of all vertices except the worst
        let mut centroid = vec![0.0; n];
        for (idx, vertex) in simplex.iter().enumerate() {
            if idx == worst {
                continue;
            }
            for (c, v) in centroid.iter_mut().zip(vertex) {
                *c += v / n as f64;
            }
        }

        let move_from_worst = |coef: f64| -> Vec<f64> {
            centroid
                .iter()
                .zip(&simplex[worst])
                .map(|(c, w)| c + coef * (c - w))
                .collect()
        };

        let reflected = move_from_worst(REFLECTION);
        let f_reflected = f(&reflected);

        if f_reflected < values[best] {
            // Try to go further in the same direction
            let expanded = move_from_worst(EXPANSION);
            let f_expanded = f(&expanded);
            if f_expanded < f_reflected {
                simplex[worst] = expanded;
                values[worst] = f_expanded;
            } else {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            }
        } else if f_reflected < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = f_reflected;
        } else {
            // Contract toward the centroid
            let contracted = move_from_worst(-CONTRACTION);
            let f_contracted = f(&contracted);
            if f_contracted < values[worst] {
                simplex[worst] = contracted;
                values[worst] = f_contracted;
            } else {
                // Shrink everything toward the best vertex
                let best_vertex = simplex[best].clone();
                for (idx, vertex) in simplex.iter_mut().enumerate() {
                    if idx == best {
                        continue;
                    }
                    for (v, b) in vertex.iter_mut().zip(&best_vertex) {
                        *v = b + SHRINK * (*v - b);
                    }
                    values[idx] = f(vertex);
                }
            }
        }

        iterations += 1;
    }

    let best = values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map_or(0, |(i, _)| i);

    Ok(OptimizationResult {
        parameters: simplex[best].clone(),
        objective_value: values[best],
        iterations: config.max_iterations,
        converged: false,
    })
}
