//! Standard chart for each estimator.

use super::{linspace, Chart, Color, Stroke};
use crate::domains::antithetic::ConvergencePoint;
use crate::domains::conditional::ConditionalRun;
use crate::domains::control::ControlRun;
use crate::domains::exponential::Exponential;
use crate::domains::stratified::StratifiedRun;

/// Points on the theoretical density curve.
const PDF_POINTS: usize = 1_000;

/// Estimate against sample size on a log axis, with `1/λ` for reference.
#[must_use]
pub fn antithetic_chart(points: &[ConvergencePoint], dist: &Exponential) -> Chart {
    let series = points
        .iter()
        .map(|p| (p.samples as f64, p.estimate))
        .collect();
    Chart::new("Convergence of the expected value with antithetic variates")
        .x_label("Sample size (log scale)")
        .y_label("Estimated expected value")
        .log_x()
        .grid()
        .line("Antithetic estimate", series, Color::BLUE, Stroke::Solid, true)
        .hrule(
            format!("Theoretical expected value ({})", dist.mean()),
            dist.mean(),
            Color::RED,
        )
}

/// Overlaid density histograms of the draws and the control.
#[must_use]
pub fn control_chart(run: &ControlRun) -> Chart {
    Chart::new("Histogram of simulations and control variable")
        .x_label("Value")
        .y_label("Density")
        .histogram("Simulations", run.simulations.clone(), 30, Color::BLUE.with_alpha(0.5))
        .histogram("Control variable", run.controls.clone(), 30, Color::RED.with_alpha(0.5))
}

/// Histogram of all stratified draws with the exponential density on top.
#[must_use]
pub fn stratified_chart(run: &StratifiedRun, dist: &Exponential) -> Chart {
    let samples = run.combined();
    let max = samples.iter().copied().fold(0.0_f64, f64::max);
    let curve = linspace(0.0, max, PDF_POINTS)
        .into_iter()
        .map(|x| (x, dist.pdf(x)))
        .collect();

    Chart::new("Stratified simulations vs. theoretical exponential distribution")
        .x_label("Value")
        .y_label("Density")
        .histogram("Stratified simulations", samples, 50, Color::BLUE.with_alpha(0.7))
        .line(
            "Theoretical exponential density",
            curve,
            Color::RED,
            Stroke::Solid,
            false,
        )
}

/// Histogram of the products `XY` with the threshold marked.
#[must_use]
pub fn conditional_chart(run: &ConditionalRun) -> Chart {
    Chart::new("Histogram of the product XY")
        .x_label("Product XY")
        .y_label("Density")
        .histogram("Product XY", run.products.clone(), 50, Color::BLUE.with_alpha(0.7))
        .vrule(format!("XY={}", run.threshold), run.threshold, Color::RED)
}
