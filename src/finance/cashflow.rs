//! Multi-year cash flows, NPV and a Newton–Raphson IRR solve.

use serde::Serialize;

use super::rates::RateContext;

/// Starting point for the IRR iteration.
pub const IRR_INITIAL_GUESS: f64 = 0.10;
/// Iteration cap; the solve always terminates within it.
pub const IRR_MAX_ITERATIONS: u32 = 100;
/// Search interval for the IRR root.
pub const IRR_BOUNDS: (f64, f64) = (-0.99, 1.00);

/// One row of the discounted cash-flow schedule.
///
/// Year 0 carries the up-front outlay as a negative `savings` value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CashFlowYear {
    pub year: u32,
    /// Escalated and degraded savings for the year (USD).
    pub savings: f64,
    pub discount_factor: f64,
    pub discounted_savings: f64,
    /// Running discounted total including the year-0 outlay.
    pub cumulative: f64,
}

/// Builds the year-0..=N discounted schedule.
///
/// Year `t` savings are `annual_savings × (1 + escalation)^(t-1) ×
/// (1 - degradation)^(t-1)`, discounted by `(1 + discount_rate)^t`.
pub fn discounted_cash_flows(
    net_cost: f64,
    annual_savings: f64,
    rates: &RateContext,
) -> Vec<CashFlowYear> {
    let mut rows = Vec::with_capacity(rates.analysis_years as usize + 1);
    rows.push(CashFlowYear {
        year: 0,
        savings: -net_cost,
        discount_factor: 1.0,
        discounted_savings: -net_cost,
        cumulative: -net_cost,
    });

    let growth = (1.0 + rates.escalation_rate) * (1.0 - rates.degradation_rate);
    let mut savings = annual_savings;
    let mut discount_factor = 1.0;
    let mut cumulative = -net_cost;
    for year in 1..=rates.analysis_years {
        discount_factor /= 1.0 + rates.discount_rate;
        let discounted_savings = savings * discount_factor;
        cumulative += discounted_savings;
        rows.push(CashFlowYear {
            year,
            savings,
            discount_factor,
            discounted_savings,
            cumulative,
        });
        savings *= growth;
    }
    rows
}

/// Net present value of a schedule.
pub fn npv(rows: &[CashFlowYear]) -> f64 {
    rows.iter().map(|r| r.discounted_savings).sum()
}

/// Undiscounted flat series: `-net_cost` then `annual_savings` for each year.
pub fn flat_cash_flows(net_cost: f64, annual_savings: f64, years: u32) -> Vec<f64> {
    std::iter::once(-net_cost)
        .chain(std::iter::repeat_n(annual_savings, years as usize))
        .collect()
}

/// How an IRR solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrStatus {
    /// NPV at the reported rate is within tolerance of zero.
    Converged,
    /// Iteration cap reached; best candidate reported.
    NotConverged,
    /// No positive inflow; IRR is 0 by convention and was not solved.
    NoPositiveSavings,
    /// NPV does not change sign inside the bounds; the nearer bound is reported.
    Unbounded,
}

/// IRR result with its convergence state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IrrSolution {
    pub rate: f64,
    pub iterations: u32,
    pub status: IrrStatus,
}

impl IrrSolution {
    pub fn converged(&self) -> bool {
        self.status == IrrStatus::Converged
    }
}

fn npv_and_derivative(cash_flows: &[f64], rate: f64) -> (f64, f64) {
    let one_plus_r = 1.0 + rate;
    let mut npv = 0.0;
    let mut dnpv = 0.0;
    let mut discount = 1.0;
    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        npv += cf / discount;
        if t > 0 {
            dnpv -= t as f64 * cf / (discount * one_plus_r);
        }
    }
    (npv, dnpv)
}

/// Solves `NPV(rate) = 0` by Newton–Raphson, safeguarded by bisection.
///
/// `tolerance` is an absolute NPV bound. The root must change sign across
/// [`IRR_BOUNDS`]; otherwise the bound on the root's side is reported as
/// [`IrrStatus::Unbounded`]. Inside the bounds the solve keeps a sign-change
/// bracket and bisects whenever a Newton step leaves it or |NPV| grows, so a
/// bounded root is always found. If the cap is still hit, the candidate with
/// the smallest |NPV| seen is returned.
pub fn solve_irr(cash_flows: &[f64], tolerance: f64) -> IrrSolution {
    if cash_flows.len() < 2 || !cash_flows.iter().skip(1).any(|cf| *cf > 0.0) {
        return IrrSolution {
            rate: 0.0,
            iterations: 0,
            status: IrrStatus::NoPositiveSavings,
        };
    }

    let (mut lo, mut hi) = IRR_BOUNDS;
    let (npv_lo, _) = npv_and_derivative(cash_flows, lo);
    let (npv_hi, _) = npv_and_derivative(cash_flows, hi);
    if npv_lo.signum() == npv_hi.signum() {
        // No sign change inside the bounds: positive NPV at the top means the
        // root lies above it.
        return IrrSolution {
            rate: if npv_hi > 0.0 { hi } else { lo },
            iterations: 0,
            status: IrrStatus::Unbounded,
        };
    }
    let lo_sign = npv_lo.signum();

    let mut rate = IRR_INITIAL_GUESS.clamp(lo, hi);
    let mut best = (f64::INFINITY, rate);
    let mut last_abs = f64::INFINITY;

    for iteration in 1..=IRR_MAX_ITERATIONS {
        let (npv, dnpv) = npv_and_derivative(cash_flows, rate);
        if npv.abs() < best.0 {
            best = (npv.abs(), rate);
        }
        if npv.abs() < tolerance {
            return IrrSolution {
                rate,
                iterations: iteration,
                status: IrrStatus::Converged,
            };
        }

        if npv.signum() == lo_sign {
            lo = rate;
        } else {
            hi = rate;
        }

        let newton = rate - npv / dnpv;
        let newton_ok = dnpv.is_finite()
            && dnpv != 0.0
            && newton > lo
            && newton < hi
            && npv.abs() <= last_abs;
        last_abs = npv.abs();
        rate = if newton_ok { newton } else { 0.5 * (lo + hi) };
    }

    IrrSolution {
        rate: best.1,
        iterations: IRR_MAX_ITERATIONS,
        status: IrrStatus::NotConverged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn npv_without_growth_matches_annuity() {
        let rates = RateContext {
            escalation_rate: 0.0,
            degradation_rate: 0.0,
            analysis_years: 10,
            discount_rate: 0.08,
            ..RateContext::default()
        };
        let rows = discounted_cash_flows(1000.0, 200.0, &rates);
        let annuity = 200.0 * (1.0 - 1.08_f64.powi(-10)) / 0.08;
        assert_eq!(rows.len(), 11);
        assert!((npv(&rows) - (annuity - 1000.0)).abs() < 1e-6);
        assert!((rows[10].cumulative - npv(&rows)).abs() < 1e-6);
    }

    #[test]
    fn escalation_and_degradation_compound_together() {
        let rates = RateContext::default();
        let rows = discounted_cash_flows(0.0, 100.0, &rates);
        let growth = 1.025 * 0.98;
        assert_eq!(rows[1].savings, 100.0);
        assert!((rows[3].savings - 100.0 * growth * growth).abs() < 1e-9);
    }

    #[test]
    fn two_year_irr_matches_closed_form() {
        // 60x^2 + 60x - 100 = 0 with x = 1/(1+r)
        let x = (-60.0 + (3600.0_f64 + 24_000.0).sqrt()) / 120.0;
        let expected = 1.0 / x - 1.0;
        let s = solve_irr(&[-100.0, 60.0, 60.0], 1e-9);
        assert!(s.converged());
        assert!((s.rate - expected).abs() < 1e-6);
    }

    #[test]
    fn irr_zeroes_npv_within_tolerance() {
        let flows = flat_cash_flows(1_000_000.0, 150_000.0, 25);
        let s = solve_irr(&flows, 1.0);
        assert!(s.converged());
        assert!(s.iterations <= IRR_MAX_ITERATIONS);
        let (npv, _) = npv_and_derivative(&flows, s.rate);
        assert!(npv.abs() < 1.0);
    }

    #[test]
    fn no_positive_savings_is_not_solved() {
        let s = solve_irr(&flat_cash_flows(500_000.0, 0.0, 25), 1.0);
        assert_eq!(s.status, IrrStatus::NoPositiveSavings);
        assert_eq!(s.rate, 0.0);
        assert_eq!(s.iterations, 0);
    }

    #[test]
    fn root_above_bound_reports_unbounded() {
        // Savings five times the outlay every year: IRR is ~500%.
        let s = solve_irr(&flat_cash_flows(100.0, 500.0, 25), 1e-6);
        assert_eq!(s.status, IrrStatus::Unbounded);
        assert_eq!(s.rate, IRR_BOUNDS.1);
    }

    #[test]
    fn long_payback_roots_are_found_below_zero() {
        for payback_ratio in [60.0, 100.0, 200.0, 1000.0] {
            let cost = 1_000_000.0;
            let flows = flat_cash_flows(cost, cost / payback_ratio, 25);
            let s = solve_irr(&flows, 1e-6 * cost);
            assert!(s.converged(), "ratio {payback_ratio}: {s:?}");
            assert!(s.rate < 0.0, "ratio {payback_ratio}: rate {}", s.rate);
            let (npv, _) = npv_and_derivative(&flows, s.rate);
            assert!(npv.abs() < 1e-3 * cost, "ratio {payback_ratio}: npv {npv}");
        }
    }

    #[test]
    fn root_below_bound_reports_unbounded() {
        // A single tiny inflow cannot recover the outlay even at -99%.
        let s = solve_irr(&[-1.0e9, 1.0], 1e-6);
        assert_eq!(s.status, IrrStatus::Unbounded);
        assert_eq!(s.rate, IRR_BOUNDS.0);
    }

    #[test]
    fn flat_series_shape() {
        assert_eq!(flat_cash_flows(10.0, 2.0, 3), vec![-10.0, 2.0, 2.0, 2.0]);
    }
}
