//! Incentives, savings, and return metrics.

pub mod cashflow;
pub mod model;
pub mod rates;

pub use cashflow::{CashFlowYear, IrrSolution, IrrStatus, discounted_cash_flows, npv, solve_irr};
pub use model::{FinancialResult, Payback, ProjectReturns, analyze_financials, project_returns};
pub use rates::RateContext;
