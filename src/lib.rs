pub mod balance;
pub mod cadence;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod loan;
pub mod payments;
pub mod portfolio;
pub mod projection;
pub mod scenario;
pub mod strategy;
pub mod types;

// re-export key types
pub use balance::{resolve_balances, ResolvedBalances};
pub use cadence::occurrences_per_month;
pub use config::EngineConfig;
pub use decimal::{Money, Rate};
pub use errors::{EngineError, Result};
pub use events::{EventLog, LoanEvent};
pub use loan::{
    LoanBalanceSource, LoanBuilder, LoanRecord, LoanTerms, MinimumPaymentRule, ProjectionOverride,
    SubscriptionTerms,
};
pub use payments::{amortized_payment, AmortizationSchedule, PaymentWaterfall};
pub use portfolio::{build_portfolio_projection, LoanPortfolioProjection, OverrideMap, PortfolioHorizon};
pub use projection::{
    build_projection_model, simulate_loan, ConsistencyPoint, LoanProjectionModel, ProjectionRow,
    ProjectionSummary, SimulationResult,
};
pub use scenario::{
    analyze_refinance, refinance_loan, run_what_if, LoanRefinanceResult, LoanWhatIfResult,
    RefinanceComparisonPoint, RefinanceOffer, WhatIfDeltas, WhatIfInput,
};
pub use strategy::{select_strategy, LoanStrategyResult, StrategyCandidate};
pub use types::{
    Cadence, CadenceUnit, LoanEventType, LoanId, MinimumPaymentType, ScenarioTarget, StrategyMode,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
