pub mod refinance;
pub mod what_if;

pub use refinance::{
    analyze_refinance, refinance_loan, LoanRefinanceResult, RefinanceComparisonPoint,
    RefinanceOffer,
};
pub use what_if::{run_what_if, LoanWhatIfResult, WhatIfDeltas, WhatIfInput};
