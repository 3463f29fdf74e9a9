/// strategy - compare avalanche and snowball, then try a what-if and a refinance
use loan_projection_rs::{
    refinance_loan, run_what_if, select_strategy, EngineConfig, EventLog, LoanRecord, Money, Rate,
    RefinanceOffer, SafeTimeProvider, ScenarioTarget, TimeSource, WhatIfInput,
};
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    ));
    let config = EngineConfig::default();

    let loans = vec![
        LoanRecord::builder()
            .name("Store card")
            .balance(Money::from_major(900))
            .apr_percent(dec!(29.9))
            .fixed_minimum(Money::from_major(45))
            .build(),
        LoanRecord::builder()
            .name("Personal")
            .balance(Money::from_major(8_000))
            .apr_percent(dec!(11))
            .fixed_minimum(Money::from_major(260))
            .build(),
    ];

    let strategy = select_strategy(&loans, Money::from_major(150), &config, &time)?;
    println!("{}", strategy.to_json());

    let what_if = run_what_if(
        &loans,
        &WhatIfInput::new(ScenarioTarget::All).with_extra_payment(Money::from_major(25)),
        EventLog::default(),
        &config,
        &time,
    )?;
    println!("annual interest change: ${}", what_if.deltas.annual_interest);

    let offer = RefinanceOffer::new(Rate::from_percentage(7), Money::from_major(100), 36);
    let refinance = refinance_loan(&loans[1], &offer, EventLog::default(), &config, &time)?;
    println!(
        "refinance: ${}/month, cost delta ${}, break-even month {:?}",
        refinance.monthly_payment, refinance.total_cost_delta, refinance.break_even_month
    );

    Ok(())
}
