/// quick start - project a single loan
use loan_projection_rs::{
    build_projection_model, EngineConfig, EventLog, LoanRecord, Money, SafeTimeProvider, TimeSource,
};
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
    ));

    // $1,200 card at 12% paying $100 a month
    let loan = LoanRecord::builder()
        .name("Card")
        .balance(Money::from_major(1_200))
        .apr_percent(dec!(12))
        .fixed_minimum(Money::from_major(100))
        .due_day(15)
        .build();

    let model = build_projection_model(&loan, None, EventLog::default(), &EngineConfig::default(), &time)?;

    println!("next month interest: ${}", model.next_month_interest);
    println!("annual interest: ${}", model.annual_interest);
    match model.payoff_date {
        Some(date) => println!("paid off on {} ({} months)", date, model.payoff_months.unwrap_or(0)),
        None => println!("not paid off within the simulated window"),
    }

    Ok(())
}
