pub mod amortization;
pub mod waterfall;

pub use amortization::{amortized_payment, AmortizationSchedule, ScheduledPayment};
pub use waterfall::{AmountsDue, PaymentApplication, PaymentComponent, PaymentWaterfall};
