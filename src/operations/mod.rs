pub mod allocation;
pub mod chart;
pub mod cycle;
pub mod export;
pub mod goals;
pub mod ledger;
pub mod mailer;
pub mod report;
