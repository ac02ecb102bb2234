mod fee_reports;

pub use fee_reports::{
    DailyCollectionReport, ExpenseReport, IncomeReport, OutstandingLine, OutstandingReport,
};
