use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{money, AppError, Result};
use crate::modules::ledger::models::{Expense, Income};
use crate::modules::payments::models::FeePayment;
use crate::modules::reports::models::{
    DailyCollectionReport, ExpenseReport, IncomeReport, OutstandingLine, OutstandingReport,
};
use crate::modules::reports::services::ReportService;

/// Query parameters for the daily collection report
#[derive(Debug, Deserialize)]
pub struct DailyCollectionQuery {
    /// Format: YYYY-MM-DD, defaults to today
    #[serde(default)]
    pub date: Option<String>,
}

/// Query parameters for date range reports
#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    /// Start of the period (inclusive, format: YYYY-MM-DD)
    pub start_date: String,
    /// End of the period (inclusive, format: YYYY-MM-DD)
    pub end_date: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentLineResponse {
    pub payment_id: i64,
    pub student_id: i64,
    pub amount: String, // Decimal as string for JSON precision
    pub payment_mode: String,
    pub remark: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DailyCollectionResponse {
    pub date: String,
    pub payments: Vec<PaymentLineResponse>,
    pub total_collection: String,
}

#[derive(Debug, Serialize)]
pub struct ExpenseLineResponse {
    pub expense_id: i64,
    pub expense_head_id: i64,
    pub amount: String,
    pub date: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct ExpenseReportResponse {
    pub start_date: String,
    pub end_date: String,
    pub expenses: Vec<ExpenseLineResponse>,
    pub total_expense: String,
}

#[derive(Debug, Serialize)]
pub struct IncomeLineResponse {
    pub income_id: i64,
    pub source: String,
    pub amount: String,
    pub date: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct IncomeReportResponse {
    pub start_date: String,
    pub end_date: String,
    pub incomes: Vec<IncomeLineResponse>,
    pub total_income: String,
}

#[derive(Debug, Serialize)]
pub struct OutstandingLineResponse {
    pub invoice_id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub fee_head: String,
    pub amount: String,
    pub paid_amount: String,
    pub balance: String,
    pub due_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OutstandingReportResponse {
    pub invoices: Vec<OutstandingLineResponse>,
    pub total_outstanding: String,
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl From<FeePayment> for PaymentLineResponse {
    fn from(payment: FeePayment) -> Self {
        Self {
            payment_id: payment.id,
            student_id: payment.student_id,
            amount: money::format_amount(payment.amount),
            payment_mode: payment.payment_mode,
            remark: payment.remark,
        }
    }
}

impl From<DailyCollectionReport> for DailyCollectionResponse {
    fn from(report: DailyCollectionReport) -> Self {
        Self {
            date: format_date(report.date),
            payments: report
                .payments
                .into_iter()
                .map(PaymentLineResponse::from)
                .collect(),
            total_collection: money::format_amount(report.total_collection),
        }
    }
}

impl From<Expense> for ExpenseLineResponse {
    fn from(expense: Expense) -> Self {
        Self {
            expense_id: expense.id,
            expense_head_id: expense.expense_head_id,
            amount: money::format_amount(expense.amount),
            date: format_date(expense.expense_date),
            description: expense.description,
        }
    }
}

impl From<ExpenseReport> for ExpenseReportResponse {
    fn from(report: ExpenseReport) -> Self {
        Self {
            start_date: format_date(report.start_date),
            end_date: format_date(report.end_date),
            expenses: report
                .expenses
                .into_iter()
                .map(ExpenseLineResponse::from)
                .collect(),
            total_expense: money::format_amount(report.total_expense),
        }
    }
}

impl From<Income> for IncomeLineResponse {
    fn from(income: Income) -> Self {
        Self {
            income_id: income.id,
            source: income.source,
            amount: money::format_amount(income.amount),
            date: format_date(income.income_date),
            description: income.description,
        }
    }
}

impl From<IncomeReport> for IncomeReportResponse {
    fn from(report: IncomeReport) -> Self {
        Self {
            start_date: format_date(report.start_date),
            end_date: format_date(report.end_date),
            incomes: report
                .incomes
                .into_iter()
                .map(IncomeLineResponse::from)
                .collect(),
            total_income: money::format_amount(report.total_income),
        }
    }
}

impl From<OutstandingLine> for OutstandingLineResponse {
    fn from(line: OutstandingLine) -> Self {
        Self {
            invoice_id: line.invoice_id,
            student_id: line.student_id,
            balance: money::format_amount(line.balance()),
            student_name: line.student_name,
            fee_head: line.fee_head_name,
            amount: money::format_amount(line.amount),
            paid_amount: money::format_amount(line.paid_amount),
            due_date: line.due_date.map(format_date),
        }
    }
}

impl From<OutstandingReport> for OutstandingReportResponse {
    fn from(report: OutstandingReport) -> Self {
        Self {
            invoices: report
                .invoices
                .into_iter()
                .map(OutstandingLineResponse::from)
                .collect(),
            total_outstanding: money::format_amount(report.total_outstanding),
        }
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::validation(format!(
            "Invalid {} format: '{}'. Expected YYYY-MM-DD",
            field, value
        ))
    })
}

/// GET /reports/daily-collection?date=YYYY-MM-DD
pub async fn daily_collection(
    service: web::Data<Arc<ReportService>>,
    query: web::Query<DailyCollectionQuery>,
) -> Result<HttpResponse> {
    let date = match query.date.as_deref() {
        Some(raw) if !raw.trim().is_empty() => parse_date("date", raw)?,
        _ => Utc::now().date_naive(),
    };

    let report = service.daily_collection(date).await?;
    Ok(HttpResponse::Ok().json(DailyCollectionResponse::from(report)))
}

/// GET /reports/expenses?start_date=...&end_date=...
pub async fn expense_report(
    service: web::Data<Arc<ReportService>>,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse> {
    let start_date = parse_date("start_date", &query.start_date)?;
    let end_date = parse_date("end_date", &query.end_date)?;

    let report = service.expense_report(start_date, end_date).await?;
    Ok(HttpResponse::Ok().json(ExpenseReportResponse::from(report)))
}

/// GET /reports/incomes?start_date=...&end_date=...
pub async fn income_report(
    service: web::Data<Arc<ReportService>>,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse> {
    let start_date = parse_date("start_date", &query.start_date)?;
    let end_date = parse_date("end_date", &query.end_date)?;

    let report = service.income_report(start_date, end_date).await?;
    Ok(HttpResponse::Ok().json(IncomeReportResponse::from(report)))
}

/// GET /reports/outstanding
pub async fn outstanding_report(service: web::Data<Arc<ReportService>>) -> Result<HttpResponse> {
    let report = service.outstanding_report().await?;
    Ok(HttpResponse::Ok().json(OutstandingReportResponse::from(report)))
}

/// Configure routes for reports module
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports")
            .route("/daily-collection", web::get().to(daily_collection))
            .route("/expenses", web::get().to(expense_report))
            .route("/incomes", web::get().to(income_report))
            .route("/outstanding", web::get().to(outstanding_report)),
    );
}
