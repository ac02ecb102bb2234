// Expense and income ledger plus the fee reports

#[path = "../helpers/mod.rs"]
mod helpers;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use helpers::*;
use school_fees::core::AppError;
use school_fees::modules::ledger::models::{RecordExpenseRequest, RecordIncomeRequest};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_expense_report_filters_by_inclusive_range() {
    let school = TestSchool::new();
    let ledger = &school.services.ledger;
    let head = ledger.add_expense_head("Electricity").await.unwrap();

    for (day, amount) in [(1, dec!(100)), (15, dec!(250.75)), (31, dec!(80))] {
        ledger
            .record_expense(RecordExpenseRequest {
                expense_head_id: head.id,
                amount,
                expense_date: date(2026, 3, day),
                description: format!("Bill {}", day),
            })
            .await
            .unwrap();
    }

    let report = school
        .services
        .reports
        .expense_report(date(2026, 3, 1), date(2026, 3, 15))
        .await
        .unwrap();

    assert_eq!(report.expenses.len(), 2);
    assert_eq!(report.total_expense, dec!(350.75));
}

#[tokio::test]
async fn test_expense_needs_known_head_and_positive_amount() {
    let school = TestSchool::new();
    let ledger = &school.services.ledger;

    let unknown = ledger
        .record_expense(RecordExpenseRequest {
            expense_head_id: 404,
            amount: dec!(10),
            expense_date: date(2026, 3, 1),
            description: String::new(),
        })
        .await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));

    let head = ledger.add_expense_head("Repairs").await.unwrap();
    let zero = ledger
        .record_expense(RecordExpenseRequest {
            expense_head_id: head.id,
            amount: Decimal::ZERO,
            expense_date: date(2026, 3, 1),
            description: String::new(),
        })
        .await;
    assert!(matches!(zero, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_income_report() {
    let school = TestSchool::new();
    let ledger = &school.services.ledger;

    for (source, day, amount) in [("Donation", 2, dec!(5000)), ("Canteen", 20, dec!(320))] {
        ledger
            .record_income(RecordIncomeRequest {
                source: source.to_string(),
                amount,
                income_date: date(2026, 4, day),
                description: String::new(),
            })
            .await
            .unwrap();
    }

    let report = school
        .services
        .reports
        .income_report(date(2026, 4, 1), date(2026, 4, 30))
        .await
        .unwrap();

    assert_eq!(report.incomes.len(), 2);
    assert_eq!(report.total_income, dec!(5320));

    let empty = school
        .services
        .reports
        .income_report(date(2026, 5, 1), date(2026, 5, 31))
        .await
        .unwrap();
    assert_eq!(empty.total_income, Decimal::ZERO);
}

#[tokio::test]
async fn test_reversed_range_rejected() {
    let school = TestSchool::new();

    let result = school
        .services
        .reports
        .expense_report(date(2026, 3, 31), date(2026, 3, 1))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_daily_collection_totals_todays_payments() {
    let school = TestSchool::new();
    let course = school.course("Grade 2").await;
    let first = school.student(course.id, StudentSpec::default()).await;
    let second = school.student(course.id, StudentSpec::default()).await;
    let payments = &school.services.payments;
    payments.record_payment(payment(first.id, dec!(100))).await.unwrap();
    payments.record_payment(payment(second.id, dec!(49.99))).await.unwrap();

    let report = school.services.reports.daily_collection(today()).await.unwrap();
    assert_eq!(report.payments.len(), 2);
    assert_eq!(report.total_collection, dec!(149.99));

    let yesterday = school
        .services
        .reports
        .daily_collection(today() - Duration::days(1))
        .await
        .unwrap();
    assert!(yesterday.payments.is_empty());
}

#[tokio::test]
async fn test_outstanding_report_lists_unpaid_balances() {
    let school = TestSchool::new();
    let course = school.course("Grade 2").await;
    school.charge(course.id, "Tuition", dec!(400)).await;
    school.charge(course.id, "Exam", dec!(100)).await;
    let student = school.student(course.id, StudentSpec::default()).await;
    school.services.generator.for_student(student.id).await.unwrap();

    school
        .services
        .payments
        .record_payment(payment(student.id, dec!(450)))
        .await
        .unwrap();

    let report = school.services.reports.outstanding_report().await.unwrap();

    assert_eq!(report.invoices.len(), 1);
    assert_eq!(report.invoices[0].fee_head_name, "Exam");
    assert_eq!(report.invoices[0].balance(), dec!(50));
    assert_eq!(report.total_outstanding, dec!(50));
}
