// Concurrent payments for one student
//
// Simultaneous payments must serialize on the student's ledger: neither
// may observe the other's half-applied state, and contention beyond the
// retry budget surfaces as a retryable conflict.

#[path = "../helpers/mod.rs"]
mod helpers;

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use helpers::*;
use school_fees::config::AllocationConfig;
use school_fees::core::traits::LedgerStore;
use school_fees::core::AppError;
use school_fees::InMemoryStore;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_payments_against_one_invoice() {
    let school = Arc::new(TestSchool::new());
    let course = school.course("Grade 8").await;
    let student = school.student(course.id, StudentSpec::default()).await;
    let tuition = school.fee_head("Tuition").await;
    school.invoice(student.id, tuition.id, dec!(300)).await;

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let school = school.clone();
            let student_id = student.id;
            tokio::spawn(async move {
                school
                    .services
                    .payments
                    .record_payment(payment(student_id, dec!(200)))
                    .await
            })
        })
        .collect();

    let mut surplus = Decimal::ZERO;
    for handle in handles {
        let outcome = handle.await.unwrap().expect("Payment should succeed");
        surplus += outcome.surplus;
    }

    let invoices = school.invoices_of(student.id).await;
    assert_eq!(invoices[0].paid_amount, dec!(300));
    assert!(invoices[0].is_paid);
    assert_eq!(surplus, dec!(100));
    assert_eq!(school.reload_student(student.id).await.advance_balance, dec!(100));
    assert_ledger_consistent(&school, student.id).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_small_payments_conserve_money() {
    let school = Arc::new(TestSchool::new());
    let course = school.course("Grade 8").await;
    let student = school.student(course.id, StudentSpec::default()).await;
    for (head, amount) in [("Tuition", dec!(120)), ("Library", dec!(45.50)), ("Sports", dec!(60))] {
        let fee_head = school.fee_head(head).await;
        school.invoice(student.id, fee_head.id, amount).await;
    }

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let school = school.clone();
            let student_id = student.id;
            tokio::spawn(async move {
                school
                    .services
                    .payments
                    .record_payment(payment(student_id, dec!(12.25)))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().expect("Payment should succeed");
    }

    // 20 x 12.25 = 245 against 225.50 owed
    let invoices = school.invoices_of(student.id).await;
    assert!(invoices.iter().all(|i| i.is_paid));
    assert_eq!(school.reload_student(student.id).await.advance_balance, dec!(19.50));
    assert_ledger_consistent(&school, student.id).await;
}

#[tokio::test]
async fn test_held_lock_without_retries_is_conflict() {
    let store = InMemoryStore::new(Duration::from_millis(50));
    let school = TestSchool::with_allocation(
        store.clone(),
        AllocationConfig {
            max_retries: 0,
            retry_backoff_ms: 1,
        },
    );
    let course = school.course("Grade 8").await;
    let student = school.student(course.id, StudentSpec::default()).await;

    let _held = store.open(student.id).await.unwrap();
    let result = school
        .services
        .payments
        .record_payment(payment(student.id, dec!(10)))
        .await;

    match result {
        Err(e) => {
            assert!(matches!(e, AppError::ConcurrencyConflict(_)));
            assert!(e.is_retryable());
        }
        Ok(_) => panic!("Payment should not get past a held ledger"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_retry_succeeds_once_lock_released() {
    let store = InMemoryStore::new(Duration::from_millis(50));
    let school = TestSchool::with_allocation(
        store.clone(),
        AllocationConfig {
            max_retries: 5,
            retry_backoff_ms: 20,
        },
    );
    let course = school.course("Grade 8").await;
    let student = school.student(course.id, StudentSpec::default()).await;

    let held = store.open(student.id).await.unwrap();
    let release = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(120)).await;
        drop(held);
    });

    let outcome = school
        .services
        .payments
        .record_payment(payment(student.id, dec!(10)))
        .await
        .expect("Payment should succeed after retrying");
    release.await.unwrap();

    assert_eq!(outcome.surplus, dec!(10));
    assert_eq!(school.reload_student(student.id).await.advance_balance, dec!(10));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_generation_and_payment_serialize() {
    for _ in 0..10 {
        let school = Arc::new(TestSchool::new());
        let course = school.course("Grade 8").await;
        school.charge(course.id, "Tuition", dec!(300)).await;
        school.charge(course.id, "Library", dec!(100)).await;
        let student = school.student(course.id, StudentSpec::default()).await;

        let generate = {
            let school = school.clone();
            tokio::spawn(async move { school.services.generator.for_student(student.id).await })
        };
        let pay = {
            let school = school.clone();
            tokio::spawn(async move {
                school
                    .services
                    .payments
                    .record_payment(payment(student.id, dec!(350)))
                    .await
            })
        };

        let summary = generate.await.unwrap().expect("Generation should succeed");
        let outcome = pay.await.unwrap().expect("Payment should succeed");

        assert_eq!(summary.created, 2);
        assert_eq!(outcome.allocated_total() + outcome.surplus, dec!(350));
        // Either the payment saw both invoices or neither of them
        let advance = school.reload_student(student.id).await.advance_balance;
        assert!(
            advance == Decimal::ZERO || advance == dec!(350),
            "partial advance balance {}",
            advance
        );
        assert_eq!(advance, outcome.surplus);
        assert_eq!(school.invoices_of(student.id).await.len(), 2);
        assert_ledger_consistent(&school, student.id).await;
    }
}
