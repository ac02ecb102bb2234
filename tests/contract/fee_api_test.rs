// Contract tests for the fee HTTP API
//
// Each test runs the full route table over a fresh in-memory school and
// checks status codes and response shapes. Amounts are serialized as
// strings and compared as decimals.

#[path = "../helpers/mod.rs"]
mod helpers;

use std::str::FromStr;

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::{test, App};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use helpers::*;

fn decimal(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("Amount must be a string")).unwrap()
}

macro_rules! app {
    ($school:expr) => {
        test::init_service(App::new().configure(|cfg| $school.services.configure(cfg))).await
    };
}

async fn body<B: MessageBody>(resp: ServiceResponse<B>) -> Value {
    test::read_body_json(resp).await
}

#[actix_web::test]
async fn test_enrolment_generates_invoices() {
    let school = TestSchool::new();
    let course = school.course("Grade 10").await;
    school.charge(course.id, "Tuition", dec!(1500)).await;
    school.charge(course.id, "Hostel", dec!(900)).await;
    let app = app!(school);

    let req = test::TestRequest::post()
        .uri("/students")
        .set_json(json!({
            "course_id": course.id,
            "name": "Meera",
            "uses_hostel": false,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let enrolment = body(resp).await;
    let student_id = enrolment["student"]["id"].as_i64().unwrap();
    assert_eq!(decimal(&enrolment["student"]["advance_balance"]), Decimal::ZERO);
    assert_eq!(enrolment["generation"]["created"], 1);
    assert_eq!(enrolment["generation"]["skipped_not_applicable"], 1);
    assert!(enrolment["generation_error"].is_null());

    let req = test::TestRequest::get()
        .uri(&format!("/students/{}/invoices", student_id))
        .to_request();
    let invoices = body(test::call_service(&app, req).await).await;
    let invoices = invoices.as_array().unwrap();
    assert_eq!(invoices.len(), 1);
    assert_eq!(decimal(&invoices[0]["amount"]), dec!(1500));
    assert_eq!(decimal(&invoices[0]["balance"]), dec!(1500));
    assert_eq!(invoices[0]["state"], "unpaid");
}

#[actix_web::test]
async fn test_enrolment_into_unknown_course() {
    let school = TestSchool::new();
    let app = app!(school);

    let req = test::TestRequest::post()
        .uri("/students")
        .set_json(json!({ "course_id": 404, "name": "Meera" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 404);
    let error = body(resp).await;
    assert_eq!(error["error"]["code"], 404);
    assert_eq!(error["error"]["retryable"], false);
}

#[actix_web::test]
async fn test_payment_allocation_flow() {
    let school = TestSchool::new();
    let course = school.course("Grade 10").await;
    let student = school.student(course.id, StudentSpec::default()).await;
    let tuition = school.fee_head("Tuition").await;
    let exam = school.fee_head("Exam").await;
    school.invoice(student.id, tuition.id, dec!(200)).await;
    school.invoice(student.id, exam.id, dec!(300)).await;
    let app = app!(school);

    let req = test::TestRequest::post()
        .uri("/payments")
        .set_json(json!({
            "student_id": student.id,
            "amount": "250.00",
            "payment_mode": "UPI",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let outcome = body(resp).await;
    let payment_id = outcome["payment"]["id"].as_i64().unwrap();
    assert_eq!(outcome["payment"]["payment_mode"], "UPI");
    let allocations = outcome["allocations"].as_array().unwrap();
    assert_eq!(allocations.len(), 2);
    assert_eq!(decimal(&allocations[0]["amount"]), dec!(200));
    assert_eq!(decimal(&allocations[1]["amount"]), dec!(50));
    assert_eq!(decimal(&outcome["surplus"]), Decimal::ZERO);

    let req = test::TestRequest::get()
        .uri(&format!("/payments/{}", payment_id))
        .to_request();
    let receipt = body(test::call_service(&app, req).await).await;
    assert_eq!(receipt["lines"][0]["fee_head_name"], "Tuition");
    assert_eq!(receipt["lines"][1]["fee_head_name"], "Exam");

    let req = test::TestRequest::get()
        .uri(&format!("/students/{}/outstanding", student.id))
        .to_request();
    let outstanding = body(test::call_service(&app, req).await).await;
    assert_eq!(decimal(&outstanding["outstanding"]), dec!(250));
}

#[actix_web::test]
async fn test_payment_rejects_non_positive_amount() {
    let school = TestSchool::new();
    let course = school.course("Grade 10").await;
    let student = school.student(course.id, StudentSpec::default()).await;
    let app = app!(school);

    for amount in ["0", "-5.00"] {
        let req = test::TestRequest::post()
            .uri("/payments")
            .set_json(json!({ "student_id": student.id, "amount": amount }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "amount {}", amount);
    }

    assert_eq!(school.reload_student(student.id).await.advance_balance, Decimal::ZERO);
}

#[actix_web::test]
async fn test_unknown_payment_and_student() {
    let school = TestSchool::new();
    let app = app!(school);

    for uri in ["/payments/404", "/students/404", "/students/404/outstanding"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404, "{}", uri);
    }
}

#[actix_web::test]
async fn test_duplicate_structure_is_conflict() {
    let school = TestSchool::new();
    let course = school.course("Grade 10").await;
    let tuition = school.fee_head("Tuition").await;
    let app = app!(school);

    let structure = json!({
        "course_id": course.id,
        "fee_head_id": tuition.id,
        "amount": "1000.00",
    });

    let req = test::TestRequest::post()
        .uri("/fee-structures")
        .set_json(&structure)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);

    let req = test::TestRequest::post()
        .uri("/fee-structures")
        .set_json(&structure)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 409);
}

#[actix_web::test]
async fn test_course_generation_endpoint() {
    let school = TestSchool::new();
    let course = school.course("Grade 10").await;
    school.student(course.id, StudentSpec::default()).await;
    school.student(course.id, StudentSpec::default()).await;
    school.charge(course.id, "Tuition", dec!(700)).await;
    let app = app!(school);

    let req = test::TestRequest::post()
        .uri(&format!("/courses/{}/invoices/generate", course.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let summary = body(resp).await;
    assert_eq!(summary["students_processed"], 2);
    assert_eq!(summary["created"], 2);
    assert_eq!(summary["invoice_ids"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::post()
        .uri("/courses/404/invoices/generate")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_web::test]
async fn test_outstanding_report_and_range_validation() {
    let school = TestSchool::new();
    let course = school.course("Grade 10").await;
    school.charge(course.id, "Tuition", dec!(640)).await;
    let student = school.student(course.id, StudentSpec::default()).await;
    school.services.generator.for_student(student.id).await.unwrap();
    let app = app!(school);

    let req = test::TestRequest::get().uri("/reports/outstanding").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let report = body(resp).await;
    assert_eq!(decimal(&report["total_outstanding"]), dec!(640));

    let req = test::TestRequest::get()
        .uri("/reports/expenses?start_date=2026-03-31&end_date=2026-03-01")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_web::test]
async fn test_health() {
    let school = TestSchool::new();
    let app = app!(school);

    let req = test::TestRequest::get().uri("/ready").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);
}
