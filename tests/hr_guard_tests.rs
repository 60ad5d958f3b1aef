//! Domain precondition checks run against an in-memory store, so they need no
//! database. Every rejection must leave the store untouched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use hrms::{
    error::AppResult,
    models::{
        Attendance, AttendanceStatus, ClockRequest, CreateLeaveRequest, Employee, EmployeeStatus,
        LeaveRequest, LeaveStatus, LeaveType, OffboardEmployee, OffboardingReason,
        OffboardingRecord, ProbationEvaluation, ProbationOutcome, ProbationReview,
        RecordAttendance, UpdateLeaveStatus,
    },
    repositories::{AttendanceStore, CareerStore, EmployeeStore, LeaveStore},
    services::{
        check_in_with_guards, check_out_with_guards, complete_probation_with_guards,
        create_leave_request_with_guards, offboard_with_guards, record_attendance_with_guards,
        update_leave_status_with_guards,
    },
};
use uuid::Uuid;

#[derive(Default)]
struct MemoryStore {
    employees: Mutex<HashMap<Uuid, Employee>>,
    attendance: Mutex<HashMap<(Uuid, NaiveDate), Attendance>>,
    leaves: Mutex<HashMap<Uuid, LeaveRequest>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    fn with_employee(status: EmployeeStatus) -> (Self, Uuid) {
        let store = Self::default();
        let id = store.add_employee(status);
        (store, id)
    }

    fn add_employee(&self, status: EmployeeStatus) -> Uuid {
        let id = Uuid::new_v4();
        let employee = Employee {
            id,
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: format!("{id}@example.com"),
            phone: None,
            position: None,
            department_id: None,
            manager_id: None,
            status,
            hire_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.employees.lock().unwrap().insert(id, employee);
        id
    }

    fn add_leave(&self, employee_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        let leave = LeaveRequest {
            id,
            employee_id,
            leave_type: LeaveType::Sick,
            start_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(),
            reason: None,
            status: LeaveStatus::Pending,
            approved_by_id: None,
            approved_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.leaves.lock().unwrap().insert(id, leave);
        id
    }

    fn status_of(&self, id: Uuid) -> EmployeeStatus {
        self.employees.lock().unwrap()[&id].status
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn wrote(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn find_employee(&self, id: Uuid) -> AppResult<Option<Employee>> {
        Ok(self.employees.lock().unwrap().get(&id).cloned())
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn record_attendance(&self, input: &RecordAttendance) -> AppResult<Attendance> {
        self.wrote();
        let row = Attendance {
            id: Uuid::new_v4(),
            employee_id: input.employee_id,
            date: input.date,
            check_in: input.check_in,
            check_out: input.check_out,
            status: input.status.unwrap_or(AttendanceStatus::Present),
            notes: input.notes.clone(),
            created_at: Utc::now(),
        };
        self.attendance
            .lock()
            .unwrap()
            .insert((input.employee_id, input.date), row.clone());
        Ok(row)
    }

    async fn check_in(
        &self,
        employee_id: Uuid,
        at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> AppResult<Attendance> {
        self.wrote();
        let mut rows = self.attendance.lock().unwrap();
        let row = rows
            .entry((employee_id, at.date_naive()))
            .or_insert_with(|| Attendance {
                id: Uuid::new_v4(),
                employee_id,
                date: at.date_naive(),
                check_in: None,
                check_out: None,
                status: AttendanceStatus::Present,
                notes: None,
                created_at: Utc::now(),
            });
        row.check_in.get_or_insert(at);
        if let Some(notes) = notes {
            row.notes = Some(notes.to_string());
        }
        Ok(row.clone())
    }

    async fn check_out(
        &self,
        employee_id: Uuid,
        at: DateTime<Utc>,
        _notes: Option<&str>,
    ) -> AppResult<Option<Attendance>> {
        let mut rows = self.attendance.lock().unwrap();
        match rows.get_mut(&(employee_id, at.date_naive())) {
            Some(row) if row.check_in.is_some() => {
                self.wrote();
                row.check_out = Some(at);
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl LeaveStore for MemoryStore {
    async fn create_leave_request(&self, input: &CreateLeaveRequest) -> AppResult<LeaveRequest> {
        self.wrote();
        let leave = LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: input.employee_id,
            leave_type: input.leave_type,
            start_date: input.start_date,
            end_date: input.end_date,
            reason: input.reason.clone(),
            status: LeaveStatus::Pending,
            approved_by_id: None,
            approved_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.leaves.lock().unwrap().insert(leave.id, leave.clone());
        Ok(leave)
    }

    async fn update_leave_status(
        &self,
        id: Uuid,
        status: LeaveStatus,
        approved_by_id: Option<Uuid>,
    ) -> AppResult<Option<LeaveRequest>> {
        let mut leaves = self.leaves.lock().unwrap();
        let Some(leave) = leaves.get_mut(&id) else {
            return Ok(None);
        };
        self.wrote();
        leave.status = status;
        leave.approved_by_id = approved_by_id;
        leave.approved_at = (status == LeaveStatus::Approved).then(Utc::now);
        Ok(Some(leave.clone()))
    }
}

#[async_trait]
impl CareerStore for MemoryStore {
    async fn complete_probation(
        &self,
        employee_id: Uuid,
        new_status: EmployeeStatus,
        review: &ProbationReview,
    ) -> AppResult<ProbationEvaluation> {
        self.wrote();
        if let Some(employee) = self.employees.lock().unwrap().get_mut(&employee_id) {
            employee.status = new_status;
        }
        Ok(ProbationEvaluation {
            id: Uuid::new_v4(),
            employee_id,
            outcome: review.outcome,
            evaluator_id: review.evaluator_id,
            comments: review.comments.clone(),
            extended_until: review.extended_until,
            created_at: Utc::now(),
        })
    }

    async fn offboard(
        &self,
        employee_id: Uuid,
        new_status: EmployeeStatus,
        input: &OffboardEmployee,
    ) -> AppResult<OffboardingRecord> {
        self.wrote();
        if let Some(employee) = self.employees.lock().unwrap().get_mut(&employee_id) {
            employee.status = new_status;
        }
        Ok(OffboardingRecord {
            id: Uuid::new_v4(),
            employee_id,
            reason: input.reason,
            last_working_day: input.last_working_day,
            notes: input.notes.clone(),
            created_at: Utc::now(),
        })
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn manual_entry(employee_id: Uuid) -> RecordAttendance {
    RecordAttendance {
        employee_id,
        date: day(2024, 5, 2),
        check_in: None,
        check_out: None,
        status: None,
        notes: None,
    }
}

fn clock(employee_id: Uuid) -> ClockRequest {
    ClockRequest {
        employee_id,
        notes: None,
    }
}

fn leave_for(employee_id: Uuid, start: NaiveDate, end: NaiveDate) -> CreateLeaveRequest {
    CreateLeaveRequest {
        employee_id,
        leave_type: LeaveType::Annual,
        start_date: start,
        end_date: end,
        reason: None,
    }
}

fn review(outcome: ProbationOutcome, extended_until: Option<NaiveDate>) -> ProbationReview {
    ProbationReview {
        outcome,
        evaluator_id: None,
        comments: None,
        extended_until,
    }
}

fn offboarding(reason: OffboardingReason) -> OffboardEmployee {
    OffboardEmployee {
        reason,
        last_working_day: day(2024, 9, 30),
        notes: None,
    }
}

// ============================================================================
// Attendance
// ============================================================================

#[tokio::test]
async fn test_record_attendance_unknown_employee() {
    let store = MemoryStore::default();

    let err = record_attendance_with_guards(&store, &manual_entry(Uuid::new_v4()))
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(err.code(), "EMPLOYEE_NOT_FOUND");
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn test_attendance_blocked_for_terminated_and_inactive() {
    for status in [EmployeeStatus::Terminated, EmployeeStatus::Inactive] {
        let (store, id) = MemoryStore::with_employee(status);

        let err = record_attendance_with_guards(&store, &manual_entry(id))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "EMPLOYEE_INACTIVE");

        let err = check_in_with_guards(&store, &clock(id)).await.unwrap_err();
        assert_eq!(err.code(), "EMPLOYEE_INACTIVE");

        assert_eq!(store.writes(), 0, "{status:?}");
    }
}

#[tokio::test]
async fn test_attendance_allowed_on_probation_and_after_resignation() {
    for status in [
        EmployeeStatus::Active,
        EmployeeStatus::Probation,
        EmployeeStatus::Resigned,
    ] {
        let (store, id) = MemoryStore::with_employee(status);
        let row = record_attendance_with_guards(&store, &manual_entry(id))
            .await
            .unwrap();
        assert_eq!(row.status, AttendanceStatus::Present);
        assert_eq!(store.writes(), 1);
    }
}

#[tokio::test]
async fn test_record_attendance_rejects_reversed_times() {
    let (store, id) = MemoryStore::with_employee(EmployeeStatus::Active);
    let now = Utc::now();
    let entry = RecordAttendance {
        check_in: Some(now),
        check_out: Some(now - Duration::hours(1)),
        ..manual_entry(id)
    };

    let err = record_attendance_with_guards(&store, &entry).await.unwrap_err();

    assert_eq!(err.code(), "INVALID_TIME_RANGE");
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn test_check_out_requires_check_in() {
    let (store, id) = MemoryStore::with_employee(EmployeeStatus::Active);

    let err = check_out_with_guards(&store, &clock(id)).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(err.code(), "ATTENDANCE_NOT_FOUND");

    check_in_with_guards(&store, &clock(id)).await.unwrap();
    let row = check_out_with_guards(&store, &clock(id)).await.unwrap();
    assert!(row.check_in.is_some() && row.check_out.is_some());
}

#[tokio::test]
async fn test_check_out_skips_status_check() {
    let (store, id) = MemoryStore::with_employee(EmployeeStatus::Active);
    check_in_with_guards(&store, &clock(id)).await.unwrap();

    store.employees.lock().unwrap().get_mut(&id).unwrap().status = EmployeeStatus::Terminated;

    let row = check_out_with_guards(&store, &clock(id)).await.unwrap();
    assert!(row.check_out.is_some());
}

#[tokio::test]
async fn test_check_out_unknown_employee() {
    let store = MemoryStore::default();
    let err = check_out_with_guards(&store, &clock(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "EMPLOYEE_NOT_FOUND");
}

// ============================================================================
// Leave
// ============================================================================

#[tokio::test]
async fn test_leave_request_guards() {
    let store = MemoryStore::default();
    let err = create_leave_request_with_guards(
        &store,
        &leave_for(Uuid::new_v4(), day(2024, 7, 1), day(2024, 7, 2)),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "EMPLOYEE_NOT_FOUND");

    let id = store.add_employee(EmployeeStatus::Active);
    let err = create_leave_request_with_guards(&store, &leave_for(id, day(2024, 7, 2), day(2024, 7, 1)))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.code(), "INVALID_DATE_RANGE");
    assert_eq!(store.writes(), 0);

    // Single-day leave is a valid range
    let leave = create_leave_request_with_guards(&store, &leave_for(id, day(2024, 7, 1), day(2024, 7, 1)))
        .await
        .unwrap();
    assert_eq!(leave.status, LeaveStatus::Pending);
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn test_approval_requires_approver() {
    let (store, id) = MemoryStore::with_employee(EmployeeStatus::Active);
    let leave_id = store.add_leave(id);

    let input = UpdateLeaveStatus {
        status: LeaveStatus::Approved,
        approved_by_id: None,
    };
    let err = update_leave_status_with_guards(&store, leave_id, &input)
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.code(), "APPROVER_REQUIRED");
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn test_approver_must_exist() {
    let (store, id) = MemoryStore::with_employee(EmployeeStatus::Active);
    let leave_id = store.add_leave(id);

    let input = UpdateLeaveStatus {
        status: LeaveStatus::Approved,
        approved_by_id: Some(Uuid::new_v4()),
    };
    let err = update_leave_status_with_guards(&store, leave_id, &input)
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(err.code(), "APPROVER_NOT_FOUND");
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn test_approver_checked_before_leave_lookup() {
    let store = MemoryStore::default();
    let input = UpdateLeaveStatus {
        status: LeaveStatus::Approved,
        approved_by_id: None,
    };

    let err = update_leave_status_with_guards(&store, Uuid::new_v4(), &input)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "APPROVER_REQUIRED");

    let approver = store.add_employee(EmployeeStatus::Active);
    let input = UpdateLeaveStatus {
        status: LeaveStatus::Approved,
        approved_by_id: Some(approver),
    };
    let err = update_leave_status_with_guards(&store, Uuid::new_v4(), &input)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "LEAVE_NOT_FOUND");
}

#[tokio::test]
async fn test_approval_and_rejection() {
    let (store, id) = MemoryStore::with_employee(EmployeeStatus::Active);
    let approver = store.add_employee(EmployeeStatus::Active);

    let leave_id = store.add_leave(id);
    let approved = update_leave_status_with_guards(
        &store,
        leave_id,
        &UpdateLeaveStatus {
            status: LeaveStatus::Approved,
            approved_by_id: Some(approver),
        },
    )
    .await
    .unwrap();
    assert_eq!(approved.status, LeaveStatus::Approved);
    assert_eq!(approved.approved_by_id, Some(approver));
    assert!(approved.approved_at.is_some());

    let other_leave = store.add_leave(id);
    let rejected = update_leave_status_with_guards(
        &store,
        other_leave,
        &UpdateLeaveStatus {
            status: LeaveStatus::Rejected,
            approved_by_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(rejected.status, LeaveStatus::Rejected);
    assert!(rejected.approved_at.is_none());
}

// ============================================================================
// Career
// ============================================================================

#[tokio::test]
async fn test_probation_outcome_sets_status() {
    for (outcome, expected) in [
        (ProbationOutcome::Passed, EmployeeStatus::Active),
        (ProbationOutcome::Failed, EmployeeStatus::Terminated),
    ] {
        let (store, id) = MemoryStore::with_employee(EmployeeStatus::Probation);
        complete_probation_with_guards(&store, id, &review(outcome, None))
            .await
            .unwrap();
        assert_eq!(store.status_of(id), expected);
    }
}

#[tokio::test]
async fn test_probation_extension_needs_future_date() {
    let (store, id) = MemoryStore::with_employee(EmployeeStatus::Probation);
    let today = Utc::now().date_naive();

    for until in [None, Some(today), Some(today - Duration::days(3))] {
        let err = complete_probation_with_guards(&store, id, &review(ProbationOutcome::Extended, until))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_DATE_RANGE", "{until:?}");
    }
    assert_eq!(store.writes(), 0);

    let until = today + Duration::days(30);
    let evaluation =
        complete_probation_with_guards(&store, id, &review(ProbationOutcome::Extended, Some(until)))
            .await
            .unwrap();
    assert_eq!(evaluation.extended_until, Some(until));
    assert_eq!(store.status_of(id), EmployeeStatus::Probation);
}

#[tokio::test]
async fn test_probation_requires_probation_status() {
    let (store, id) = MemoryStore::with_employee(EmployeeStatus::Active);

    let err = complete_probation_with_guards(&store, id, &review(ProbationOutcome::Passed, None))
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.code(), "EMPLOYEE_NOT_ON_PROBATION");
    assert_eq!(store.writes(), 0);

    let err = complete_probation_with_guards(
        &store,
        Uuid::new_v4(),
        &review(ProbationOutcome::Passed, None),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "EMPLOYEE_NOT_FOUND");
}

#[tokio::test]
async fn test_offboarding() {
    let (store, id) = MemoryStore::with_employee(EmployeeStatus::Active);

    let record = offboard_with_guards(&store, id, &offboarding(OffboardingReason::Resignation))
        .await
        .unwrap();
    assert_eq!(record.reason, OffboardingReason::Resignation);
    assert_eq!(store.status_of(id), EmployeeStatus::Resigned);

    let err = offboard_with_guards(&store, id, &offboarding(OffboardingReason::Termination))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.code(), "EMPLOYEE_ALREADY_OFFBOARDED");
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn test_termination_from_probation() {
    let (store, id) = MemoryStore::with_employee(EmployeeStatus::Probation);

    offboard_with_guards(&store, id, &offboarding(OffboardingReason::Termination))
        .await
        .unwrap();

    assert_eq!(store.status_of(id), EmployeeStatus::Terminated);
}
