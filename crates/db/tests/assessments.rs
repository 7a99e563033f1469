//! Integration tests for the assessment repositories.
//!
//! Exercises the repository layer against a real database:
//! - Assessment creation, versioning, and partial updates
//! - Suggested-unit junction replacement
//! - Exemption upsert semantics
//! - Reassessment request linkage

use innopath_db::models::assessment::{CreateAssessment, UpdateAssessment};
use innopath_db::models::innovation::CreateInnovation;
use innopath_db::models::reassessment::CreateReassessment;
use innopath_db::models::user::CreateUser;
use innopath_db::repositories::{
    AssessmentRepo, InnovationRepo, OrganisationRepo, ReassessmentRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_innovation(pool: &PgPool, name: &str) -> i64 {
    let owner = UserRepo::create(
        pool,
        &CreateUser {
            name: format!("{name} owner"),
            email: format!("{name}-owner@example.com"),
        },
    )
    .await
    .unwrap();

    InnovationRepo::create(
        pool,
        &CreateInnovation {
            name: name.to_string(),
            owner_id: owner.id,
        },
    )
    .await
    .unwrap()
    .id
}

fn first_assessment(innovation_id: i64) -> CreateAssessment {
    CreateAssessment {
        innovation_id,
        major_version: 1,
        minor_version: 0,
        assigned_to_id: None,
        previous_assessment_id: None,
    }
}

// ---------------------------------------------------------------------------
// Test: creation and lookup
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_find_assessment(pool: PgPool) {
    let innovation_id = seed_innovation(&pool, "Create Find").await;

    let mut tx = pool.begin().await.unwrap();
    let created = AssessmentRepo::create(&mut tx, &first_assessment(innovation_id))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(created.major_version, 1);
    assert_eq!(created.minor_version, 0);
    assert!(created.finished_at.is_none());
    assert!(created.exempted_at.is_none());

    let found = AssessmentRepo::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .expect("assessment should exist");
    assert_eq!(found.innovation_id, innovation_id);

    assert!(AssessmentRepo::exists_for_innovation(&pool, innovation_id)
        .await
        .unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_version_rejected(pool: PgPool) {
    let innovation_id = seed_innovation(&pool, "Duplicate Version").await;

    let mut tx = pool.begin().await.unwrap();
    AssessmentRepo::create(&mut tx, &first_assessment(innovation_id))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let mut tx = pool.begin().await.unwrap();
    let result = AssessmentRepo::create(&mut tx, &first_assessment(innovation_id)).await;
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Test: partial update only touches provided fields
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_partial_update_preserves_other_fields(pool: PgPool) {
    let innovation_id = seed_innovation(&pool, "Partial Update").await;

    let mut tx = pool.begin().await.unwrap();
    let assessment = AssessmentRepo::create(&mut tx, &first_assessment(innovation_id))
        .await
        .unwrap();
    AssessmentRepo::update_fields(
        &mut tx,
        assessment.id,
        &UpdateAssessment {
            summary: Some("First pass".to_string()),
            maturity_level: Some("DISCOVERY".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let updated = AssessmentRepo::update_fields(
        &mut tx,
        assessment.id,
        &UpdateAssessment {
            maturity_level: Some("ADVANCED".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(updated.summary.as_deref(), Some("First pass"));
    assert_eq!(updated.maturity_level.as_deref(), Some("ADVANCED"));
}

// ---------------------------------------------------------------------------
// Test: suggested-unit junction replacement
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_suggested_units(pool: PgPool) {
    let innovation_id = seed_innovation(&pool, "Suggestions").await;

    let org = OrganisationRepo::create(&pool, "Health Org", "HO")
        .await
        .unwrap();
    let unit_a = OrganisationRepo::create_unit(&pool, org.id, "North", "N", false)
        .await
        .unwrap();
    let unit_b = OrganisationRepo::create_unit(&pool, org.id, "South", "S", false)
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let assessment = AssessmentRepo::create(&mut tx, &first_assessment(innovation_id))
        .await
        .unwrap();
    AssessmentRepo::replace_suggested_units(&mut tx, assessment.id, &[unit_a.id])
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let ids = AssessmentRepo::suggested_unit_ids(&pool, assessment.id)
        .await
        .unwrap();
    assert_eq!(ids, vec![unit_a.id]);

    let mut tx = pool.begin().await.unwrap();
    AssessmentRepo::replace_suggested_units(&mut tx, assessment.id, &[unit_a.id, unit_b.id])
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let ids = AssessmentRepo::suggested_unit_ids(&pool, assessment.id)
        .await
        .unwrap();
    assert_eq!(ids.len(), 2);

    let rows = OrganisationRepo::unit_rows_for_assessment(&pool, assessment.id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.organisation_id == org.id));
}

// ---------------------------------------------------------------------------
// Test: exemption upsert keeps the first timestamp
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_exemption_upsert_preserves_first_timestamp(pool: PgPool) {
    let innovation_id = seed_innovation(&pool, "Exemption").await;

    let mut tx = pool.begin().await.unwrap();
    let assessment = AssessmentRepo::create(&mut tx, &first_assessment(innovation_id))
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let first = AssessmentRepo::upsert_exemption(&pool, assessment.id, "NO_RESPONSE", None)
        .await
        .unwrap();
    let first_at = first.exempted_at.expect("exempted_at should be set");

    let second = AssessmentRepo::upsert_exemption(
        &pool,
        assessment.id,
        "TECHNICAL_ISSUES",
        Some("innovator unreachable"),
    )
    .await
    .unwrap();

    assert_eq!(second.exempted_reason.as_deref(), Some("TECHNICAL_ISSUES"));
    assert_eq!(
        second.exempted_message.as_deref(),
        Some("innovator unreachable")
    );
    assert_eq!(second.exempted_at, Some(first_at));
}

// ---------------------------------------------------------------------------
// Test: reassessment request linkage
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reassessment_request_links_assessments(pool: PgPool) {
    let innovation_id = seed_innovation(&pool, "Reassessment Link").await;

    let mut tx = pool.begin().await.unwrap();
    let original = AssessmentRepo::create(&mut tx, &first_assessment(innovation_id))
        .await
        .unwrap();
    let follow_up = AssessmentRepo::create(
        &mut tx,
        &CreateAssessment {
            innovation_id,
            major_version: 2,
            minor_version: 0,
            assigned_to_id: None,
            previous_assessment_id: Some(original.id),
        },
    )
    .await
    .unwrap();

    let request = ReassessmentRepo::create(
        &mut tx,
        innovation_id,
        follow_up.id,
        original.id,
        &CreateReassessment {
            reasons: vec!["NEW_EVIDENCE".to_string()],
            other_reason_description: None,
            description: "New clinical evidence available".to_string(),
            what_support_do_you_need: None,
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(request.assessment_id, follow_up.id);
    assert_eq!(request.previous_assessment_id, original.id);

    let found = ReassessmentRepo::find_by_assessment(&pool, follow_up.id)
        .await
        .unwrap()
        .expect("request should exist");
    assert_eq!(found.id, request.id);

    let latest = AssessmentRepo::latest_for_innovation(&pool, innovation_id)
        .await
        .unwrap()
        .expect("latest should exist");
    assert_eq!(latest.id, follow_up.id);
}

// ---------------------------------------------------------------------------
// Test: finished list ordering
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_finished_excludes_unfinished(pool: PgPool) {
    let innovation_id = seed_innovation(&pool, "Finished List").await;

    let mut tx = pool.begin().await.unwrap();
    let finished = AssessmentRepo::create(&mut tx, &first_assessment(innovation_id))
        .await
        .unwrap();
    AssessmentRepo::set_finished(&mut tx, finished.id).await.unwrap();

    AssessmentRepo::create(
        &mut tx,
        &CreateAssessment {
            innovation_id,
            major_version: 2,
            minor_version: 0,
            assigned_to_id: None,
            previous_assessment_id: Some(finished.id),
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let listed = AssessmentRepo::list_finished(&pool, innovation_id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, finished.id);
}
