//! Assessment lifecycle engine.
//!
//! Creating, editing, submitting, and exempting needs assessments, plus
//! reassessment chaining. Every multi-step mutation runs in one database
//! transaction with its activity-log writes, so a failed step rolls the
//! whole mutation back; notifier dispatch happens after commit and is
//! fire-and-forget.

use innopath_core::activity::activity_types;
use innopath_core::assessment::{
    added_unit_suggestions, ensure_not_submitted, reassessment_version, removed_unit_suggestions,
    validate_exemption_reason, FIRST_MAJOR_VERSION, FIRST_MINOR_VERSION,
};
use innopath_core::error::CoreError;
use innopath_core::events::EVENT_NEEDS_ASSESSMENT_COMPLETED;
use innopath_core::innovation::{
    reassessment_status_eligible, STATUS_ARCHIVED, STATUS_IN_PROGRESS, STATUS_NEEDS_ASSESSMENT,
    STATUS_WAITING_NEEDS_ASSESSMENT,
};
use innopath_core::organisations::{group_units_by_organisation, OrganisationGroup};
use innopath_core::roles::ROLE_INNOVATOR;
use innopath_core::types::{DbId, Timestamp};
use innopath_db::models::assessment::{
    Assessment, CreateAssessment, UpdateAssessment, UpsertExemptionRequest,
};
use innopath_db::models::innovation::Innovation;
use innopath_db::models::reassessment::CreateReassessment;
use innopath_db::repositories::{
    ActivityLogRepo, AssessmentRepo, InnovationRepo, OrganisationRepo, ReassessmentRepo,
    SupportRepo, UserRepo,
};
use innopath_db::DbPool;
use innopath_events::{DomainEvent, EventBus};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

// ---------------------------------------------------------------------------
// Result DTOs
// ---------------------------------------------------------------------------

/// A referenced user with its resolved display name.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: DbId,
    pub name: String,
}

/// Reassessment context attached to assessments created via reassessment.
#[derive(Debug, Serialize)]
pub struct ReassessmentInfo {
    pub id: DbId,
    pub previous_assessment_id: DbId,
    pub created_at: Timestamp,
    /// Innovation record sections changed since the previous assessment was
    /// finished.
    pub sections_updated_since_previous_assessment: Vec<String>,
}

/// Full assessment read model.
#[derive(Debug, Serialize)]
pub struct AssessmentInfo {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub assigned_to: Option<UserSummary>,
    pub suggested_organisations: Vec<OrganisationGroup>,
    /// Whether this assessment is the innovation's current one.
    pub is_latest: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reassessment: Option<ReassessmentInfo>,
}

/// Bare id reference used in creation results.
#[derive(Debug, Serialize)]
pub struct IdRef {
    pub id: DbId,
}

/// Result of a reassessment request.
#[derive(Debug, Serialize)]
pub struct CreatedReassessment {
    pub assessment: IdRef,
    pub reassessment: IdRef,
}

/// KPI exemption state of an assessment.
#[derive(Debug, Serialize)]
pub struct ExemptionInfo {
    pub is_exempted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exemption: Option<ExemptionDetails>,
}

/// The exemption fields, present when an exemption is set.
#[derive(Debug, Serialize)]
pub struct ExemptionDetails {
    pub reason: String,
    pub message: Option<String>,
    pub exempted_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Load an assessment with its assignee, grouped suggested units, and
/// reassessment context.
pub async fn get_assessment_info(pool: &DbPool, assessment_id: DbId) -> AppResult<AssessmentInfo> {
    let assessment = find_assessment(pool, assessment_id).await?;

    let innovation = find_innovation(pool, assessment.innovation_id).await?;
    let is_latest = innovation.current_assessment_id == Some(assessment.id);

    let assigned_to = match assessment.assigned_to_id {
        Some(user_id) => {
            let names = UserRepo::names_by_ids(pool, &[user_id]).await?;
            names.get(&user_id).map(|name| UserSummary {
                id: user_id,
                name: name.clone(),
            })
        }
        None => None,
    };

    let unit_rows = OrganisationRepo::unit_rows_for_assessment(pool, assessment.id).await?;
    let rows: Vec<_> = unit_rows.into_iter().map(Into::into).collect();
    let suggested_organisations = group_units_by_organisation(&rows);

    let reassessment = match assessment.previous_assessment_id {
        Some(previous_id) => {
            let request = ReassessmentRepo::find_by_assessment(pool, assessment.id).await?;
            match request {
                Some(request) => Some(ReassessmentInfo {
                    id: request.id,
                    previous_assessment_id: previous_id,
                    created_at: request.created_at,
                    sections_updated_since_previous_assessment:
                        sections_updated_since_previous_assessment(pool, &assessment).await?,
                }),
                None => None,
            }
        }
        None => None,
    };

    Ok(AssessmentInfo {
        assessment,
        assigned_to,
        suggested_organisations,
        is_latest,
        reassessment,
    })
}

/// Innovation record sections changed between the previous assessment's
/// finish time and now.
///
/// Returns an empty list when the assessment has no previous assessment or
/// the previous assessment was never finished.
pub async fn sections_updated_since_previous_assessment(
    pool: &DbPool,
    assessment: &Assessment,
) -> AppResult<Vec<String>> {
    let Some(previous_id) = assessment.previous_assessment_id else {
        return Ok(Vec::new());
    };

    let previous = find_assessment(pool, previous_id).await?;
    let Some(finished_at) = previous.finished_at else {
        return Ok(Vec::new());
    };

    let sections =
        InnovationRepo::sections_updated_since(pool, assessment.innovation_id, finished_at).await?;
    Ok(sections)
}

/// All finished assessments of an innovation, ordered by start time.
pub async fn list_assessments(pool: &DbPool, innovation_id: DbId) -> AppResult<Vec<Assessment>> {
    find_innovation(pool, innovation_id).await?;
    let assessments = AssessmentRepo::list_finished(pool, innovation_id).await?;
    Ok(assessments)
}

// ---------------------------------------------------------------------------
// Assessment creation
// ---------------------------------------------------------------------------

/// Start the needs assessment of an innovation.
///
/// Fails with 422 when the innovation already has an assessment. The new
/// assessment is assigned to the calling assessor and becomes the
/// innovation's current assessment.
pub async fn create_assessment(
    pool: &DbPool,
    user: &AuthUser,
    innovation_id: DbId,
    comment: &str,
) -> AppResult<DbId> {
    find_innovation(pool, innovation_id).await?;

    if AssessmentRepo::exists_for_innovation(pool, innovation_id).await? {
        return Err(CoreError::Unprocessable(
            "An assessment already exists for this innovation".to_string(),
        )
        .into());
    }

    let mut tx = pool.begin().await?;

    InnovationRepo::set_status(&mut tx, innovation_id, STATUS_NEEDS_ASSESSMENT).await?;

    let assessment = AssessmentRepo::create(
        &mut tx,
        &CreateAssessment {
            innovation_id,
            major_version: FIRST_MAJOR_VERSION,
            minor_version: FIRST_MINOR_VERSION,
            assigned_to_id: Some(user.user_id),
            previous_assessment_id: None,
        },
    )
    .await?;

    InnovationRepo::set_current_assessment(&mut tx, innovation_id, assessment.id).await?;

    ActivityLogRepo::insert(
        &mut tx,
        innovation_id,
        user.user_id,
        activity_types::NEEDS_ASSESSMENT_START,
        &serde_json::json!({ "comment": comment, "assessment_id": assessment.id }),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        innovation_id,
        assessment_id = assessment.id,
        user_id = user.user_id,
        "Needs assessment started"
    );

    Ok(assessment.id)
}

// ---------------------------------------------------------------------------
// Assessment update / submission
// ---------------------------------------------------------------------------

/// Apply a partial update to an assessment, optionally submitting it.
///
/// A finished assessment rejects all further updates with 422. Submission
/// stamps `finished_at`, moves the innovation to IN_PROGRESS, marks it
/// assessed, and dispatches the completion notification after commit. The
/// suggested-unit set can only grow at submission time.
pub async fn update_assessment(
    pool: &DbPool,
    bus: &EventBus,
    user: &AuthUser,
    innovation_id: DbId,
    assessment_id: DbId,
    data: &UpdateAssessment,
) -> AppResult<Assessment> {
    find_innovation(pool, innovation_id).await?;
    let assessment = find_assessment_for_innovation(pool, assessment_id, innovation_id).await?;

    ensure_not_submitted(assessment.finished_at)?;

    let previous_units = AssessmentRepo::suggested_unit_ids(pool, assessment.id).await?;

    let mut tx = pool.begin().await?;

    let updated = AssessmentRepo::update_fields(&mut tx, assessment.id, data).await?;

    if let Some(new_units) = &data.suggested_organisation_unit_ids {
        if data.is_submission && !removed_unit_suggestions(&previous_units, new_units).is_empty() {
            return Err(CoreError::Conflict(
                "Organisation unit suggestions cannot be removed at submission".to_string(),
            )
            .into());
        }

        let existing = OrganisationRepo::count_existing_units(pool, new_units).await?;
        if existing != new_units.len() as i64 {
            return Err(CoreError::Validation(
                "One or more suggested organisation units do not exist".to_string(),
            )
            .into());
        }

        AssessmentRepo::replace_suggested_units(&mut tx, assessment.id, new_units).await?;

        let added = added_unit_suggestions(&previous_units, new_units);
        if !added.is_empty() {
            ActivityLogRepo::insert(
                &mut tx,
                innovation_id,
                user.user_id,
                activity_types::ORGANISATION_SUGGESTION,
                &serde_json::json!({
                    "assessment_id": assessment.id,
                    "organisation_unit_ids": added,
                }),
            )
            .await?;
        }
    }

    if data.is_submission {
        AssessmentRepo::set_finished(&mut tx, assessment.id).await?;
        InnovationRepo::mark_assessed(&mut tx, innovation_id, STATUS_IN_PROGRESS).await?;

        ActivityLogRepo::insert(
            &mut tx,
            innovation_id,
            user.user_id,
            activity_types::NEEDS_ASSESSMENT_COMPLETED,
            &serde_json::json!({ "assessment_id": assessment.id }),
        )
        .await?;
    } else if assessment.previous_assessment_id.is_some() {
        // A saved-but-unsubmitted reassessment keeps the innovation in the
        // assessment queue.
        InnovationRepo::set_status(&mut tx, innovation_id, STATUS_NEEDS_ASSESSMENT).await?;
    }

    tx.commit().await?;

    if data.is_submission {
        let suggested = data
            .suggested_organisation_unit_ids
            .clone()
            .unwrap_or(previous_units);

        bus.publish(
            DomainEvent::new(EVENT_NEEDS_ASSESSMENT_COMPLETED)
                .with_innovation(innovation_id)
                .with_actor(user.user_id)
                .with_payload(serde_json::json!({
                    "assessment_id": assessment.id,
                    "organisation_unit_ids": suggested,
                })),
        );

        tracing::info!(
            innovation_id,
            assessment_id = assessment.id,
            user_id = user.user_id,
            "Needs assessment submitted"
        );

        // Re-read so the caller sees the stamped finish time.
        return find_assessment(pool, assessment.id).await;
    }

    Ok(updated)
}

// ---------------------------------------------------------------------------
// Reassessment
// ---------------------------------------------------------------------------

/// Request a reassessment of an innovation.
///
/// The innovation must already have a finished assessment. Innovator-side
/// requests (owner or collaborator) additionally require no engaging
/// supports, and an archived innovation only accepts the request from its
/// owner. The new assessment carries the previous evaluation content but
/// none of its completion or exemption metadata.
pub async fn create_reassessment(
    pool: &DbPool,
    user: &AuthUser,
    innovation_id: DbId,
    data: &CreateReassessment,
) -> AppResult<CreatedReassessment> {
    let innovation = find_innovation(pool, innovation_id).await?;

    let previous = AssessmentRepo::latest_for_innovation(pool, innovation_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Assessment",
            id: innovation_id,
        })?;

    if previous.finished_at.is_none() {
        return Err(CoreError::Unprocessable(
            "Cannot request a reassessment before the current assessment is submitted".to_string(),
        )
        .into());
    }

    if user.role == ROLE_INNOVATOR {
        check_innovator_reassessment(pool, user, &innovation).await?;
    } else if !reassessment_status_eligible(&innovation.status) {
        return Err(CoreError::Unprocessable(
            "Cannot request a reassessment in the innovation's current status".to_string(),
        )
        .into());
    }

    let (major, minor) = reassessment_version(previous.major_version);

    let mut tx = pool.begin().await?;

    let assessment = AssessmentRepo::create(
        &mut tx,
        &CreateAssessment {
            innovation_id,
            major_version: major,
            minor_version: minor,
            assigned_to_id: None,
            previous_assessment_id: Some(previous.id),
        },
    )
    .await?;

    // Carry the evaluation content; completion and exemption metadata start
    // empty on the new row.
    AssessmentRepo::update_fields(
        &mut tx,
        assessment.id,
        &UpdateAssessment::from_assessment(&previous),
    )
    .await?;

    InnovationRepo::set_current_assessment(&mut tx, innovation_id, assessment.id).await?;
    InnovationRepo::set_status(&mut tx, innovation_id, STATUS_WAITING_NEEDS_ASSESSMENT).await?;

    let reassessment =
        ReassessmentRepo::create(&mut tx, innovation_id, assessment.id, previous.id, data).await?;

    let reset = SupportRepo::reset_engaging_to_suggested(&mut tx, innovation_id).await?;

    ActivityLogRepo::insert(
        &mut tx,
        innovation_id,
        user.user_id,
        activity_types::NEEDS_REASSESSMENT_REQUESTED,
        &serde_json::json!({
            "assessment_id": assessment.id,
            "previous_assessment_id": previous.id,
            "reasons": data.reasons,
        }),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        innovation_id,
        assessment_id = assessment.id,
        reassessment_id = reassessment.id,
        supports_reset = reset,
        user_id = user.user_id,
        "Reassessment requested"
    );

    Ok(CreatedReassessment {
        assessment: IdRef { id: assessment.id },
        reassessment: IdRef { id: reassessment.id },
    })
}

/// Innovator-side reassessment preconditions.
async fn check_innovator_reassessment(
    pool: &DbPool,
    user: &AuthUser,
    innovation: &Innovation,
) -> AppResult<()> {
    let is_owner = innovation.owner_id == user.user_id;
    let is_collaborator = if is_owner {
        false
    } else {
        InnovationRepo::is_collaborator(pool, innovation.id, user.user_id).await?
    };

    if !is_owner && !is_collaborator {
        return Err(CoreError::Forbidden(
            "Caller is neither the innovation owner nor a collaborator".to_string(),
        )
        .into());
    }

    if innovation.status == STATUS_ARCHIVED && !is_owner {
        return Err(CoreError::Forbidden(
            "Only the owner can request a reassessment of an archived innovation".to_string(),
        )
        .into());
    }

    if !reassessment_status_eligible(&innovation.status) {
        return Err(CoreError::Unprocessable(
            "Cannot request a reassessment in the innovation's current status".to_string(),
        )
        .into());
    }

    if SupportRepo::count_engaging(pool, innovation.id).await? > 0 {
        return Err(CoreError::Unprocessable(
            "Cannot request a reassessment while supports are engaging".to_string(),
        )
        .into());
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Assessor reassignment
// ---------------------------------------------------------------------------

/// Reassign an innovation's assessment to another assessor.
pub async fn update_assessor(
    pool: &DbPool,
    user: &AuthUser,
    innovation_id: DbId,
    assessment_id: DbId,
    new_assessor_id: DbId,
) -> AppResult<UserSummary> {
    find_innovation(pool, innovation_id).await?;
    let assessment = find_assessment_for_innovation(pool, assessment_id, innovation_id).await?;

    let assessor = UserRepo::find_active_assessor(pool, new_assessor_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: new_assessor_id,
        })?;

    let mut tx = pool.begin().await?;
    AssessmentRepo::set_assigned(&mut tx, assessment.id, assessor.id).await?;
    tx.commit().await?;

    tracing::info!(
        innovation_id,
        assessment_id = assessment.id,
        new_assessor_id = assessor.id,
        user_id = user.user_id,
        "Assessment reassigned"
    );

    Ok(UserSummary {
        id: assessor.id,
        name: assessor.name,
    })
}

// ---------------------------------------------------------------------------
// KPI exemption
// ---------------------------------------------------------------------------

/// Create or update the KPI exemption of an assessment.
///
/// `exempted_at` is stamped on the first call and preserved afterwards.
pub async fn upsert_exemption(
    pool: &DbPool,
    user: &AuthUser,
    assessment_id: DbId,
    data: &UpsertExemptionRequest,
) -> AppResult<ExemptionInfo> {
    validate_exemption_reason(&data.reason)?;
    find_assessment(pool, assessment_id).await?;

    let updated = AssessmentRepo::upsert_exemption(
        pool,
        assessment_id,
        &data.reason,
        data.message.as_deref(),
    )
    .await?;

    tracing::info!(
        assessment_id,
        reason = %data.reason,
        user_id = user.user_id,
        "Assessment exemption recorded"
    );

    Ok(exemption_info(&updated))
}

/// Read the KPI exemption state of an assessment.
pub async fn get_exemption(pool: &DbPool, assessment_id: DbId) -> AppResult<ExemptionInfo> {
    let assessment = find_assessment(pool, assessment_id).await?;
    Ok(exemption_info(&assessment))
}

fn exemption_info(assessment: &Assessment) -> ExemptionInfo {
    match (&assessment.exempted_reason, assessment.exempted_at) {
        (Some(reason), Some(exempted_at)) => ExemptionInfo {
            is_exempted: true,
            exemption: Some(ExemptionDetails {
                reason: reason.clone(),
                message: assessment.exempted_message.clone(),
                exempted_at,
            }),
        },
        _ => ExemptionInfo {
            is_exempted: false,
            exemption: None,
        },
    }
}

// ---------------------------------------------------------------------------
// Lookup helpers
// ---------------------------------------------------------------------------

async fn find_innovation(pool: &DbPool, innovation_id: DbId) -> AppResult<Innovation> {
    InnovationRepo::find_by_id(pool, innovation_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Innovation",
                id: innovation_id,
            })
        })
}

async fn find_assessment(pool: &DbPool, assessment_id: DbId) -> AppResult<Assessment> {
    AssessmentRepo::find_by_id(pool, assessment_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Assessment",
                id: assessment_id,
            })
        })
}

async fn find_assessment_for_innovation(
    pool: &DbPool,
    assessment_id: DbId,
    innovation_id: DbId,
) -> AppResult<Assessment> {
    let assessment = find_assessment(pool, assessment_id).await?;
    if assessment.innovation_id != innovation_id {
        return Err(CoreError::NotFound {
            entity: "Assessment",
            id: assessment_id,
        }
        .into());
    }
    Ok(assessment)
}
