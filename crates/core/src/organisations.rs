//! Organisation/unit grouping shared by assessment and notify-me reads.
//!
//! Several read paths load flat unit rows (a unit joined to its parent
//! organisation) and present them as an organisation→units tree. The merge
//! rule is: units sharing an organisation id collapse under one organisation
//! entry, which keeps the metadata of the first row seen for that
//! organisation; organisation and unit order follow first appearance.

use serde::Serialize;

use crate::types::DbId;

/// Flat row joining a unit to its parent organisation.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganisationUnitRow {
    pub organisation_id: DbId,
    pub organisation_name: String,
    pub organisation_acronym: String,
    pub unit_id: DbId,
    pub unit_name: String,
    pub unit_acronym: String,
    pub unit_is_shadow: bool,
}

/// A unit entry inside an [`OrganisationGroup`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitSummary {
    pub id: DbId,
    pub name: String,
    pub acronym: String,
    pub is_shadow: bool,
}

/// One organisation with its grouped units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganisationGroup {
    pub id: DbId,
    pub name: String,
    pub acronym: String,
    pub units: Vec<UnitSummary>,
}

/// Group flat unit rows into an organisation→units tree.
pub fn group_units_by_organisation(rows: &[OrganisationUnitRow]) -> Vec<OrganisationGroup> {
    let mut groups: Vec<OrganisationGroup> = Vec::new();

    for row in rows {
        let unit = UnitSummary {
            id: row.unit_id,
            name: row.unit_name.clone(),
            acronym: row.unit_acronym.clone(),
            is_shadow: row.unit_is_shadow,
        };

        match groups.iter_mut().find(|g| g.id == row.organisation_id) {
            Some(group) => {
                // A unit may appear once per group even if the caller passed
                // duplicate rows (e.g. two subscriptions naming the same unit).
                if !group.units.iter().any(|u| u.id == unit.id) {
                    group.units.push(unit);
                }
            }
            None => groups.push(OrganisationGroup {
                id: row.organisation_id,
                name: row.organisation_name.clone(),
                acronym: row.organisation_acronym.clone(),
                units: vec![unit],
            }),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(org_id: DbId, org_name: &str, unit_id: DbId, unit_name: &str) -> OrganisationUnitRow {
        OrganisationUnitRow {
            organisation_id: org_id,
            organisation_name: org_name.to_string(),
            organisation_acronym: org_name[..1].to_string(),
            unit_id,
            unit_name: unit_name.to_string(),
            unit_acronym: unit_name[..1].to_string(),
            unit_is_shadow: false,
        }
    }

    #[test]
    fn test_units_merge_under_shared_organisation() {
        let rows = vec![row(1, "Alpha", 10, "North"), row(1, "Alpha", 11, "South")];
        let groups = group_units_by_organisation(&rows);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, 1);
        assert_eq!(groups[0].units.len(), 2);
        assert_eq!(groups[0].units[0].id, 10);
        assert_eq!(groups[0].units[1].id, 11);
    }

    #[test]
    fn test_distinct_organisations_stay_separate() {
        let rows = vec![row(1, "Alpha", 10, "North"), row(2, "Beta", 20, "West")];
        let groups = group_units_by_organisation(&rows);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, 1);
        assert_eq!(groups[1].id, 2);
    }

    #[test]
    fn test_first_seen_organisation_metadata_wins() {
        let mut first = row(1, "Alpha", 10, "North");
        first.organisation_acronym = "AL".to_string();
        let mut second = row(1, "Alpha Renamed", 11, "South");
        second.organisation_acronym = "AR".to_string();

        let groups = group_units_by_organisation(&[first, second]);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Alpha");
        assert_eq!(groups[0].acronym, "AL");
    }

    #[test]
    fn test_duplicate_unit_rows_collapse() {
        let rows = vec![row(1, "Alpha", 10, "North"), row(1, "Alpha", 10, "North")];
        let groups = group_units_by_organisation(&rows);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].units.len(), 1);
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(group_units_by_organisation(&[]).is_empty());
    }

    #[test]
    fn test_shadow_flag_carried_through() {
        let mut shadow = row(1, "Alpha", 10, "North");
        shadow.unit_is_shadow = true;
        let groups = group_units_by_organisation(&[shadow]);
        assert!(groups[0].units[0].is_shadow);
    }
}
