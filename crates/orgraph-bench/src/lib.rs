//! Synthetic organizations for the benchmarks.

use orgraph_api::{DivisionDto, FunctionalRelationDto, Record, StaffDto};

/// A business view with `divisions` divisions in a two-level tree, each with
/// `staff_per_division` employees reporting to the first one, plus one
/// project relation per division.
pub fn synthetic_organization(
    divisions: usize,
    staff_per_division: usize,
) -> (Vec<Record>, Vec<FunctionalRelationDto>) {
    let mut records = Vec::new();
    let mut relations = Vec::new();
    let mut next_staff = 10_000_i64;

    for d in 0..divisions as i64 {
        let id = d + 1;
        records.push(Record::Division(DivisionDto {
            id,
            name: format!("Division {id}"),
            code: None,
            description: None,
            organization_id: Some(1),
            parent_id: (id > 1).then_some(1),
            is_active: true,
        }));

        let head = next_staff;
        for s in 0..staff_per_division as i64 {
            let staff_id = next_staff;
            next_staff += 1;
            records.push(Record::Staff(StaffDto {
                id: staff_id,
                division_id: Some(id),
                organization_id: Some(1),
                manager_id: (s > 0).then_some(head),
                ..StaffDto::from_display_name(&format!("Employee{staff_id} Test"))
            }));
        }

        if staff_per_division > 1 {
            relations.push(FunctionalRelationDto {
                id: 100_000 + id,
                manager_id: head,
                subordinate_id: head + 1,
                relation_type: "PROJECT".to_string(),
                description: None,
                is_active: true,
            });
        }
    }
    (records, relations)
}
