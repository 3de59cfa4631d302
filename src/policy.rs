//! Read-only authorization predicates.
//!
//! Nothing here is cached: responsibility assignments may change between
//! calls, so every check queries the current rows.

use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::models::Employee;
use crate::schema::{employee, organization_responsible, tenders};

pub fn find_employee(conn: &mut PgConnection, username: &str) -> QueryResult<Option<Employee>> {
    employee::table
        .filter(employee::username.eq(username))
        .first(conn)
        .optional()
}

pub fn is_responsible_for_organization(
    conn: &mut PgConnection,
    user_id: Uuid,
    organization_id: Uuid,
) -> QueryResult<bool> {
    diesel::select(exists(
        organization_responsible::table
            .filter(organization_responsible::user_id.eq(user_id))
            .filter(organization_responsible::organization_id.eq(organization_id)),
    ))
    .get_result(conn)
}

/// A tender has no author column; any user responsible for the owning
/// organization counts as its author.
pub fn is_author_of_tender(
    conn: &mut PgConnection,
    tender_id: Uuid,
    user_id: Uuid,
) -> QueryResult<bool> {
    diesel::select(exists(
        tenders::table
            .inner_join(
                organization_responsible::table
                    .on(organization_responsible::organization_id.eq(tenders::organization_id)),
            )
            .filter(tenders::id.eq(tender_id))
            .filter(organization_responsible::user_id.eq(user_id)),
    ))
    .get_result(conn)
}

pub fn responsible_organization_ids(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> QueryResult<Vec<Uuid>> {
    organization_responsible::table
        .filter(organization_responsible::user_id.eq(user_id))
        .select(organization_responsible::organization_id)
        .load(conn)
}
