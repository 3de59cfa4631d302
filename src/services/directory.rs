use diesel::pg::PgConnection;
use diesel::prelude::*;

use super::Pagination;
use crate::error::ServiceResult;
use crate::models::{Employee, Organization, OrganizationRow};
use crate::schema::{employee, organization};

pub fn list_employees(conn: &mut PgConnection, page: Pagination) -> ServiceResult<Vec<Employee>> {
    Ok(employee::table
        .order(employee::username.asc())
        .offset(page.offset())
        .limit(page.limit())
        .load(conn)?)
}

pub fn list_organizations(
    conn: &mut PgConnection,
    page: Pagination,
) -> ServiceResult<Vec<Organization>> {
    organization::table
        .order(organization::name.asc())
        .offset(page.offset())
        .limit(page.limit())
        .load::<OrganizationRow>(conn)?
        .into_iter()
        .map(Organization::try_from)
        .collect()
}
