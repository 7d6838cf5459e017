//! Query builder: validated identifiers into a disjunctive case lookup.

use caseflow_db::{CaseCondition, CaseQuery};

/// One condition per supplied identifier, in case id, account, telephone
/// order. `None` when no identifier was supplied; callers report that as
/// not-found without querying.
pub fn build_case_query(
    case_id: Option<i64>,
    account_no: Option<i64>,
    telephone_no: Option<&str>,
) -> Option<CaseQuery> {
    let mut conditions = Vec::with_capacity(3);
    if let Some(id) = case_id {
        conditions.push(CaseCondition::CaseId(id));
    }
    if let Some(account) = account_no {
        conditions.push(CaseCondition::AccountNo(account));
    }
    if let Some(phone) = telephone_no {
        conditions.push(CaseCondition::ProductLabel(phone.to_string()));
    }
    CaseQuery::any_of(conditions)
}
