// ============================================================================
// OrgChart Core - Identifier & Version Generator
// File: crates/orgchart-core/src/codegen.rs
// Description: Derived position codes and chart version strings. Pure
//              functions of counts observed at call time; callers must
//              supply counts from a single consistent read.
// ============================================================================

use orgchart_shared::constants::POSITION_CODE_PAD;

/// Next position code within a department: "{department code}-{seq}",
/// zero-padded sequence = existing position count + 1.
pub fn next_position_code(department_code: &str, existing_count: usize) -> String {
    format!(
        "{}-{:0width$}",
        department_code,
        existing_count + 1,
        width = POSITION_CODE_PAD
    )
}

/// Version for a newly created chart:
/// major = approved/revoked chart count + 1, minor = open draft/pending count.
pub fn next_chart_version(approved_or_revoked: usize, draft_or_pending: usize) -> String {
    format!("{}.{}", approved_or_revoked + 1, draft_or_pending)
}

/// Version stamped at approval: minor freezes to 0, fixing that major
/// version as the enforced one.
pub fn frozen_chart_version(approved_or_revoked: usize) -> String {
    format!("{}.0", approved_or_revoked + 1)
}
