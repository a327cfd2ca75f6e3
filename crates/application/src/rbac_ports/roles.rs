use rolegate_core::SubjectId;

/// Input payload for creating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique, case-sensitive role name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional guard namespace; `web` when omitted.
    pub guard_name: Option<String>,
    /// Names of existing permissions to attach.
    pub permission_names: Vec<String>,
}

/// Input payload for updating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// New role name. Always overwritten.
    pub name: String,
    /// New description. `None` leaves the stored value untouched.
    pub description: Option<String>,
    /// Replacement permission set. `None` leaves the stored set untouched,
    /// an empty list clears it.
    pub permission_names: Option<Vec<String>>,
}

/// Assignment projection mapping a subject to a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    /// Subject identifier.
    pub subject_id: SubjectId,
    /// Subject email.
    pub email: String,
    /// Assignment timestamp in RFC3339.
    pub assigned_at: String,
}
