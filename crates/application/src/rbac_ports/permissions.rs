/// Input payload for creating a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Unique permission name, conventionally `resource.action`.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional guard namespace; `web` when omitted.
    pub guard_name: Option<String>,
}
