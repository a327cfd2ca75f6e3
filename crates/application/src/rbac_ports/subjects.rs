use rolegate_domain::EmailAddress;

/// Input payload for registering a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSubjectInput {
    /// Natural key; validated and lower-cased.
    pub email: String,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Active flag.
    pub is_active: bool,
    /// Superuser flag.
    pub is_superuser: bool,
}

/// Validated subject row handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubject {
    /// Validated email.
    pub email: EmailAddress,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Active flag.
    pub is_active: bool,
    /// Superuser flag.
    pub is_superuser: bool,
}
