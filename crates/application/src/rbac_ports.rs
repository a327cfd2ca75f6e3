mod permissions;
mod repositories;
mod roles;
mod subjects;

pub use permissions::CreatePermissionInput;
pub use repositories::{PermissionRepository, RoleRepository, SubjectRepository};
pub use roles::{CreateRoleInput, RoleAssignment, UpdateRoleInput};
pub use subjects::{NewSubject, RegisterSubjectInput};
