mod dto;
pub mod roles;
pub mod secret;

pub use dto::{CredentialDescriptor, Principal, RoleAssignment, UserInfo};
pub(crate) use dto::UsersInfoReply;
pub use roles::parse_roles;
pub use secret::{Secret, SecretSource};
