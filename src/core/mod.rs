pub mod member;
pub mod relations;

pub use member::{Gender, Member, MemberId};
pub use relations::{resolve_relatives, Relatives};
