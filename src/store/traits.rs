use crate::core::member::{Member, MemberId};
use crate::store::Result;

/// Read access to the member records owned by the data layer.
pub trait MemberRepository: Send + Sync {
    /// Every member, in the order the data layer returns them.
    fn members(&self) -> Result<Vec<Member>>;

    fn member(&self, id: &MemberId) -> Result<Option<Member>> {
        Ok(self.members()?.into_iter().find(|member| &member.id == id))
    }
}
