use crate::core::member::Member;
use crate::store::traits::MemberRepository;
use crate::store::Result;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    members: Vec<Member>,
}

impl MemoryStore {
    pub fn new(members: Vec<Member>) -> Self {
        Self { members }
    }
}

impl MemberRepository for MemoryStore {
    fn members(&self) -> Result<Vec<Member>> {
        Ok(self.members.clone())
    }
}
