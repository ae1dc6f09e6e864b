//! In-memory user repository.
//!
//! Mirrors the SQLite implementation's ordering, id and uniqueness rules so
//! the store behaves the same on either backend. Nothing is persisted.

use crate::model::user::{UserDraft, UserId, UserRecord};
use crate::repo::user_repo::{RepoError, RepoResult, UserRepository};
use std::collections::BTreeMap;

/// Map-backed user repository with a monotonic id counter.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: BTreeMap<UserId, UserRecord>,
    next_id: UserId,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn email_taken_by_other(&self, email: &str, owner: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != owner)
    }

    fn sorted(mut users: Vec<UserRecord>) -> Vec<UserRecord> {
        users.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        users
    }
}

impl UserRepository for InMemoryUserRepository {
    fn insert_user(&mut self, draft: &UserDraft, registered_at: i64) -> RepoResult<UserRecord> {
        if self.email_taken_by_other(&draft.email, None) {
            return Err(RepoError::DuplicateEmail(draft.email.clone()));
        }

        let id = self.next_id;
        self.next_id += 1;

        let user = UserRecord {
            id,
            name: draft.name.clone(),
            age: draft.age,
            email: draft.email.clone(),
            registered_at,
            updated_at: None,
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    fn find_user(&self, id: UserId) -> RepoResult<Option<UserRecord>> {
        Ok(self.users.get(&id).cloned())
    }

    fn list_users(&self) -> RepoResult<Vec<UserRecord>> {
        Ok(Self::sorted(self.users.values().cloned().collect()))
    }

    fn find_users_by_name(&self, fragment: &str) -> RepoResult<Vec<UserRecord>> {
        Ok(Self::sorted(
            self.users
                .values()
                .filter(|user| user.name.contains(fragment))
                .cloned()
                .collect(),
        ))
    }

    fn update_user(
        &mut self,
        id: UserId,
        draft: &UserDraft,
        updated_at: i64,
    ) -> RepoResult<UserRecord> {
        if !self.users.contains_key(&id) {
            return Err(RepoError::NotFound(id));
        }
        if self.email_taken_by_other(&draft.email, Some(id)) {
            return Err(RepoError::DuplicateEmail(draft.email.clone()));
        }

        let user = self.users.get_mut(&id).ok_or(RepoError::NotFound(id))?;
        user.name = draft.name.clone();
        user.age = draft.age;
        user.email = draft.email.clone();
        user.updated_at = Some(updated_at);
        Ok(user.clone())
    }

    fn delete_user(&mut self, id: UserId) -> RepoResult<()> {
        self.users
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound(id))
    }

    fn email_exists(&self, email: &str) -> RepoResult<bool> {
        Ok(self.email_taken_by_other(email, None))
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryUserRepository;
    use crate::model::user::UserDraft;
    use crate::repo::user_repo::{RepoError, UserRepository};

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut repo = InMemoryUserRepository::new();
        let first = repo
            .insert_user(&UserDraft::new("Ana", 30, "ana@x.com"), 1)
            .unwrap();
        repo.delete_user(first.id).unwrap();

        let second = repo
            .insert_user(&UserDraft::new("Bea", 25, "bea@x.com"), 2)
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[test]
    fn update_keeps_own_email() {
        let mut repo = InMemoryUserRepository::new();
        let user = repo
            .insert_user(&UserDraft::new("Ana", 30, "ana@x.com"), 1)
            .unwrap();

        let updated = repo
            .update_user(user.id, &UserDraft::new("Ana Silva", 31, "ana@x.com"), 5)
            .unwrap();
        assert_eq!(updated.updated_at, Some(5));
        assert_eq!(updated.registered_at, 1);
    }

    #[test]
    fn delete_missing_reports_not_found() {
        let mut repo = InMemoryUserRepository::new();
        assert!(matches!(repo.delete_user(9), Err(RepoError::NotFound(9))));
    }
}
