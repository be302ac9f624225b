//! User service - validates client queries and orchestrates the repository.
//!
//! Every client-supplied query is checked by the `QueryBuilder` before the
//! repository is called; a rejected query never reaches storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use common::{AppError, AppResult};
use domain::{
    CreateUser, QueryBuilder, QueryPlan, RawConditions, RawQuery, SortDirection, UpdateUser, User,
    MAX_IDS,
};

use crate::repository::UserRepository;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// One page of users.
#[derive(Debug, Clone, PartialEq)]
pub struct UserPage {
    pub items: Vec<User>,
    /// Matching rows across all pages (offset pagination)
    pub total: Option<u64>,
    /// Cursor for the following page (cursor pagination)
    pub next_last_id: Option<u64>,
}

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    async fn create_user(&self, input: CreateUser) -> AppResult<User>;

    async fn get_user(&self, id: u64) -> AppResult<User>;

    async fn update_user(&self, id: u64, changes: UpdateUser) -> AppResult<User>;

    async fn delete_user(&self, id: u64) -> AppResult<()>;

    /// Delete every listed user; returns how many existed
    async fn delete_users(&self, ids: Vec<u64>) -> AppResult<u64>;

    /// Filtered, sorted, paginated list
    async fn list_users(&self, query: RawQuery) -> AppResult<UserPage>;

    /// Users in the order of `ids`; unknown ids are skipped
    async fn list_users_by_ids(&self, ids: Vec<u64>) -> AppResult<Vec<User>>;

    /// Cursor page over the primary key
    async fn list_users_after(
        &self,
        last_id: u64,
        limit: u64,
        direction: SortDirection,
    ) -> AppResult<UserPage>;

    /// First user (lowest id) matching the conditions
    async fn get_user_by_condition(&self, conditions: RawConditions) -> AppResult<User>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    builder: QueryBuilder,
}

impl UserManager {
    pub fn new(repo: Arc<dyn UserRepository>, builder: QueryBuilder) -> Self {
        Self { repo, builder }
    }

    async fn fetch_page(&self, plan: QueryPlan) -> AppResult<UserPage> {
        let items = self.repo.find_page(&plan).await?;

        let total = if plan.counts_total() {
            Some(self.repo.count(plan.filter()).await?)
        } else {
            None
        };

        let ids: Vec<u64> = items.iter().map(|u| u.id).collect();
        let next_last_id = plan.next_last_id(&ids);

        Ok(UserPage {
            items,
            total,
            next_last_id,
        })
    }
}

fn check_ids(ids: &[u64]) -> AppResult<()> {
    if ids.is_empty() {
        return Err(AppError::validation("ids must not be empty"));
    }
    if ids.len() > MAX_IDS {
        return Err(AppError::validation(format!(
            "at most {} ids are allowed",
            MAX_IDS
        )));
    }
    Ok(())
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(&self, input: CreateUser) -> AppResult<User> {
        if self.repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::conflict("Email"));
        }

        let user = self.repo.create(input).await?;
        tracing::info!(user_id = user.id, "user created");
        Ok(user)
    }

    async fn get_user(&self, id: u64) -> AppResult<User> {
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    async fn update_user(&self, id: u64, changes: UpdateUser) -> AppResult<User> {
        if let Some(email) = &changes.email {
            if let Some(existing) = self.repo.find_by_email(email).await? {
                if existing.id != id {
                    return Err(AppError::conflict("Email"));
                }
            }
        }

        self.repo.update(id, changes).await
    }

    async fn delete_user(&self, id: u64) -> AppResult<()> {
        self.repo.delete_by_id(id).await?;
        tracing::info!(user_id = id, "user deleted");
        Ok(())
    }

    async fn delete_users(&self, ids: Vec<u64>) -> AppResult<u64> {
        check_ids(&ids)?;

        let deleted = self.repo.delete_by_ids(ids).await?;
        tracing::info!(deleted, "users deleted");
        Ok(deleted)
    }

    async fn list_users(&self, query: RawQuery) -> AppResult<UserPage> {
        let spec = self.builder.build(&query).map_err(|err| {
            tracing::debug!(error = %err, "rejected list query");
            err
        })?;

        self.fetch_page(self.builder.paginator().plan(&spec)).await
    }

    async fn list_users_by_ids(&self, ids: Vec<u64>) -> AppResult<Vec<User>> {
        check_ids(&ids)?;

        let mut by_id: HashMap<u64, User> = self
            .repo
            .find_by_ids(ids.clone())
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        // Requested order; duplicates and unknown ids yield nothing
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn list_users_after(
        &self,
        last_id: u64,
        limit: u64,
        direction: SortDirection,
    ) -> AppResult<UserPage> {
        let spec = self.builder.cursor(last_id, limit, direction)?;
        self.fetch_page(self.builder.paginator().plan(&spec)).await
    }

    async fn get_user_by_condition(&self, conditions: RawConditions) -> AppResult<User> {
        let filter = self.builder.build_conditions(&conditions)?;
        let plan = self.builder.paginator().first(filter);

        self.repo
            .find_page(&plan)
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{entities::user::whitelist, MockUserRepository};
    use chrono::Utc;
    use domain::{QueryError, RawCondition, RawPage, UserProfile};
    use mockall::predicate::*;
    use serde_json::json;

    fn user(id: u64) -> User {
        let now = Utc::now();
        User {
            id,
            created_at: now,
            updated_at: now,
            email: format!("user{}@x.com", id),
            encrypted_password: "digest".to_string(),
            reset_password_token: None,
            reset_password_sent_at: None,
            remember_created_at: None,
            sign_in_count: 0,
            current_sign_in_at: None,
            last_sign_in_at: None,
            current_sign_in_ip: None,
            last_sign_in_ip: None,
            confirmation_token: None,
            confirmed_at: None,
            confirmation_sent_at: None,
            unconfirmed_email: None,
            failed_attempts: 0,
            unlock_token: None,
            locked_at: None,
            invitation_token: None,
            invitation_created_at: None,
            invitation_sent_at: None,
            invitation_accepted_at: None,
            invitation_limit: None,
            invited_by_type: None,
            invited_by_id: None,
            invitations_count: None,
            position_title: None,
            clerk_code: None,
            chinese_name: None,
            desk_phone: None,
            job_level: None,
            wecom_id: None,
            pre_sso_id: None,
            mobile: None,
            entry_company_date: None,
            gender: None,
            per_page: 12,
            open_in_new_tab: None,
            major_code: None,
            major_name: None,
            position_changed_in_last_month: None,
            new_ui: None,
            position_nc_pk_post: None,
            windows_sid: None,
        }
    }

    fn manager(repo: MockUserRepository) -> UserManager {
        UserManager::new(Arc::new(repo), QueryBuilder::new(whitelist().unwrap()))
    }

    #[tokio::test]
    async fn test_unknown_field_never_reaches_storage() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_page().never();
        repo.expect_count().never();

        let query = RawQuery {
            conditions: vec![RawCondition::new(
                "encrypted_password_hash",
                "eq",
                Some(json!("x")),
            )],
            ..Default::default()
        };

        let result = manager(repo).list_users(query).await;
        assert!(matches!(
            result,
            Err(AppError::InvalidQuery(QueryError::InvalidField(field))) if field == "encrypted_password_hash"
        ));
    }

    #[tokio::test]
    async fn test_offset_list_reports_total() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_page()
            .withf(|plan| plan.offset() == 0 && plan.limit() == 10 && plan.filter().len() == 1)
            .times(1)
            .returning(|_| Ok(vec![user(1)]));
        repo.expect_count().times(1).returning(|_| Ok(1));

        let query: RawQuery = serde_json::from_value(json!({
            "conditions": [{"field": "email", "operator": "eq", "value": "a@x.com"}],
            "page": {"kind": "offset", "pageNumber": 1, "pageSize": 10}
        }))
        .unwrap();

        let page = manager(repo).list_users(query).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, Some(1));
        assert_eq!(page.next_last_id, None);
    }

    #[tokio::test]
    async fn test_cursor_list_returns_next_cursor() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_page()
            .withf(|plan| plan.is_cursor() && plan.limit() == 2)
            .returning(|_| Ok(vec![user(4), user(5)]));
        repo.expect_count().never();

        let query = RawQuery {
            page: RawPage::Cursor {
                last_id: 3,
                limit: 2,
            },
            ..Default::default()
        };

        let page = manager(repo).list_users(query).await.unwrap();
        assert_eq!(page.total, None);
        assert_eq!(page.next_last_id, Some(5));
    }

    #[tokio::test]
    async fn test_list_after_short_page_has_no_cursor() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_page()
            .returning(|_| Ok(vec![user(1), user(2)]));

        let page = manager(repo)
            .list_users_after(0, 5, SortDirection::Asc)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_last_id, None);
    }

    #[tokio::test]
    async fn test_list_by_ids_keeps_requested_order() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_ids()
            .with(eq(vec![3, 1, 42, 2]))
            .returning(|_| Ok(vec![user(1), user(2), user(3)]));

        let users = manager(repo)
            .list_users_by_ids(vec![3, 1, 42, 2])
            .await
            .unwrap();
        let ids: Vec<u64> = users.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_id_set_bounds() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete_by_ids().never();
        let manager = manager(repo);

        assert!(matches!(
            manager.delete_users(vec![]).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            manager.delete_users((1..=MAX_IDS as u64 + 1).collect()).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(|_| Ok(Some(user(1))));
        repo.expect_create().never();

        let result = manager(repo)
            .create_user(CreateUser {
                email: "user1@x.com".to_string(),
                encrypted_password: "digest".to_string(),
                profile: UserProfile::default(),
            })
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_allows_own_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(|_| Ok(Some(user(1))));
        repo.expect_update()
            .with(eq(1), always())
            .returning(|id, _| Ok(user(id)));

        let changes = UpdateUser {
            email: Some("user1@x.com".to_string()),
            ..Default::default()
        };
        assert_eq!(manager(repo).update_user(1, changes).await.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        assert!(matches!(
            manager(repo).get_user(9).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_get_by_condition_uses_single_row_plan() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_page()
            .withf(|plan| plan.limit() == 1 && plan.filter().len() == 1)
            .returning(|_| Ok(vec![user(8)]));

        let conditions = RawConditions {
            conditions: vec![RawCondition::new("mobile", "eq", Some(json!("555")))],
            combinator: None,
        };
        assert_eq!(
            manager(repo).get_user_by_condition(conditions).await.unwrap().id,
            8
        );
    }

    #[tokio::test]
    async fn test_get_by_condition_requires_conditions() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_page().never();

        let result = manager(repo)
            .get_user_by_condition(RawConditions::default())
            .await;
        assert!(matches!(
            result,
            Err(AppError::InvalidQuery(QueryError::EmptyConditions))
        ));
    }
}
