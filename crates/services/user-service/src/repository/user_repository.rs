//! User repository: executes query plans and CRUD against the users table.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};

use common::{AppError, AppResult};
use domain::{ConditionSet, CreateUser, QueryPlan, UpdateUser, User, UserProfile};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::filter::{select_for, ConditionTranslator};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user
    async fn create(&self, user: CreateUser) -> AppResult<User>;

    async fn find_by_id(&self, id: u64) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Users whose id is in `ids`, in no particular order
    async fn find_by_ids(&self, ids: Vec<u64>) -> AppResult<Vec<User>>;

    /// Write only the fields present in `changes`
    async fn update(&self, id: u64, changes: UpdateUser) -> AppResult<User>;

    async fn delete_by_id(&self, id: u64) -> AppResult<()>;

    /// Returns the number of deleted rows
    async fn delete_by_ids(&self, ids: Vec<u64>) -> AppResult<u64>;

    /// Execute one page of a validated plan
    async fn find_page(&self, plan: &QueryPlan) -> AppResult<Vec<User>>;

    /// Count rows matching a filter, ignoring pagination
    async fn count(&self, filter: &ConditionSet) -> AppResult<u64>;
}

/// SeaORM-backed implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Ids beyond the BIGINT range cannot exist in the table.
fn db_id(id: u64) -> Option<i64> {
    i64::try_from(id).ok()
}

fn db_ids(ids: Vec<u64>) -> Vec<i64> {
    ids.into_iter().filter_map(db_id).collect()
}

/// Copy every field present in `profile` onto the active model.
fn apply_profile(active: &mut ActiveModel, profile: UserProfile) {
    macro_rules! set_nullable {
        ($($field:ident),* $(,)?) => {
            $(
                if let Some(value) = profile.$field {
                    active.$field = Set(Some(value));
                }
            )*
        };
    }
    macro_rules! set_required {
        ($($field:ident),* $(,)?) => {
            $(
                if let Some(value) = profile.$field {
                    active.$field = Set(value);
                }
            )*
        };
    }

    set_required!(sign_in_count, failed_attempts, per_page);
    set_nullable!(
        reset_password_token,
        reset_password_sent_at,
        remember_created_at,
        current_sign_in_at,
        last_sign_in_at,
        current_sign_in_ip,
        last_sign_in_ip,
        confirmation_token,
        confirmed_at,
        confirmation_sent_at,
        unconfirmed_email,
        unlock_token,
        locked_at,
        invitation_token,
        invitation_created_at,
        invitation_sent_at,
        invitation_accepted_at,
        invitation_limit,
        invited_by_type,
        invited_by_id,
        invitations_count,
        position_title,
        clerk_code,
        chinese_name,
        desk_phone,
        job_level,
        wecom_id,
        pre_sso_id,
        mobile,
        entry_company_date,
        gender,
        open_in_new_tab,
        major_code,
        major_name,
        position_changed_in_last_month,
        new_ui,
        position_nc_pk_post,
        windows_sid,
    );
}

#[async_trait]
impl UserRepository for UserStore {
    async fn create(&self, user: CreateUser) -> AppResult<User> {
        let now = Utc::now();
        let mut active = ActiveModel {
            id: NotSet,
            created_at: Set(now),
            updated_at: Set(now),
            email: Set(user.email),
            encrypted_password: Set(user.encrypted_password),
            ..Default::default()
        };
        apply_profile(&mut active, user.profile);

        let model = active.insert(&self.db).await?;
        Ok(User::from(model))
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<User>> {
        let Some(id) = db_id(id) else {
            return Ok(None);
        };

        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_by_ids(&self, ids: Vec<u64>) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(user::Column::Id.is_in(db_ids(ids)))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn update(&self, id: u64, changes: UpdateUser) -> AppResult<User> {
        let id = db_id(id).ok_or(AppError::NotFound)?;
        let model = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = model.into();
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(encrypted_password) = changes.encrypted_password {
            active.encrypted_password = Set(encrypted_password);
        }
        apply_profile(&mut active, changes.profile);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }

    async fn delete_by_id(&self, id: u64) -> AppResult<()> {
        let id = db_id(id).ok_or(AppError::NotFound)?;
        let result = UserEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn delete_by_ids(&self, ids: Vec<u64>) -> AppResult<u64> {
        let result = UserEntity::delete_many()
            .filter(user::Column::Id.is_in(db_ids(ids)))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn find_page(&self, plan: &QueryPlan) -> AppResult<Vec<User>> {
        let models = select_for(plan)?.all(&self.db).await?;
        Ok(models.into_iter().map(User::from).collect())
    }

    async fn count(&self, filter: &ConditionSet) -> AppResult<u64> {
        let mut select = UserEntity::find();
        if !filter.is_empty() {
            select = select.filter(ConditionTranslator::group(filter)?);
        }

        Ok(select.count(&self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn model(id: i64, email: &str) -> user::Model {
        let now = Utc::now();
        user::Model {
            id,
            created_at: now,
            updated_at: now,
            email: email.to_string(),
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
            invitations_count: Some(0),
            position_title: None,
            clerk_code: None,
            chinese_name: None,
            desk_phone: None,
            job_level: None,
            wecom_id: None,
            pre_sso_id: None,
            mobile: None,
            entry_company_date: None,
            gender: Some(true),
            per_page: 12,
            open_in_new_tab: Some(false),
            major_code: None,
            major_name: None,
            position_changed_in_last_month: Some(false),
            new_ui: Some(true),
            position_nc_pk_post: None,
            windows_sid: None,
        }
    }

    #[test]
    fn test_apply_profile_only_touches_present_fields() {
        let mut active: ActiveModel = model(1, "a@x.com").into();
        apply_profile(
            &mut active,
            UserProfile {
                mobile: Some("555".to_string()),
                per_page: Some(50),
                ..Default::default()
            },
        );

        assert_eq!(active.mobile, Set(Some("555".to_string())));
        assert_eq!(active.per_page, Set(50));
        assert!(!active.email.is_set());
        assert!(!active.job_level.is_set());
    }

    #[test]
    fn test_oversized_ids_are_dropped() {
        assert_eq!(db_ids(vec![1, u64::MAX, 3]), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(7, "a@x.com")]])
            .into_connection();
        let store = UserStore::new(db);

        let user = store.find_by_id(7).await.unwrap().unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let store = UserStore::new(db);

        assert!(matches!(
            store.delete_by_id(99).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_find_page_maps_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(1, "a@x.com"), model(2, "b@x.com")]])
            .into_connection();
        let store = UserStore::new(db);

        let builder = domain::QueryBuilder::new(user::whitelist().unwrap());
        let spec = builder
            .cursor(0, 2, domain::SortDirection::Asc)
            .unwrap();
        let plan = builder.paginator().plan(&spec);

        let users = store.find_page(&plan).await.unwrap();
        let ids: Vec<u64> = users.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
