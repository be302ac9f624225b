//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Iterable;

use domain::{ColumnWhitelist, DomainResult, User, PRIMARY_KEY_COLUMN};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    #[sea_orm(unique)]
    pub email: String,
    pub encrypted_password: String,
    pub reset_password_token: Option<String>,
    pub reset_password_sent_at: Option<DateTimeUtc>,
    pub remember_created_at: Option<DateTimeUtc>,
    pub sign_in_count: i32,
    pub current_sign_in_at: Option<DateTimeUtc>,
    pub last_sign_in_at: Option<DateTimeUtc>,
    pub current_sign_in_ip: Option<String>,
    pub last_sign_in_ip: Option<String>,
    pub confirmation_token: Option<String>,
    pub confirmed_at: Option<DateTimeUtc>,
    pub confirmation_sent_at: Option<DateTimeUtc>,
    pub unconfirmed_email: Option<String>,
    pub failed_attempts: i32,
    pub unlock_token: Option<String>,
    pub locked_at: Option<DateTimeUtc>,
    pub invitation_token: Option<String>,
    pub invitation_created_at: Option<DateTimeUtc>,
    pub invitation_sent_at: Option<DateTimeUtc>,
    pub invitation_accepted_at: Option<DateTimeUtc>,
    pub invitation_limit: Option<i32>,
    pub invited_by_type: Option<String>,
    pub invited_by_id: Option<i64>,
    pub invitations_count: Option<i32>,
    pub position_title: Option<String>,
    pub clerk_code: Option<String>,
    pub chinese_name: Option<String>,
    pub desk_phone: Option<String>,
    pub job_level: Option<String>,
    pub wecom_id: Option<String>,
    pub pre_sso_id: Option<String>,
    pub mobile: Option<String>,
    pub entry_company_date: Option<Date>,
    pub gender: Option<bool>,
    pub per_page: i32,
    pub open_in_new_tab: Option<bool>,
    pub major_code: Option<String>,
    pub major_name: Option<String>,
    pub position_changed_in_last_month: Option<bool>,
    pub new_ui: Option<bool>,
    pub position_nc_pk_post: Option<String>,
    pub windows_sid: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Resolve a whitelisted field name to its typed column.
pub fn column_for(field: &str) -> Option<Column> {
    Column::iter().find(|column| column.as_str() == field)
}

/// Columns clients may filter and sort on: all but the password digest,
/// which is never serialized either.
pub fn whitelist() -> DomainResult<ColumnWhitelist> {
    ColumnWhitelist::new(
        Column::iter()
            .map(|c| c.as_str().to_string())
            .filter(|name| *name != "encrypted_password"),
        PRIMARY_KEY_COLUMN,
    )
}

/// Convert database model to domain entity
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: u64::try_from(model.id).unwrap_or_default(),
            created_at: model.created_at,
            updated_at: model.updated_at,
            email: model.email,
            encrypted_password: model.encrypted_password,
            reset_password_token: model.reset_password_token,
            reset_password_sent_at: model.reset_password_sent_at,
            remember_created_at: model.remember_created_at,
            sign_in_count: model.sign_in_count,
            current_sign_in_at: model.current_sign_in_at,
            last_sign_in_at: model.last_sign_in_at,
            current_sign_in_ip: model.current_sign_in_ip,
            last_sign_in_ip: model.last_sign_in_ip,
            confirmation_token: model.confirmation_token,
            confirmed_at: model.confirmed_at,
            confirmation_sent_at: model.confirmation_sent_at,
            unconfirmed_email: model.unconfirmed_email,
            failed_attempts: model.failed_attempts,
            unlock_token: model.unlock_token,
            locked_at: model.locked_at,
            invitation_token: model.invitation_token,
            invitation_created_at: model.invitation_created_at,
            invitation_sent_at: model.invitation_sent_at,
            invitation_accepted_at: model.invitation_accepted_at,
            invitation_limit: model.invitation_limit,
            invited_by_type: model.invited_by_type,
            invited_by_id: model.invited_by_id,
            invitations_count: model.invitations_count,
            position_title: model.position_title,
            clerk_code: model.clerk_code,
            chinese_name: model.chinese_name,
            desk_phone: model.desk_phone,
            job_level: model.job_level,
            wecom_id: model.wecom_id,
            pre_sso_id: model.pre_sso_id,
            mobile: model.mobile,
            entry_company_date: model.entry_company_date,
            gender: model.gender,
            per_page: model.per_page,
            open_in_new_tab: model.open_in_new_tab,
            major_code: model.major_code,
            major_name: model.major_name,
            position_changed_in_last_month: model.position_changed_in_last_month,
            new_ui: model.new_ui,
            position_nc_pk_post: model.position_nc_pk_post,
            windows_sid: model.windows_sid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitelist_covers_public_columns() {
        let whitelist = whitelist().unwrap();

        assert_eq!(whitelist.len(), 45);
        assert_eq!(whitelist.primary_key(), "id");
        assert!(whitelist.contains("email"));
        assert!(whitelist.contains("position_changed_in_last_month"));
        assert!(!whitelist.contains("encrypted_password_hash"));
        assert!(!whitelist.contains("encrypted_password"));
    }

    #[test]
    fn test_password_digest_not_queryable() {
        let builder = domain::QueryBuilder::new(whitelist().unwrap());
        let raw = domain::RawQuery {
            conditions: vec![domain::RawCondition::new(
                "encrypted_password",
                "like",
                Some(serde_json::json!("$2a$10$a")),
            )],
            ..Default::default()
        };

        assert_eq!(
            builder.build(&raw),
            Err(domain::QueryError::InvalidField("encrypted_password".to_string()))
        );
    }

    #[test]
    fn test_column_for() {
        assert_eq!(column_for("mobile").map(|c| c.as_str()), Some("mobile"));
        assert_eq!(column_for("new_ui").map(|c| c.as_str()), Some("new_ui"));
        assert!(column_for("Mobile").is_none());
    }
}
