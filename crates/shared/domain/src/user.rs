//! User domain entity and related types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// User domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct User {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub email: String,
    #[serde(skip_serializing, default)]
    pub encrypted_password: String,

    // Devise: recoverable, rememberable, trackable
    pub reset_password_token: Option<String>,
    pub reset_password_sent_at: Option<DateTime<Utc>>,
    pub remember_created_at: Option<DateTime<Utc>>,
    pub sign_in_count: i32,
    pub current_sign_in_at: Option<DateTime<Utc>>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(rename = "currentSignInIP")]
    pub current_sign_in_ip: Option<String>,
    #[serde(rename = "lastSignInIP")]
    pub last_sign_in_ip: Option<String>,

    // Devise: confirmable, lockable
    pub confirmation_token: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub confirmation_sent_at: Option<DateTime<Utc>>,
    pub unconfirmed_email: Option<String>,
    pub failed_attempts: i32,
    pub unlock_token: Option<String>,
    pub locked_at: Option<DateTime<Utc>>,

    // Invitations
    pub invitation_token: Option<String>,
    pub invitation_created_at: Option<DateTime<Utc>>,
    pub invitation_sent_at: Option<DateTime<Utc>>,
    pub invitation_accepted_at: Option<DateTime<Utc>>,
    pub invitation_limit: Option<i32>,
    pub invited_by_type: Option<String>,
    #[serde(rename = "invitedByID")]
    pub invited_by_id: Option<i64>,
    pub invitations_count: Option<i32>,

    // Staff profile
    pub position_title: Option<String>,
    pub clerk_code: Option<String>,
    pub chinese_name: Option<String>,
    pub desk_phone: Option<String>,
    pub job_level: Option<String>,
    #[serde(rename = "wecomID")]
    pub wecom_id: Option<String>,
    #[serde(rename = "preSsoID")]
    pub pre_sso_id: Option<String>,
    pub mobile: Option<String>,
    pub entry_company_date: Option<NaiveDate>,
    pub gender: Option<bool>,
    pub per_page: i32,
    pub open_in_new_tab: Option<bool>,
    pub major_code: Option<String>,
    pub major_name: Option<String>,
    pub position_changed_in_last_month: Option<bool>,
    #[serde(rename = "newUI")]
    pub new_ui: Option<bool>,
    pub position_nc_pk_post: Option<String>,
    pub windows_sid: Option<String>,
}

/// Optional user columns shared by create and update payloads.
///
/// Absent fields are left untouched on update and take the column default on
/// create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserProfile {
    pub reset_password_token: Option<String>,
    pub reset_password_sent_at: Option<DateTime<Utc>>,
    pub remember_created_at: Option<DateTime<Utc>>,
    pub sign_in_count: Option<i32>,
    pub current_sign_in_at: Option<DateTime<Utc>>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(rename = "currentSignInIP")]
    pub current_sign_in_ip: Option<String>,
    #[serde(rename = "lastSignInIP")]
    pub last_sign_in_ip: Option<String>,
    pub confirmation_token: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub confirmation_sent_at: Option<DateTime<Utc>>,
    pub unconfirmed_email: Option<String>,
    pub failed_attempts: Option<i32>,
    pub unlock_token: Option<String>,
    pub locked_at: Option<DateTime<Utc>>,
    pub invitation_token: Option<String>,
    pub invitation_created_at: Option<DateTime<Utc>>,
    pub invitation_sent_at: Option<DateTime<Utc>>,
    pub invitation_accepted_at: Option<DateTime<Utc>>,
    pub invitation_limit: Option<i32>,
    pub invited_by_type: Option<String>,
    #[serde(rename = "invitedByID")]
    pub invited_by_id: Option<i64>,
    pub invitations_count: Option<i32>,
    pub position_title: Option<String>,
    pub clerk_code: Option<String>,
    pub chinese_name: Option<String>,
    pub desk_phone: Option<String>,
    pub job_level: Option<String>,
    #[serde(rename = "wecomID")]
    pub wecom_id: Option<String>,
    #[serde(rename = "preSsoID")]
    pub pre_sso_id: Option<String>,
    pub mobile: Option<String>,
    pub entry_company_date: Option<NaiveDate>,
    pub gender: Option<bool>,
    pub per_page: Option<i32>,
    pub open_in_new_tab: Option<bool>,
    pub major_code: Option<String>,
    pub major_name: Option<String>,
    pub position_changed_in_last_month: Option<bool>,
    #[serde(rename = "newUI")]
    pub new_ui: Option<bool>,
    pub position_nc_pk_post: Option<String>,
    pub windows_sid: Option<String>,
}

/// User creation data transfer object
#[derive(Debug, Clone, PartialEq)]
pub struct CreateUser {
    /// Login email address
    pub email: String,
    /// Password digest, already encrypted by the caller
    pub encrypted_password: String,
    /// Remaining columns
    pub profile: UserProfile,
}

/// User update data transfer object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub encrypted_password: Option<String>,
    pub profile: UserProfile,
}

impl UpdateUser {
    /// True when the payload would not change any column
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.encrypted_password.is_none()
            && self.profile == UserProfile::default()
    }
}
