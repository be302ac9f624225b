//! Migration: Create the users table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null().unique_key())
                    .col(ColumnDef::new(Users::EncryptedPassword).string_len(255).not_null())
                    .col(ColumnDef::new(Users::ResetPasswordToken).string_len(255).null())
                    .col(ColumnDef::new(Users::ResetPasswordSentAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::RememberCreatedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::SignInCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Users::CurrentSignInAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::LastSignInAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::CurrentSignInIp).string_len(255).null())
                    .col(ColumnDef::new(Users::LastSignInIp).string_len(255).null())
                    .col(ColumnDef::new(Users::ConfirmationToken).string_len(255).null())
                    .col(ColumnDef::new(Users::ConfirmedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::ConfirmationSentAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::UnconfirmedEmail).string_len(255).null())
                    .col(ColumnDef::new(Users::FailedAttempts).integer().not_null().default(0))
                    .col(ColumnDef::new(Users::UnlockToken).string_len(255).null())
                    .col(ColumnDef::new(Users::LockedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::InvitationToken).string_len(255).null())
                    .col(ColumnDef::new(Users::InvitationCreatedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::InvitationSentAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::InvitationAcceptedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Users::InvitationLimit).integer().null())
                    .col(ColumnDef::new(Users::InvitedByType).string_len(255).null())
                    .col(ColumnDef::new(Users::InvitedById).big_integer().null())
                    .col(ColumnDef::new(Users::InvitationsCount).integer().null().default(0))
                    .col(ColumnDef::new(Users::PositionTitle).string_len(255).null())
                    .col(ColumnDef::new(Users::ClerkCode).string_len(255).null())
                    .col(ColumnDef::new(Users::ChineseName).string_len(255).null())
                    .col(ColumnDef::new(Users::DeskPhone).string_len(255).null())
                    .col(ColumnDef::new(Users::JobLevel).string_len(255).null())
                    .col(ColumnDef::new(Users::WecomId).string_len(255).null())
                    .col(ColumnDef::new(Users::PreSsoId).string_len(255).null())
                    .col(ColumnDef::new(Users::Mobile).string_len(255).null())
                    .col(ColumnDef::new(Users::EntryCompanyDate).date().null())
                    .col(ColumnDef::new(Users::Gender).boolean().null().default(true))
                    .col(ColumnDef::new(Users::PerPage).integer().not_null().default(12))
                    .col(ColumnDef::new(Users::OpenInNewTab).boolean().null().default(false))
                    .col(ColumnDef::new(Users::MajorCode).string_len(255).null())
                    .col(ColumnDef::new(Users::MajorName).string_len(255).null())
                    .col(
                        ColumnDef::new(Users::PositionChangedInLastMonth)
                            .boolean()
                            .null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::NewUi).boolean().null().default(true))
                    .col(ColumnDef::new(Users::PositionNcPkPost).string_len(255).null())
                    .col(ColumnDef::new(Users::WindowsSid).string_len(255).null())
                    .to_owned(),
            )
            .await?;

        // Devise token lookups
        for (name, column) in [
            ("idx_users_reset_password_token", Users::ResetPasswordToken),
            ("idx_users_confirmation_token", Users::ConfirmationToken),
            ("idx_users_unlock_token", Users::UnlockToken),
            ("idx_users_invitation_token", Users::InvitationToken),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Users::Table)
                        .col(column)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("idx_users_invited_by")
                    .table(Users::Table)
                    .col(Users::InvitedByType)
                    .col(Users::InvitedById)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    CreatedAt,
    UpdatedAt,
    Email,
    EncryptedPassword,
    ResetPasswordToken,
    ResetPasswordSentAt,
    RememberCreatedAt,
    SignInCount,
    CurrentSignInAt,
    LastSignInAt,
    CurrentSignInIp,
    LastSignInIp,
    ConfirmationToken,
    ConfirmedAt,
    ConfirmationSentAt,
    UnconfirmedEmail,
    FailedAttempts,
    UnlockToken,
    LockedAt,
    InvitationToken,
    InvitationCreatedAt,
    InvitationSentAt,
    InvitationAcceptedAt,
    InvitationLimit,
    InvitedByType,
    InvitedById,
    InvitationsCount,
    PositionTitle,
    ClerkCode,
    ChineseName,
    DeskPhone,
    JobLevel,
    WecomId,
    PreSsoId,
    Mobile,
    EntryCompanyDate,
    Gender,
    PerPage,
    OpenInNewTab,
    MajorCode,
    MajorName,
    PositionChangedInLastMonth,
    NewUi,
    PositionNcPkPost,
    WindowsSid,
}
