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
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::PasswordHash)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::Cpf)
                            .string_len(11)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Phone).string_len(20).not_null())
                    .col(ColumnDef::new(Users::PostalCode).string_len(9).not_null())
                    .col(ColumnDef::new(Users::Street).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Users::StreetNumber)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Users::Complement).string_len(255).null())
                    .col(ColumnDef::new(Users::District).string_len(120).not_null())
                    .col(ColumnDef::new(Users::City).string_len(120).not_null())
                    .col(ColumnDef::new(Users::State).string_len(2).not_null())
                    .col(
                        ColumnDef::new(Users::ApprovalStatus)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Users::DocFrontKey).string_len(512).null())
                    .col(ColumnDef::new(Users::DocBackKey).string_len(512).null())
                    .col(ColumnDef::new(Users::SelfieKey).string_len(512).null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Admin screens filter users by approval state
        manager
            .create_index(
                Index::create()
                    .name("idx_users_approval_status")
                    .table(Users::Table)
                    .col(Users::ApprovalStatus)
                    .to_owned(),
            )
            .await?;

        Ok(())
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
    Name,
    Email,
    PasswordHash,
    Cpf,
    Phone,
    PostalCode,
    Street,
    StreetNumber,
    Complement,
    District,
    City,
    State,
    ApprovalStatus,
    DocFrontKey,
    DocBackKey,
    SelfieKey,
    CreatedAt,
    UpdatedAt,
}
