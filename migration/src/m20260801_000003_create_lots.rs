use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Lots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Lots::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Lots::Number)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Lots::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Lots::Description).text().not_null())
                    .col(ColumnDef::new(Lots::Origin).string_len(120).null())
                    .col(
                        ColumnDef::new(Lots::StartingBid)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Lots::CurrentBid).decimal_len(12, 2).null())
                    .col(
                        ColumnDef::new(Lots::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Lots::OpensAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Lots::ClosesAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Lots::PhotoUrls).json_binary().not_null())
                    .col(ColumnDef::new(Lots::VideoUrl).string_len(512).null())
                    .col(
                        ColumnDef::new(Lots::FinalizedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Lots::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(Lots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Public listing filters on status and orders by close time
        manager
            .create_index(
                Index::create()
                    .name("idx_lots_status")
                    .table(Lots::Table)
                    .col(Lots::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lots_closes_at")
                    .table(Lots::Table)
                    .col(Lots::ClosesAt)
                    .to_owned(),
            )
            .await?;

        // Keep updated_at current on every row update
        let db = manager.get_connection();
        db.execute_unprepared(
            r#"
            CREATE OR REPLACE FUNCTION update_lots_updated_at()
            RETURNS TRIGGER AS $$
            BEGIN
                NEW.updated_at = NOW();
                RETURN NEW;
            END;
            $$ LANGUAGE plpgsql;
            "#,
        )
        .await?;

        db.execute_unprepared(
            r#"
            DROP TRIGGER IF EXISTS trigger_lots_updated_at ON lots;
            CREATE TRIGGER trigger_lots_updated_at
                BEFORE UPDATE ON lots
                FOR EACH ROW
                EXECUTE FUNCTION update_lots_updated_at();
            "#,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("DROP TRIGGER IF EXISTS trigger_lots_updated_at ON lots;")
            .await?;
        db.execute_unprepared("DROP FUNCTION IF EXISTS update_lots_updated_at();")
            .await?;

        manager
            .drop_table(Table::drop().table(Lots::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Lots {
    Table,
    Id,
    Number,
    Title,
    Description,
    Origin,
    StartingBid,
    CurrentBid,
    Status,
    OpensAt,
    ClosesAt,
    PhotoUrls,
    VideoUrl,
    FinalizedAt,
    CreatedAt,
    UpdatedAt,
}
