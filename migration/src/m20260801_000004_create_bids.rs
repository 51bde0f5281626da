use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bids::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bids::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bids::LotId).integer().not_null())
                    .col(ColumnDef::new(Bids::BidderId).integer().not_null())
                    .col(ColumnDef::new(Bids::Amount).decimal_len(12, 2).not_null())
                    .col(
                        ColumnDef::new(Bids::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bids_lot_id")
                            .from(Bids::Table, Bids::LotId)
                            .to(Lots::Table, Lots::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bids_bidder_id")
                            .from(Bids::Table, Bids::BidderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bids_lot_id")
                    .table(Bids::Table)
                    .col(Bids::LotId)
                    .to_owned(),
            )
            .await?;

        // Winner selection orders by amount within a lot
        manager
            .create_index(
                Index::create()
                    .name("idx_bids_lot_id_amount")
                    .table(Bids::Table)
                    .col(Bids::LotId)
                    .col(Bids::Amount)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bids_bidder_id")
                    .table(Bids::Table)
                    .col(Bids::BidderId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bids::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Bids {
    Table,
    Id,
    LotId,
    BidderId,
    Amount,
    CreatedAt,
}

#[derive(Iden)]
enum Lots {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
