use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Column order matches the ledger row layout and is significant for
// positional consumers (CSV export mirrors it).
#[derive(Iden)]
enum Entries {
    Table,
    Date,
    Category,
    AmountMinor,
    PaidBy,
    Description,
    EntryTimestamp,
    OriginatorId,
    Id,
    ShareAMinor,
    ShareBMinor,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Entries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Entries::Date).string().not_null())
                    .col(ColumnDef::new(Entries::Category).string().not_null())
                    .col(
                        ColumnDef::new(Entries::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Entries::PaidBy).string().not_null())
                    .col(ColumnDef::new(Entries::Description).string().not_null())
                    .col(
                        ColumnDef::new(Entries::EntryTimestamp)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Entries::OriginatorId).string().not_null())
                    .col(
                        ColumnDef::new(Entries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Entries::ShareAMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Entries::ShareBMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-entries-category-date")
                    .table(Entries::Table)
                    .col(Entries::Category)
                    .col(Entries::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Entries::Table).to_owned())
            .await?;
        Ok(())
    }
}
