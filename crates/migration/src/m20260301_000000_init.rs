//! Initial schema migration.
//!
//! Creates the complete schema for Quokka:
//!
//! - `imputation_accounts`: cost-imputation accounts (soft-deleted via `active`)
//! - `link_types`: catalog of external reference kinds (work item, pull request)
//! - `entries`: units of recorded work, optionally grouped
//! - `splits`: per-account allocation of an entry's duration
//! - `linked_items`: typed external references attached to an entry
//! - `undo_log`: bounded journal of before/after entry snapshots

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum ImputationAccounts {
    Table,
    Id,
    Number,
    Description,
    Project,
    OpenedOn,
    ClosedOn,
    Active,
}

#[derive(Iden)]
enum LinkTypes {
    Table,
    Id,
    Title,
    UrlTemplate,
    Position,
}

#[derive(Iden)]
enum Entries {
    Table,
    Id,
    Date,
    Duration,
    Description,
    Notes,
    GroupId,
    SortOrder,
}

#[derive(Iden)]
enum Splits {
    Table,
    Id,
    EntryId,
    AccountId,
    Duration,
    Position,
}

#[derive(Iden)]
enum LinkedItems {
    Table,
    Id,
    EntryId,
    LinkTypeId,
    Value,
    Position,
}

#[derive(Iden)]
enum UndoLog {
    Table,
    Id,
    Action,
    BeforeState,
    AfterState,
    Undone,
    RecordedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Imputation accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ImputationAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ImputationAccounts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ImputationAccounts::Number)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ImputationAccounts::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ImputationAccounts::Project)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(ImputationAccounts::OpenedOn).date())
                    .col(ColumnDef::new(ImputationAccounts::ClosedOn).date())
                    .col(
                        ColumnDef::new(ImputationAccounts::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Link types
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LinkTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LinkTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LinkTypes::Title).string().not_null())
                    .col(
                        ColumnDef::new(LinkTypes::UrlTemplate)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(LinkTypes::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Entries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Entries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Entries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Entries::Date).date().not_null())
                    .col(ColumnDef::new(Entries::Duration).integer().not_null())
                    .col(
                        ColumnDef::new(Entries::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Entries::Notes)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Entries::GroupId).string())
                    .col(ColumnDef::new(Entries::SortOrder).integer())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-entries-date")
                    .table(Entries::Table)
                    .col(Entries::Date)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-entries-group_id")
                    .table(Entries::Table)
                    .col(Entries::GroupId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Splits
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Splits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Splits::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Splits::EntryId).integer().not_null())
                    .col(ColumnDef::new(Splits::AccountId).integer().not_null())
                    .col(ColumnDef::new(Splits::Duration).integer().not_null())
                    .col(ColumnDef::new(Splits::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-splits-entry_id")
                            .from(Splits::Table, Splits::EntryId)
                            .to(Entries::Table, Entries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-splits-account_id")
                            .from(Splits::Table, Splits::AccountId)
                            .to(ImputationAccounts::Table, ImputationAccounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-splits-entry_id")
                    .table(Splits::Table)
                    .col(Splits::EntryId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Linked items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LinkedItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LinkedItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LinkedItems::EntryId).integer().not_null())
                    .col(ColumnDef::new(LinkedItems::LinkTypeId).integer().not_null())
                    .col(ColumnDef::new(LinkedItems::Value).string().not_null())
                    .col(ColumnDef::new(LinkedItems::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-linked_items-entry_id")
                            .from(LinkedItems::Table, LinkedItems::EntryId)
                            .to(Entries::Table, Entries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-linked_items-link_type_id")
                            .from(LinkedItems::Table, LinkedItems::LinkTypeId)
                            .to(LinkTypes::Table, LinkTypes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-linked_items-entry_id")
                    .table(LinkedItems::Table)
                    .col(LinkedItems::EntryId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Undo log
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(UndoLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UndoLog::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UndoLog::Action).string().not_null())
                    .col(ColumnDef::new(UndoLog::BeforeState).text().not_null())
                    .col(ColumnDef::new(UndoLog::AfterState).text().not_null())
                    .col(
                        ColumnDef::new(UndoLog::Undone)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(UndoLog::RecordedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(UndoLog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LinkedItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Splits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Entries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LinkTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ImputationAccounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
