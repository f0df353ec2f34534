//! Catalog business logic - Reference data that ledger and snapshot rows point to.
//!
//! Income methods, expense categories and expense types are deactivated rather than
//! removed, so historical entries keep resolving. Hard deletes (items and accounts alike)
//! are only accepted while nothing references the row; otherwise the caller gets a
//! conflict and should deactivate instead.

use crate::{
    config::ledger::LedgerConfig,
    entities::{
        Account, CatalogItem, CatalogKind, ExpenseEntry, IncomeEntryLine, SnapshotBalance,
        account, catalog_item, expense_entry, income_entry_line, snapshot_balance,
    },
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

/// Sort order given to items created without one
pub const DEFAULT_SORT_ORDER: i32 = 999;

fn clean_name(name: &str, what: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{what} name cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// Lists the items of one catalog, ordered by sort order then name.
///
/// Inactive items are skipped unless `include_inactive` is set; reports that need to
/// label historical rows should include them.
pub async fn list_items(
    db: &DatabaseConnection,
    kind: CatalogKind,
    include_inactive: bool,
) -> Result<Vec<catalog_item::Model>> {
    let mut query = CatalogItem::find().filter(catalog_item::Column::Kind.eq(kind));
    if !include_inactive {
        query = query.filter(catalog_item::Column::IsActive.eq(true));
    }
    query
        .order_by_asc(catalog_item::Column::SortOrder)
        .order_by_asc(catalog_item::Column::Name)
        .order_by_asc(catalog_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a catalog item by id, active or not.
pub async fn get_item(db: &DatabaseConnection, item_id: i64) -> Result<Option<catalog_item::Model>> {
    CatalogItem::find_by_id(item_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new active catalog item.
///
/// # Errors
/// Returns [`Error::Validation`] for a blank name.
#[instrument(skip(db))]
pub async fn create_item(
    db: &DatabaseConnection,
    kind: CatalogKind,
    name: &str,
    sort_order: Option<i32>,
) -> Result<catalog_item::Model> {
    let name = clean_name(name, kind.label())?;
    let item = catalog_item::ActiveModel {
        kind: Set(kind),
        name: Set(name),
        is_active: Set(true),
        sort_order: Set(sort_order.unwrap_or(DEFAULT_SORT_ORDER)),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Created {} '{}' (id {})", kind.label(), item.name, item.id);
    Ok(item)
}

async fn require_item<C>(db: &C, item_id: i64) -> Result<catalog_item::Model>
where
    C: ConnectionTrait,
{
    CatalogItem::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("catalog item", item_id))
}

/// Renames a catalog item. Entries keep pointing at it by id.
pub async fn rename_item(
    db: &DatabaseConnection,
    item_id: i64,
    name: &str,
) -> Result<catalog_item::Model> {
    let item = require_item(db, item_id).await?;
    let name = clean_name(name, item.kind.label())?;
    let mut active: catalog_item::ActiveModel = item.into();
    active.name = Set(name);
    active.update(db).await.map_err(Into::into)
}

async fn set_item_active(
    db: &DatabaseConnection,
    item_id: i64,
    is_active: bool,
) -> Result<catalog_item::Model> {
    let item = require_item(db, item_id).await?;
    if item.is_active == is_active {
        return Ok(item);
    }
    let mut active: catalog_item::ActiveModel = item.into();
    active.is_active = Set(is_active);
    let updated = active.update(db).await?;
    info!(
        "{} '{}' is now {}",
        updated.kind.label(),
        updated.name,
        if is_active { "active" } else { "inactive" }
    );
    Ok(updated)
}

/// Soft-deletes a catalog item. It disappears from pick lists but still labels
/// the entries that reference it.
pub async fn deactivate_item(db: &DatabaseConnection, item_id: i64) -> Result<catalog_item::Model> {
    set_item_active(db, item_id, false).await
}

/// Brings a deactivated catalog item back.
pub async fn reactivate_item(db: &DatabaseConnection, item_id: i64) -> Result<catalog_item::Model> {
    set_item_active(db, item_id, true).await
}

async fn count_item_references<C>(db: &C, item: &catalog_item::Model) -> Result<u64>
where
    C: ConnectionTrait,
{
    let count = match item.kind {
        CatalogKind::IncomeMethod => {
            IncomeEntryLine::find()
                .filter(income_entry_line::Column::MethodId.eq(item.id))
                .count(db)
                .await?
        }
        CatalogKind::ExpenseCategory => {
            ExpenseEntry::find()
                .filter(expense_entry::Column::CategoryId.eq(item.id))
                .count(db)
                .await?
        }
        CatalogKind::ExpenseType => {
            ExpenseEntry::find()
                .filter(expense_entry::Column::PaymentTypeId.eq(item.id))
                .count(db)
                .await?
        }
    };
    Ok(count)
}

/// Physically removes a catalog item that no entry references.
///
/// # Errors
/// Returns [`Error::NotFound`] for an unknown id and [`Error::Conflict`] when any
/// ledger row still points at the item.
#[instrument(skip(db))]
pub async fn delete_item(db: &DatabaseConnection, item_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let item = require_item(&txn, item_id).await?;

    let references = count_item_references(&txn, &item).await?;
    if references > 0 {
        return Err(Error::conflict(format!(
            "{} '{}' is referenced by {references} ledger row(s); deactivate it instead",
            item.kind.label(),
            item.name
        )));
    }

    CatalogItem::delete_by_id(item_id).exec(&txn).await?;
    txn.commit().await?;
    info!("Deleted unreferenced {} '{}'", item.kind.label(), item.name);
    Ok(())
}

/// Checks that every id names an existing item of the given kind.
///
/// Inactive items are accepted so that historical entries can still be replaced.
pub(crate) async fn ensure_items_exist<C>(db: &C, kind: CatalogKind, ids: &[i64]) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut wanted: Vec<i64> = ids.to_vec();
    wanted.sort_unstable();
    wanted.dedup();
    if wanted.is_empty() {
        return Ok(());
    }

    let found: Vec<i64> = CatalogItem::find()
        .filter(catalog_item::Column::Kind.eq(kind))
        .filter(catalog_item::Column::Id.is_in(wanted.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|item| item.id)
        .collect();

    match wanted.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(Error::validation(format!(
            "unknown {} id {missing}",
            kind.label()
        ))),
        None => Ok(()),
    }
}

/// Lists accounts ordered by name.
pub async fn list_accounts(
    db: &DatabaseConnection,
    include_inactive: bool,
) -> Result<Vec<account::Model>> {
    let mut query = Account::find();
    if !include_inactive {
        query = query.filter(account::Column::IsActive.eq(true));
    }
    query
        .order_by_asc(account::Column::Name)
        .order_by_asc(account::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an account by id, active or not.
pub async fn get_account(db: &DatabaseConnection, account_id: i64) -> Result<Option<account::Model>> {
    Account::find_by_id(account_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new active account.
#[instrument(skip(db))]
pub async fn create_account(
    db: &DatabaseConnection,
    name: &str,
    account_type: &str,
    currency: &str,
) -> Result<account::Model> {
    let account = account::ActiveModel {
        name: Set(clean_name(name, "account")?),
        account_type: Set(account_type.trim().to_string()),
        currency: Set(currency.trim().to_uppercase()),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Created account '{}' (id {})", account.name, account.id);
    Ok(account)
}

/// Replaces an account's editable fields.
pub async fn update_account(
    db: &DatabaseConnection,
    account_id: i64,
    name: &str,
    account_type: &str,
    currency: &str,
    is_active: bool,
) -> Result<account::Model> {
    let name = clean_name(name, "account")?;
    let existing = Account::find_by_id(account_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("account", account_id))?;

    let mut active: account::ActiveModel = existing.into();
    active.name = Set(name);
    active.account_type = Set(account_type.trim().to_string());
    active.currency = Set(currency.trim().to_uppercase());
    active.is_active = Set(is_active);
    active.update(db).await.map_err(Into::into)
}

/// Hides an account from pick lists. Snapshots keep their balances for it.
pub async fn deactivate_account(db: &DatabaseConnection, account_id: i64) -> Result<account::Model> {
    let existing = Account::find_by_id(account_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("account", account_id))?;
    let mut active: account::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.update(db).await.map_err(Into::into)
}

/// Physically removes an account that no snapshot references.
///
/// # Errors
/// Returns [`Error::Conflict`] when a snapshot holds a balance for the account.
#[instrument(skip(db))]
pub async fn delete_account(db: &DatabaseConnection, account_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let existing = Account::find_by_id(account_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("account", account_id))?;

    let references = SnapshotBalance::find()
        .filter(snapshot_balance::Column::AccountId.eq(account_id))
        .count(&txn)
        .await?;
    if references > 0 {
        return Err(Error::conflict(format!(
            "account '{}' has balances in {references} snapshot(s); deactivate it instead",
            existing.name
        )));
    }

    Account::delete_by_id(account_id).exec(&txn).await?;
    txn.commit().await?;
    info!("Deleted unreferenced account '{}'", existing.name);
    Ok(())
}

async fn seed_item<C>(db: &C, kind: CatalogKind, name: &str, sort_order: i32) -> Result<bool>
where
    C: ConnectionTrait,
{
    let existing = CatalogItem::find()
        .filter(catalog_item::Column::Kind.eq(kind))
        .filter(catalog_item::Column::Name.eq(name))
        .one(db)
        .await?;

    match existing {
        // Deactivation is the user's call; seeding never reverses it
        Some(item) => {
            debug!(
                "{} '{}' already exists ({}). Skipping.",
                kind.label(),
                name,
                if item.is_active { "active" } else { "inactive" }
            );
            Ok(false)
        }
        None => {
            info!("Seeding {} '{}'", kind.label(), name);
            catalog_item::ActiveModel {
                kind: Set(kind),
                name: Set(name.to_string()),
                is_active: Set(true),
                sort_order: Set(sort_order),
                ..Default::default()
            }
            .insert(db)
            .await?;
            Ok(true)
        }
    }
}

/// Seeds the catalog lists and accounts declared in the configuration file.
///
/// Matching is by kind and name, so running it on every start is harmless. Rows that
/// already exist are left alone, including ones deactivated since. Returns the number
/// of rows inserted.
#[instrument(skip(db, config))]
pub async fn seed_catalog(db: &DatabaseConnection, config: &LedgerConfig) -> Result<usize> {
    let txn = db.begin().await?;
    let mut changed = 0;

    let lists = [
        (CatalogKind::IncomeMethod, &config.income_methods),
        (CatalogKind::ExpenseCategory, &config.expense_categories),
        (CatalogKind::ExpenseType, &config.expense_types),
    ];
    for (kind, seeds) in lists {
        for seed in seeds {
            let name = clean_name(&seed.name, kind.label())?;
            let sort_order = seed.sort_order.unwrap_or(DEFAULT_SORT_ORDER);
            if seed_item(&txn, kind, &name, sort_order).await? {
                changed += 1;
            }
        }
    }

    for seed in &config.accounts {
        let name = clean_name(&seed.name, "account")?;
        let exists = Account::find()
            .filter(account::Column::Name.eq(name.as_str()))
            .one(&txn)
            .await?
            .is_some();
        if exists {
            debug!("Account '{}' already exists. Skipping.", name);
            continue;
        }
        info!("Seeding account '{}'", name);
        account::ActiveModel {
            name: Set(name),
            account_type: Set(seed.account_type.trim().to_string()),
            currency: Set(seed.currency.trim().to_uppercase()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        changed += 1;
    }

    txn.commit().await?;
    info!("Catalog seeding finished, {} row(s) changed", changed);
    Ok(changed)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::ledger::{AccountSeed, CatalogSeed};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_item_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_item(&db, CatalogKind::IncomeMethod, "   ", None).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_account(&db, "", "bank", "usd").await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_items_orders_by_sort_order_then_name() -> Result<()> {
        let db = setup_test_db().await?;
        create_item(&db, CatalogKind::IncomeMethod, "Transfer", Some(3)).await?;
        create_item(&db, CatalogKind::IncomeMethod, "Card", Some(1)).await?;
        create_item(&db, CatalogKind::IncomeMethod, "Cash", Some(1)).await?;
        create_item(&db, CatalogKind::ExpenseCategory, "Rent", None).await?;

        let names: Vec<String> = list_items(&db, CatalogKind::IncomeMethod, false)
            .await?
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, vec!["Card", "Cash", "Transfer"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_deactivate_hides_item_but_keeps_it_resolvable() -> Result<()> {
        let db = setup_test_db().await?;
        let cash = create_item(&db, CatalogKind::IncomeMethod, "Cash", None).await?;

        let deactivated = deactivate_item(&db, cash.id).await?;
        assert!(!deactivated.is_active);

        assert!(list_items(&db, CatalogKind::IncomeMethod, false).await?.is_empty());
        assert_eq!(list_items(&db, CatalogKind::IncomeMethod, true).await?.len(), 1);
        assert!(get_item(&db, cash.id).await?.is_some());

        let restored = reactivate_item(&db, cash.id).await?;
        assert!(restored.is_active);
        Ok(())
    }

    #[tokio::test]
    async fn test_rename_unknown_item_is_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = rename_item(&db, 404, "Anything").await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_referenced_income_method_is_rejected() -> Result<()> {
        let (db, catalog) = setup_with_catalog().await?;
        create_test_income(&db, "2024-03-01", &[(catalog.cash.id, 10.0)]).await?;

        let result = delete_item(&db, catalog.cash.id).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));
        assert!(get_item(&db, catalog.cash.id).await?.is_some());

        // An unreferenced method can go
        delete_item(&db, catalog.card.id).await?;
        assert!(get_item(&db, catalog.card.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_referenced_expense_catalog_items_is_rejected() -> Result<()> {
        let (db, catalog) = setup_with_catalog().await?;
        create_test_expense(&db, "2024-03-05", 40.0, &catalog).await?;

        assert!(matches!(
            delete_item(&db, catalog.supplies.id).await,
            Err(Error::Conflict { .. })
        ));
        assert!(matches!(
            delete_item(&db, catalog.cash_payment.id).await,
            Err(Error::Conflict { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_account_referenced_by_snapshot_is_rejected() -> Result<()> {
        let (db, catalog) = setup_with_catalog().await?;
        create_test_snapshot(&db, "2024-03", &[(catalog.checking.id, 500.0)]).await?;

        let result = delete_account(&db, catalog.checking.id).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        let deactivated = deactivate_account(&db, catalog.checking.id).await?;
        assert!(!deactivated.is_active);
        let active = list_accounts(&db, false).await?;
        assert!(active.iter().all(|a| a.id != catalog.checking.id));
        assert!(active.iter().any(|a| a.id == catalog.savings.id));
        assert!(list_accounts(&db, true).await?.iter().any(|a| a.id == catalog.checking.id));

        let spare = create_account(&db, "Petty Cash", "cash", "usd").await?;
        assert_eq!(spare.currency, "USD");
        delete_account(&db, spare.id).await?;
        assert!(get_account(&db, spare.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_account() -> Result<()> {
        let (db, catalog) = setup_with_catalog().await?;
        let updated =
            update_account(&db, catalog.checking.id, "Operating", "bank", "eur", true).await?;
        assert_eq!(updated.name, "Operating");
        assert_eq!(updated.currency, "EUR");

        let missing = update_account(&db, 999, "Ghost", "bank", "usd", true).await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_items_exist_checks_kind() -> Result<()> {
        let (db, catalog) = setup_with_catalog().await?;

        ensure_items_exist(&db, CatalogKind::IncomeMethod, &[catalog.cash.id, catalog.cash.id])
            .await?;

        // A category id is not an income method
        let result =
            ensure_items_exist(&db, CatalogKind::IncomeMethod, &[catalog.supplies.id]).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_catalog_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let config = LedgerConfig {
            income_methods: vec![
                CatalogSeed {
                    name: "Cash".to_string(),
                    sort_order: Some(1),
                },
                CatalogSeed {
                    name: "Card".to_string(),
                    sort_order: None,
                },
            ],
            expense_types: vec![CatalogSeed {
                name: "Cheque".to_string(),
                sort_order: None,
            }],
            accounts: vec![AccountSeed {
                name: "Main".to_string(),
                account_type: "bank".to_string(),
                currency: "usd".to_string(),
            }],
            ..LedgerConfig::default()
        };

        assert_eq!(seed_catalog(&db, &config).await?, 4);
        assert_eq!(seed_catalog(&db, &config).await?, 0);

        let methods = list_items(&db, CatalogKind::IncomeMethod, true).await?;
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].name, "Cash");
        assert_eq!(methods[1].sort_order, DEFAULT_SORT_ORDER);

        // A deactivated seed stays deactivated and is not duplicated
        deactivate_item(&db, methods[0].id).await?;
        assert_eq!(seed_catalog(&db, &config).await?, 0);
        assert!(!get_item(&db, methods[0].id).await?.unwrap().is_active);
        assert_eq!(list_items(&db, CatalogKind::IncomeMethod, true).await?.len(), 2);
        assert_eq!(list_items(&db, CatalogKind::IncomeMethod, false).await?.len(), 1);

        let main = list_accounts(&db, true).await?;
        deactivate_account(&db, main[0].id).await?;
        assert_eq!(seed_catalog(&db, &config).await?, 0);
        assert!(!get_account(&db, main[0].id).await?.unwrap().is_active);
        assert_eq!(list_accounts(&db, true).await?.len(), 1);
        Ok(())
    }
}
