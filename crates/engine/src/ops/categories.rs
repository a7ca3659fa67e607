use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Category, CreateCategoryCmd, EngineError, LedgerEvent, ResultEngine, TransactionKind,
    categories,
    util::{normalize_icon, normalize_owner, normalize_required_name},
};

use super::{Engine, with_tx};

/// Insert a category row. A concurrent create that slipped past the lookup
/// still hits the unique index and is reported as `ExistingKey`.
async fn insert_category<C: ConnectionTrait>(
    db: &C,
    owner_id: String,
    name: String,
    kind: TransactionKind,
    icon: String,
) -> ResultEngine<categories::Model> {
    let active = categories::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        owner_id: ActiveValue::Set(owner_id),
        name: ActiveValue::Set(name),
        kind: ActiveValue::Set(kind.as_str().to_string()),
        icon: ActiveValue::Set(icon),
    };
    active.insert(db).await.map_err(|err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            EngineError::ExistingKey("category".to_string())
        }
        _ => err.into(),
    })
}

impl Engine {
    /// Look up the category `(owner, name, kind)`.
    pub(super) async fn find_category<C: ConnectionTrait>(
        &self,
        db: &C,
        owner_id: &str,
        name: &str,
        kind: TransactionKind,
    ) -> ResultEngine<Option<categories::Model>> {
        categories::Entity::find()
            .filter(categories::Column::OwnerId.eq(owner_id))
            .filter(categories::Column::Name.eq(name))
            .filter(categories::Column::Kind.eq(kind.as_str()))
            .one(db)
            .await
            .map_err(Into::into)
    }

    /// Resolve the category a new transaction refers to. Categories are never
    /// created implicitly.
    pub(super) async fn require_category<C: ConnectionTrait>(
        &self,
        db: &C,
        owner_id: &str,
        name: &str,
        kind: TransactionKind,
    ) -> ResultEngine<categories::Model> {
        self.find_category(db, owner_id, name, kind)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category".to_string()))
    }

    /// Create a category. Fails with `ExistingKey` if `(owner, name, kind)`
    /// is already taken.
    pub async fn create_category(&self, cmd: CreateCategoryCmd) -> ResultEngine<Category> {
        let owner_id = normalize_owner(&cmd.owner_id)?;
        let name = normalize_required_name(&cmd.name, "category")?;
        let icon = normalize_icon(&cmd.icon)?;

        let category = with_tx!(self, |db_tx| {
            if self
                .find_category(&db_tx, &owner_id, &name, cmd.kind)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey("category".to_string()));
            }

            let model =
                insert_category(&db_tx, owner_id.clone(), name, cmd.kind, icon).await?;
            Category::try_from(model)
        })?;

        self.publish(LedgerEvent::CategoriesChanged { owner_id });
        Ok(category)
    }

    /// Delete a category. Transactions keep the name and icon they were
    /// recorded with.
    pub async fn delete_category(
        &self,
        owner_id: &str,
        name: &str,
        kind: TransactionKind,
    ) -> ResultEngine<()> {
        let owner_id = normalize_owner(owner_id)?;
        let name = normalize_required_name(name, "category")?;

        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, &owner_id, &name, kind).await?;
            categories::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;
            Ok::<(), EngineError>(())
        })?;

        self.publish(LedgerEvent::CategoriesChanged { owner_id });
        Ok(())
    }

    /// List the owner's categories ordered by name, optionally by kind.
    pub async fn list_categories(
        &self,
        owner_id: &str,
        kind: Option<TransactionKind>,
    ) -> ResultEngine<Vec<Category>> {
        let owner_id = normalize_owner(owner_id)?;

        let mut query = categories::Entity::find()
            .filter(categories::Column::OwnerId.eq(owner_id))
            .order_by_asc(categories::Column::Name)
            .order_by_asc(categories::Column::Kind);
        if let Some(kind) = kind {
            query = query.filter(categories::Column::Kind.eq(kind.as_str()));
        }

        query
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }
}
