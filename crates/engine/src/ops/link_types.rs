use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, prelude::*,
};

use crate::{
    EngineError, LinkType, LinkTypeNew, LinkTypePatch, ResultEngine, link_types, linked_items,
};

use super::{Engine, normalize_required_text, with_tx};

impl Engine {
    async fn require_link_type(
        &self,
        db_tx: &DatabaseTransaction,
        link_type_id: i32,
    ) -> ResultEngine<link_types::Model> {
        link_types::Entity::find_by_id(link_type_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("link type {link_type_id}")))
    }

    /// List link types in display order.
    pub async fn list_link_types(&self) -> ResultEngine<Vec<LinkType>> {
        with_tx!(self, |db_tx| {
            let models = link_types::Entity::find()
                .order_by_asc(link_types::Column::Position)
                .order_by_asc(link_types::Column::Id)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(LinkType::from).collect())
        })
    }

    /// Create a link type, appended after the existing ones.
    pub async fn create_link_type(&self, cmd: LinkTypeNew) -> ResultEngine<LinkType> {
        let title = normalize_required_text(&cmd.title, "link type title")?;
        with_tx!(self, |db_tx| {
            let last = link_types::Entity::find()
                .order_by_desc(link_types::Column::Position)
                .one(&db_tx)
                .await?;
            let position = last.map(|model| model.position + 1).unwrap_or(0);

            let model = link_types::ActiveModel {
                id: ActiveValue::NotSet,
                title: ActiveValue::Set(title),
                url_template: ActiveValue::Set(cmd.url_template.trim().to_string()),
                position: ActiveValue::Set(position),
            }
            .insert(&db_tx)
            .await?;
            Ok(LinkType::from(model))
        })
    }

    pub async fn update_link_type(
        &self,
        link_type_id: i32,
        patch: LinkTypePatch,
    ) -> ResultEngine<LinkType> {
        let title = patch
            .title
            .as_deref()
            .map(|title| normalize_required_text(title, "link type title"))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let current = self.require_link_type(&db_tx, link_type_id).await?;
            let mut active = link_types::ActiveModel {
                id: ActiveValue::Unchanged(link_type_id),
                ..Default::default()
            };
            if let Some(title) = title {
                active.title = ActiveValue::Set(title);
            }
            if let Some(url_template) = &patch.url_template {
                active.url_template = ActiveValue::Set(url_template.trim().to_string());
            }
            if let Some(position) = patch.position {
                active.position = ActiveValue::Set(position);
            }
            if !active.is_changed() {
                return Ok(LinkType::from(current));
            }
            Ok(LinkType::from(active.update(&db_tx).await?))
        })
    }

    /// Delete a link type. Refused while any linked item still uses it.
    pub async fn delete_link_type(&self, link_type_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_link_type(&db_tx, link_type_id).await?;
            let in_use = linked_items::Entity::find()
                .filter(linked_items::Column::LinkTypeId.eq(link_type_id))
                .count(&db_tx)
                .await?;
            if in_use > 0 {
                return Err(EngineError::Conflict(format!(
                    "link type {link_type_id} is used by {in_use} linked items"
                )));
            }
            link_types::Entity::delete_by_id(link_type_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
