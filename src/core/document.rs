//! Document business logic - uploaded files attached to events.

use crate::{
    core::event::require_event,
    entities::{Document, document},
    errors::{Error, Result},
    storage::LocalStorage,
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::warn;

const DOCUMENT_FOLDER: &str = "documents";

/// Stores `bytes` and records the document.
pub async fn upload_document(
    db: &DatabaseConnection,
    storage: &LocalStorage,
    event_id: Option<i64>,
    name: &str,
    content_type: Option<String>,
    bytes: &[u8],
) -> Result<document::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Document name cannot be empty"));
    }
    if bytes.is_empty() {
        return Err(Error::validation("Document is empty"));
    }
    if let Some(event_id) = event_id {
        require_event(db, event_id).await?;
    }

    let stored = storage.upload(DOCUMENT_FOLDER, name, bytes).await?;
    let insert = document::ActiveModel {
        event_id: Set(event_id),
        name: Set(name.to_string()),
        storage_path: Set(stored.path.clone()),
        file_url: Set(stored.url),
        content_type: Set(content_type),
        uploaded_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await;

    match insert {
        Ok(model) => Ok(model),
        Err(err) => {
            storage.remove(&stored.path).await.ok();
            Err(err.into())
        }
    }
}

/// Documents newest first, optionally only those of one event.
pub async fn list_documents(
    db: &DatabaseConnection,
    event_id: Option<i64>,
) -> Result<Vec<document::Model>> {
    let mut query = Document::find().order_by_desc(document::Column::UploadedAt);
    if let Some(event_id) = event_id {
        query = query.filter(document::Column::EventId.eq(event_id));
    }
    query.all(db).await.map_err(Into::into)
}

/// Deletes the row and then the stored object.
pub async fn delete_document(
    db: &DatabaseConnection,
    storage: &LocalStorage,
    document_id: i64,
) -> Result<()> {
    let doc = Document::find_by_id(document_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Document", document_id))?;
    let path = doc.storage_path.clone();
    doc.delete(db).await?;

    if let Err(err) = storage.remove(&path).await {
        warn!(%path, error = %err, "Stored object left behind");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_upload_list_delete() -> Result<()> {
        let db = setup_test_db().await?;
        let storage = test_storage();
        let event = create_test_event(&db, "Gala").await?;

        let doc = upload_document(
            &db,
            &storage,
            Some(event.id),
            "floor plan.png",
            Some("image/png".to_string()),
            b"png",
        )
        .await?;
        assert!(doc.file_url.starts_with("/files/documents/"));
        assert_eq!(list_documents(&db, Some(event.id)).await?.len(), 1);
        assert!(list_documents(&db, Some(event.id + 1)).await?.is_empty());

        delete_document(&db, &storage, doc.id).await?;
        assert!(list_documents(&db, None).await?.is_empty());
        assert!(storage.read(&doc.storage_path).await.is_err());

        tokio::fs::remove_dir_all(storage.root()).await.ok();
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let storage = test_storage();
        let result = upload_document(&db, &storage, None, "x.pdf", None, b"").await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }
}
