//! Document catalogue operations: creation, listing, membership changes and
//! removal, all gated by [`PermissionGate`] where the caller's role matters.

use crate::error::{ExchangeError, Result};
use crate::permission::{Action, PermissionGate};
use core_library::repositories::{CollaboratorRepository, FileRepository};
use core_library::{
    Collaborator, Document, DocumentKind, LibraryError, NewCollaborator, NewDocument, Role,
};
use provider_universer::{Credential, ExchangeClient};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Hosts of the browser editors a document opens in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorHosts {
    pub doc_host: String,
    pub sheet_host: String,
}

impl EditorHosts {
    pub fn new(doc_host: impl Into<String>, sheet_host: impl Into<String>) -> Self {
        Self {
            doc_host: doc_host.into(),
            sheet_host: sheet_host.into(),
        }
    }

    /// Editor link for `document`, or `None` for an unknown kind
    pub fn url_for(&self, document: &Document) -> Option<String> {
        let host = match document.kind()? {
            DocumentKind::Doc => &self.doc_host,
            DocumentKind::Sheet => &self.sheet_host,
        };
        Some(format!(
            "{}/?type={}&unit={}",
            host.trim_end_matches('/'),
            document.unit_type,
            document.unit_id
        ))
    }
}

/// Reject a blank document name before anything is created remotely.
pub(crate) fn require_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(LibraryError::InvalidInput {
            field: "Document".to_string(),
            message: "Document name cannot be empty".to_string(),
        }
        .into());
    }
    Ok(())
}

/// Record a freshly created remote unit locally with `owner` as its owner.
///
/// The remote unit is left in place if either write fails.
pub(crate) async fn register_document(
    files: &dyn FileRepository,
    collaborators: &dyn CollaboratorRepository,
    name: &str,
    unit_id: &str,
    unit_type: i64,
    owner_user_id: &str,
) -> Result<Document> {
    let registered = async {
        let document = files
            .create(&NewDocument::new(name, unit_id, unit_type))
            .await?;
        collaborators
            .create(&NewCollaborator::new(document.id, owner_user_id, Role::Owner))
            .await?;
        Ok::<_, ExchangeError>(document)
    }
    .await;

    match registered {
        Ok(document) => {
            info!(document_id = document.id, unit_id, "Document registered");
            Ok(document)
        }
        Err(e) => {
            error!(unit_id, error = %e, "Local registration failed, remote unit orphaned");
            Err(e)
        }
    }
}

pub struct DocumentService {
    client: Arc<dyn ExchangeClient>,
    files: Arc<dyn FileRepository>,
    collaborators: Arc<dyn CollaboratorRepository>,
    gate: PermissionGate,
    editors: EditorHosts,
}

impl DocumentService {
    pub fn new(
        client: Arc<dyn ExchangeClient>,
        files: Arc<dyn FileRepository>,
        collaborators: Arc<dyn CollaboratorRepository>,
        editors: EditorHosts,
    ) -> Self {
        let gate = PermissionGate::new(collaborators.clone());
        Self {
            client,
            files,
            collaborators,
            gate,
            editors,
        }
    }

    /// Create an empty remote unit and register it with `owner_user_id` as
    /// owner.
    #[instrument(skip(self, credential))]
    pub async fn create(
        &self,
        name: &str,
        kind: DocumentKind,
        owner_user_id: &str,
        credential: &Credential,
    ) -> Result<Document> {
        require_name(name)?;

        let unit_id = self
            .client
            .create_unit(name, kind.as_str(), owner_user_id, credential)
            .await?;

        register_document(
            self.files.as_ref(),
            self.collaborators.as_ref(),
            name,
            &unit_id,
            kind.code(),
            owner_user_id,
        )
        .await
    }

    /// Documents the user collaborates on, in id order
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Document>> {
        let ids: Vec<i64> = self
            .collaborators
            .get_by_user_id(user_id)
            .await?
            .into_iter()
            .map(|c| c.file_id)
            .collect();

        Ok(self.files.batch_get(&ids).await?)
    }

    pub async fn get(&self, document_id: i64) -> Result<Option<Document>> {
        Ok(self.files.get(document_id).await?)
    }

    pub async fn collaborators(&self, document_id: i64) -> Result<Vec<Collaborator>> {
        Ok(self.collaborators.get_by_file_id(document_id).await?)
    }

    /// `None` when no document carries `unit_id`
    pub async fn collaborators_by_unit_id(
        &self,
        unit_id: &str,
    ) -> Result<Option<Vec<Collaborator>>> {
        match self.files.get_by_unit_id(unit_id).await? {
            Some(document) => Ok(Some(self.collaborators(document.id).await?)),
            None => Ok(None),
        }
    }

    pub async fn role_for_unit(&self, unit_id: &str, user_id: &str) -> Result<Option<String>> {
        let Some(document) = self.files.get_by_unit_id(unit_id).await? else {
            return Ok(None);
        };

        Ok(self
            .collaborators
            .get(document.id, user_id)
            .await?
            .map(|c| c.role))
    }

    pub async fn check_permission(&self, document_id: i64, user_id: &str, action: Action) -> bool {
        self.gate
            .check_permission(document_id, user_id, action)
            .await
    }

    /// Grant `role` on a document to each of `user_ids`. Existing rows take
    /// the new role.
    #[instrument(skip(self))]
    pub async fn join(
        &self,
        caller_user_id: &str,
        document_id: i64,
        user_ids: &[String],
        role: Role,
    ) -> Result<()> {
        self.require(document_id, caller_user_id, Action::Join)
            .await?;

        let rows: Vec<NewCollaborator> = user_ids
            .iter()
            .map(|user_id| NewCollaborator::new(document_id, user_id.as_str(), role))
            .collect();
        self.collaborators.insert_or_update(&rows).await?;

        info!(count = rows.len(), role = %role, "Collaborators joined");
        Ok(())
    }

    /// Drop the caller's membership of every listed document.
    ///
    /// Nothing is removed unless the caller owns all of them.
    #[instrument(skip(self))]
    pub async fn remove(&self, caller_user_id: &str, document_ids: &[i64]) -> Result<u64> {
        for &document_id in document_ids {
            self.require(document_id, caller_user_id, Action::Delete)
                .await?;
        }

        let removed = self
            .collaborators
            .batch_delete(caller_user_id, document_ids)
            .await?;
        info!(removed, "Documents removed");
        Ok(removed)
    }

    pub fn editor_url(&self, document: &Document) -> Option<String> {
        self.editors.url_for(document)
    }

    async fn require(&self, document_id: i64, user_id: &str, action: Action) -> Result<()> {
        if self.check_permission(document_id, user_id, action).await {
            Ok(())
        } else {
            Err(ExchangeError::Forbidden {
                user_id: user_id.to_string(),
                document_id,
                action,
            })
        }
    }
}
