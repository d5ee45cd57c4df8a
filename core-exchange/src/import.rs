//! Import flow: upload a local file, convert it with a Universer import task
//! and register the resulting unit with the caller as owner.

use crate::documents::{register_document, require_name};
use crate::error::Result;
use crate::task::{poll_until_done, PollPolicy};
use bytes::Bytes;
use core_library::models::display_name;
use core_library::repositories::{CollaboratorRepository, FileRepository};
use core_library::{Document, DocumentKind};
use provider_universer::{Credential, ExchangeClient, ExchangeDirection};
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

/// A local file to convert into a collaborative document
#[derive(Clone)]
pub struct ImportRequest {
    pub file_name: String,
    pub file_size: u64,
    pub content: Bytes,
    pub kind: DocumentKind,
    pub owner_user_id: String,
}

impl ImportRequest {
    pub fn new(
        file_name: impl Into<String>,
        content: Bytes,
        kind: DocumentKind,
        owner_user_id: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            file_size: content.len() as u64,
            content,
            kind,
            owner_user_id: owner_user_id.into(),
        }
    }
}

impl fmt::Debug for ImportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportRequest")
            .field("file_name", &self.file_name)
            .field("file_size", &self.file_size)
            .field("kind", &self.kind)
            .field("owner_user_id", &self.owner_user_id)
            .finish()
    }
}

/// Upload → start import → poll → register
pub struct ImportOrchestrator {
    client: Arc<dyn ExchangeClient>,
    files: Arc<dyn FileRepository>,
    collaborators: Arc<dyn CollaboratorRepository>,
    policy: PollPolicy,
}

impl ImportOrchestrator {
    pub fn new(
        client: Arc<dyn ExchangeClient>,
        files: Arc<dyn FileRepository>,
        collaborators: Arc<dyn CollaboratorRepository>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            client,
            files,
            collaborators,
            policy,
        }
    }

    #[instrument(skip(self, request, credential), fields(file_name = %request.file_name, kind = %request.kind))]
    pub async fn import(&self, request: ImportRequest, credential: &Credential) -> Result<Document> {
        let ImportRequest {
            file_name,
            file_size,
            content,
            kind,
            owner_user_id,
        } = request;

        let name = display_name(&file_name);
        require_name(name)?;

        let file_id = self
            .client
            .upload_file(&file_name, file_size, content, credential)
            .await?;
        let task_id = self
            .client
            .start_import(&file_id, kind.code(), credential)
            .await?;
        info!(file_id = %file_id, task_id = %task_id, "Import task started");

        let unit_id = poll_until_done(
            self.client.as_ref(),
            &task_id,
            ExchangeDirection::Import,
            &self.policy,
            credential,
        )
        .await?;

        register_document(
            self.files.as_ref(),
            self.collaborators.as_ref(),
            name,
            &unit_id,
            kind.code(),
            &owner_user_id,
        )
        .await
    }
}
