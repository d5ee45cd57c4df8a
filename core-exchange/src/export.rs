//! Export flow: convert a registered unit back into a file and stream it to
//! any collaborator of the document.

use crate::error::{ExchangeError, Result};
use crate::task::{poll_until_done, PollPolicy};
use bridge_traits::http::ByteStream;
use core_library::repositories::{CollaboratorRepository, FileRepository};
use provider_universer::{Credential, ExchangeClient, ExchangeDirection};
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

/// A converted file ready to be streamed to the caller
pub struct ExportedFile {
    pub file_name: String,
    pub stream: ByteStream,
}

impl fmt::Debug for ExportedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportedFile")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

pub struct ExportOrchestrator {
    client: Arc<dyn ExchangeClient>,
    files: Arc<dyn FileRepository>,
    collaborators: Arc<dyn CollaboratorRepository>,
    policy: PollPolicy,
}

impl ExportOrchestrator {
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

    /// Export a document the caller collaborates on, in any role.
    ///
    /// Callers without a collaborator row get [`ExchangeError::NotFound`],
    /// the same as for a missing document.
    #[instrument(skip(self, credential))]
    pub async fn export(
        &self,
        document_id: i64,
        caller_user_id: &str,
        credential: &Credential,
    ) -> Result<ExportedFile> {
        let not_found = || ExchangeError::NotFound {
            entity: "document",
            id: document_id.to_string(),
        };

        let document = self.files.get(document_id).await?.ok_or_else(not_found)?;
        self.collaborators
            .get(document_id, caller_user_id)
            .await?
            .ok_or_else(not_found)?;

        let task_id = self
            .client
            .start_export(&document.unit_id, document.unit_type, credential)
            .await?;
        info!(unit_id = %document.unit_id, task_id = %task_id, "Export task started");

        let file_id = poll_until_done(
            self.client.as_ref(),
            &task_id,
            ExchangeDirection::Export,
            &self.policy,
            credential,
        )
        .await?;

        let stream = self.client.fetch_file(&file_id, credential).await?;

        Ok(ExportedFile {
            file_name: document.export_file_name(),
            stream,
        })
    }
}
