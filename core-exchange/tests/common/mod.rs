#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::http::ByteStream;
use bytes::Bytes;
use core_exchange::{
    DocumentService, EditorHosts, ExportOrchestrator, ImportOrchestrator, PollPolicy,
};
use core_library::db::create_test_pool;
use core_library::repositories::{
    CollaboratorRepository, FileRepository, SqliteCollaboratorRepository, SqliteFileRepository,
};
use core_library::{Document, NewCollaborator, NewDocument, Role};
use mockall::mock;
use provider_universer::{Credential, ExchangeClient, ExchangeDirection, Result, TaskPoll};
use std::sync::Arc;
use std::time::Duration;

mock! {
    pub Exchange {}

    #[async_trait]
    impl ExchangeClient for Exchange {
        async fn create_unit(
            &self,
            name: &str,
            kind: &str,
            owner_user_id: &str,
            credential: &Credential,
        ) -> Result<String>;

        async fn upload_file(
            &self,
            file_name: &str,
            size: u64,
            content: Bytes,
            credential: &Credential,
        ) -> Result<String>;

        async fn start_import(
            &self,
            file_id: &str,
            kind_code: i64,
            credential: &Credential,
        ) -> Result<String>;

        async fn start_export(
            &self,
            unit_id: &str,
            kind_code: i64,
            credential: &Credential,
        ) -> Result<String>;

        async fn poll_task(
            &self,
            task_id: &str,
            direction: ExchangeDirection,
            credential: &Credential,
        ) -> Result<TaskPoll>;

        async fn fetch_file(&self, file_id: &str, credential: &Credential) -> Result<ByteStream>;
    }
}

pub struct Store {
    pub files: Arc<dyn FileRepository>,
    pub collaborators: Arc<dyn CollaboratorRepository>,
}

impl Store {
    pub async fn new() -> Self {
        let pool = create_test_pool().await.unwrap();
        Self {
            files: Arc::new(SqliteFileRepository::new(pool.clone())),
            collaborators: Arc::new(SqliteCollaboratorRepository::new(pool)),
        }
    }

    /// Insert a document with the given members directly, bypassing the
    /// remote service
    pub async fn seed(&self, unit_id: &str, unit_type: i64, members: &[(&str, Role)]) -> Document {
        let document = self
            .files
            .create(&NewDocument::new("Quarterly", unit_id, unit_type))
            .await
            .unwrap();
        for (user_id, role) in members {
            self.collaborators
                .create(&NewCollaborator::new(document.id, *user_id, *role))
                .await
                .unwrap();
        }
        document
    }

    pub fn importer(&self, client: MockExchange, policy: PollPolicy) -> ImportOrchestrator {
        ImportOrchestrator::new(
            Arc::new(client),
            self.files.clone(),
            self.collaborators.clone(),
            policy,
        )
    }

    pub fn exporter(&self, client: MockExchange, policy: PollPolicy) -> ExportOrchestrator {
        ExportOrchestrator::new(
            Arc::new(client),
            self.files.clone(),
            self.collaborators.clone(),
            policy,
        )
    }

    pub fn documents(&self, client: MockExchange) -> DocumentService {
        DocumentService::new(
            Arc::new(client),
            self.files.clone(),
            self.collaborators.clone(),
            EditorHosts::new("https://doc.example.com", "https://sheet.example.com"),
        )
    }
}

pub fn credential() -> Credential {
    Credential::new("session=abc123")
}

pub fn fast_policy(max_attempts: u32) -> PollPolicy {
    PollPolicy::attempts(Duration::from_millis(1), max_attempts).unwrap()
}

pub fn stream(bytes: &'static [u8]) -> ByteStream {
    Box::new(std::io::Cursor::new(bytes))
}
