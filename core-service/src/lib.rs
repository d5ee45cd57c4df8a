//! Gateway service façade and bootstrap helpers.
//!
//! This crate wires the validated [`GatewayConfig`] into the document store,
//! the Universer exchange client and the orchestrators, and answers the
//! identity and membership queries the Universer service sends back to the
//! host. Desktop hosts typically enable the `desktop-shims` feature so the
//! reqwest transport is used when no HTTP client is injected.

pub mod error;
pub mod usip;

pub use error::{CoreError, Result};
pub use usip::{Directory, UnitCollaborators, UnitSubject, UserDirectory, UsipUser};

use std::path::Path;
use std::sync::Arc;

use core_exchange::{
    DocumentService, EditorHosts, ExportOrchestrator, ExportedFile, ImportOrchestrator,
    ImportRequest, PollPolicy,
};
use core_library::db::{create_pool, DatabaseConfig};
use core_library::repositories::{
    CollaboratorRepository, FileRepository, SqliteCollaboratorRepository, SqliteFileRepository,
};
use core_library::Document;
use core_runtime::config::GatewayConfig;
use provider_universer::{Credential, ExchangeClient, UniverserConnector};
use tracing::{info, instrument};

/// Database path that selects a private in-memory store
pub const IN_MEMORY_DATABASE: &str = ":memory:";

/// Aggregated handle to the stores and remote client the gateway requires.
pub struct GatewayDependencies {
    pub client: Arc<dyn ExchangeClient>,
    pub files: Arc<dyn FileRepository>,
    pub collaborators: Arc<dyn CollaboratorRepository>,
    pub users: Arc<dyn UserDirectory>,
}

impl GatewayDependencies {
    pub fn new(
        client: Arc<dyn ExchangeClient>,
        files: Arc<dyn FileRepository>,
        collaborators: Arc<dyn CollaboratorRepository>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            client,
            files,
            collaborators,
            users,
        }
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct GatewayService {
    inner: Arc<Inner>,
}

struct Inner {
    documents: DocumentService,
    importer: ImportOrchestrator,
    exporter: ExportOrchestrator,
    users: Arc<dyn UserDirectory>,
    public_host: String,
}

impl GatewayService {
    /// Open the configured database, run migrations and connect the
    /// Universer client.
    ///
    /// ```ignore
    /// let config = GatewayConfig::builder()
    ///     .universer_host("https://universer.example.com")
    ///     .database_path("/var/lib/usip/gateway.db")
    ///     .poll_max_attempts(120)
    ///     .build()?;
    /// let gateway = GatewayService::bootstrap(config, Arc::new(Directory::demo())).await?;
    /// ```
    #[instrument(skip_all, fields(universer_host = %config.universer_host))]
    pub async fn bootstrap(config: GatewayConfig, users: Arc<dyn UserDirectory>) -> Result<Self> {
        let pool = create_pool(database_config(&config)).await?;
        let client = Arc::new(UniverserConnector::from_config(&config));

        let deps = GatewayDependencies::new(
            client,
            Arc::new(SqliteFileRepository::new(pool.clone())),
            Arc::new(SqliteCollaboratorRepository::new(pool)),
            users,
        );

        let service = Self::new(&config, deps)?;
        info!("Gateway service ready");
        Ok(service)
    }

    /// Assemble the service from explicit dependencies.
    pub fn new(config: &GatewayConfig, deps: GatewayDependencies) -> Result<Self> {
        let policy = PollPolicy::from_config(config)?;
        let GatewayDependencies {
            client,
            files,
            collaborators,
            users,
        } = deps;

        let inner = Inner {
            documents: DocumentService::new(
                client.clone(),
                files.clone(),
                collaborators.clone(),
                EditorHosts::new(config.doc_host.clone(), config.sheet_host.clone()),
            ),
            importer: ImportOrchestrator::new(
                client.clone(),
                files.clone(),
                collaborators.clone(),
                policy,
            ),
            exporter: ExportOrchestrator::new(client, files, collaborators, policy),
            users,
            public_host: config.public_host.trim_end_matches('/').to_string(),
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Catalogue operations: create, list, share, remove.
    pub fn documents(&self) -> &DocumentService {
        &self.inner.documents
    }

    pub async fn import(&self, request: ImportRequest, credential: &Credential) -> Result<Document> {
        Ok(self.inner.importer.import(request, credential).await?)
    }

    pub async fn export(
        &self,
        document_id: i64,
        caller_user_id: &str,
        credential: &Credential,
    ) -> Result<ExportedFile> {
        Ok(self
            .inner
            .exporter
            .export(document_id, caller_user_id, credential)
            .await?)
    }

    pub fn editor_url(&self, document: &Document) -> Option<String> {
        self.inner.documents.editor_url(document)
    }

    /// Avatar URL served by this gateway for `user_id`
    pub fn avatar_url(&self, user_id: &str) -> String {
        format!("{}/user/avatar/{}", self.inner.public_host, user_id)
    }

    /// Profile of the already-authenticated caller
    pub fn credential_user(&self, user_id: &str) -> Option<UsipUser> {
        self.profile(user_id)
    }

    /// Profiles of the known users among `user_ids`, in request order
    pub fn users_info(&self, user_ids: &[String]) -> Vec<UsipUser> {
        user_ids.iter().filter_map(|id| self.profile(id)).collect()
    }

    /// Role text the user holds on the document behind `unit_id`
    pub async fn role(&self, unit_id: &str, user_id: &str) -> Result<Option<String>> {
        Ok(self.inner.documents.role_for_unit(unit_id, user_id).await?)
    }

    /// Stored collaborators of each known unit. Unknown units and users
    /// without a profile are skipped.
    pub async fn collaborators_for_units(
        &self,
        unit_ids: &[String],
    ) -> Result<Vec<UnitCollaborators>> {
        let mut result = Vec::with_capacity(unit_ids.len());
        for unit_id in unit_ids {
            let Some(collaborators) = self
                .inner
                .documents
                .collaborators_by_unit_id(unit_id)
                .await?
            else {
                continue;
            };

            let subjects = collaborators
                .iter()
                .filter_map(|c| {
                    self.profile(&c.user_id)
                        .map(|user| UnitSubject::new(c.role.clone(), &user))
                })
                .collect();
            result.push(UnitCollaborators {
                unit_id: unit_id.clone(),
                subjects,
            });
        }
        Ok(result)
    }

    fn profile(&self, user_id: &str) -> Option<UsipUser> {
        self.inner.users.user(user_id).map(|user| UsipUser {
            avatar: self.avatar_url(&user.user_id),
            ..user
        })
    }
}

fn database_config(config: &GatewayConfig) -> DatabaseConfig {
    if config.database_path == Path::new(IN_MEMORY_DATABASE) {
        DatabaseConfig::in_memory()
    } else {
        DatabaseConfig::new(&config.database_path).max_connections(config.database_max_connections)
    }
}
