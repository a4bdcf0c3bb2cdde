// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::endpoint::default_domain;
use crate::orchestrator::Orchestrator;
use crate::{ClientError, CredentialFailure, CredentialStore, Outcome, Request};
use log::debug;
use reqclient_aws_v4::{Config, Credential, DefaultCredentialProvider, RequestSigner};
use reqclient_core::{Context, ProvideCredential, SignRequest};
use tokio::sync::{mpsc, oneshot};

/// Pending commands a handle can queue before senders wait.
const COMMAND_BUFFER: usize = 64;

/// The actor's state as seen between two commands.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    /// Region requests are signed for and routed to.
    pub region: String,
    /// Held credential.
    pub credential: Option<Credential>,
    /// Last credential failure.
    pub failure: Option<CredentialFailure>,
}

enum Command {
    Request {
        req: Request,
        reply: oneshot::Sender<Outcome>,
    },
    SetCredentials {
        access_key_id: String,
        secret_access_key: String,
        reply: oneshot::Sender<()>,
    },
    SetRegion {
        region: String,
        reply: oneshot::Sender<()>,
    },
    RefreshCredentials {
        reply: oneshot::Sender<Result<Credential, CredentialFailure>>,
    },
    State {
        reply: oneshot::Sender<StateSnapshot>,
    },
}

/// Handle to a client actor.
///
/// The actor runs on its own tokio task and executes commands one at a time
/// in arrival order. Handles are cheap to clone; the task stops once every
/// handle is dropped. Separate `Client::spawn` calls share no state.
///
/// The credential store starts empty: call [`Client::refresh_credentials`] or
/// [`Client::set_credentials`] before sending requests.
#[derive(Debug, Clone)]
pub struct Client {
    tx: mpsc::Sender<Command>,
}

impl Client {
    /// Spawn an actor with the default credential chain and the SigV4 signer.
    ///
    /// Region comes from env, then the shared config file.
    ///
    /// Must be called inside a tokio runtime.
    pub async fn new(ctx: Context) -> Self {
        let config = Config::default().from_env(&ctx).from_profile(&ctx).await;
        Self::spawn(
            ctx,
            config,
            DefaultCredentialProvider::new(),
            RequestSigner::new(),
        )
    }

    /// Spawn an actor with explicit collaborators.
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn(
        ctx: Context,
        config: Config,
        provider: impl ProvideCredential<Credential = Credential>,
        signer: impl SignRequest<Credential = Credential>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let actor = Actor {
            ctx,
            store: CredentialStore::new(provider),
            signer: Box::new(signer),
            region: config.region_or_default(),
            endpoint_domain: config.endpoint_domain,
            rx,
        };
        tokio::spawn(actor.run());

        Self { tx }
    }

    /// Send a request and wait for its outcome.
    pub async fn request(&self, req: Request) -> Result<Outcome, ClientError> {
        self.call(|reply| Command::Request { req, reply }).await
    }

    /// Replace the credential with a long-lived one and clear any failure.
    ///
    /// Region is kept.
    pub async fn set_credentials(
        &self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Result<(), ClientError> {
        let (access_key_id, secret_access_key) = (access_key_id.into(), secret_access_key.into());
        self.call(|reply| Command::SetCredentials {
            access_key_id,
            secret_access_key,
            reply,
        })
        .await
    }

    /// Change the region. Credential state is kept.
    pub async fn set_region(&self, region: impl Into<String>) -> Result<(), ClientError> {
        let region = region.into();
        self.call(|reply| Command::SetRegion { region, reply }).await
    }

    /// Reload the credential from the provider chain.
    pub async fn refresh_credentials(
        &self,
    ) -> Result<Result<Credential, CredentialFailure>, ClientError> {
        self.call(|reply| Command::RefreshCredentials { reply })
            .await
    }

    /// Snapshot the actor's state without changing it.
    pub async fn state(&self) -> Result<StateSnapshot, ClientError> {
        self.call(|reply| Command::State { reply }).await
    }

    /// Whether the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn call<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| ClientError::Closed)?;
        rx.await.map_err(|_| ClientError::Closed)
    }
}

struct Actor {
    ctx: Context,
    store: CredentialStore,
    signer: Box<dyn SignRequest<Credential = Credential>>,
    region: String,
    endpoint_domain: Option<String>,
    rx: mpsc::Receiver<Command>,
}

impl Actor {
    async fn run(mut self) {
        debug!("client actor started in region {}", self.region);
        while let Some(command) = self.rx.recv().await {
            self.handle(command).await;
        }
        debug!("client actor stopped");
    }

    async fn handle(&mut self, command: Command) {
        // A dropped reply receiver only means the caller stopped waiting.
        match command {
            Command::Request { req, reply } => {
                let domain = match &self.endpoint_domain {
                    Some(domain) => domain.as_str(),
                    None => default_domain(&self.region),
                };
                let outcome = Orchestrator {
                    ctx: &self.ctx,
                    store: &mut self.store,
                    signer: self.signer.as_ref(),
                    region: &self.region,
                    domain,
                }
                .run(&req)
                .await;
                let _ = reply.send(outcome);
            }
            Command::SetCredentials {
                access_key_id,
                secret_access_key,
                reply,
            } => {
                self.store.set_explicit(access_key_id, secret_access_key);
                let _ = reply.send(());
            }
            Command::SetRegion { region, reply } => {
                debug!("region changed from {} to {region}", self.region);
                self.region = region;
                let _ = reply.send(());
            }
            Command::RefreshCredentials { reply } => {
                let _ = reply.send(self.store.refresh(&self.ctx).await);
            }
            Command::State { reply } => {
                let (credential, failure) = self.store.snapshot();
                let _ = reply.send(StateSnapshot {
                    region: self.region.clone(),
                    credential,
                    failure,
                });
            }
        }
    }
}
