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

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use reqclient::{Client, Config, Context, Credential};
use reqclient_aws_v4::{RequestSigner, AWS_ACCESS_KEY_ID};
use reqclient_core::{Error, HttpSend, ProvideCredential, Result, StaticEnv};
use tokio::sync::Semaphore;

/// Transport that records requests and replays queued responses.
///
/// Replies `200` with an empty body once the queue runs dry. A gated
/// transport records each request, then waits for a permit before replying.
#[derive(Debug, Clone, Default)]
pub struct RecordingHttpSend {
    requests: Arc<Mutex<Vec<http::Request<Bytes>>>>,
    responses: Arc<Mutex<VecDeque<Result<http::Response<Bytes>>>>>,
    gate: Option<Arc<Semaphore>>,
}

impl RecordingHttpSend {
    /// A transport holding every reply until `gate` hands out a permit.
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Default::default()
        }
    }

    pub fn respond(&self, resp: Result<http::Response<Bytes>>) -> &Self {
        self.responses.lock().unwrap().push_back(resp);
        self
    }

    pub fn respond_with(&self, status: u16, content_type: Option<&str>, body: &str) -> &Self {
        let mut builder = http::Response::builder().status(status);
        if let Some(v) = content_type {
            builder = builder.header(http::header::CONTENT_TYPE, v);
        }
        self.respond(Ok(builder.body(Bytes::from(body.to_string())).unwrap()))
    }

    pub fn requests(&self) -> Vec<http::Request<Bytes>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpSend for RecordingHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.requests.lock().unwrap().push(req);
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| Error::unexpected("transport gate closed").with_source(e))?
                .forget();
        }
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(http::Response::new(Bytes::new())))
    }
}

/// Provider returning scripted results in order, then nothing.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    calls: Arc<AtomicUsize>,
    script: Arc<Mutex<VecDeque<Result<Option<Credential>>>>>,
}

impl ScriptedProvider {
    pub fn then(&self, result: Result<Option<Credential>>) -> &Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProvideCredential for ScriptedProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Credential>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }
}

pub struct Harness {
    pub client: Client,
    pub http: RecordingHttpSend,
    pub provider: ScriptedProvider,
}

/// Spawn a client in `us-east-1` over mock collaborators.
///
/// The environment carries an access key that must never be picked up.
pub fn spawn_client() -> Harness {
    spawn_client_with(RecordingHttpSend::default())
}

/// Same as [`spawn_client`] over the given transport.
pub fn spawn_client_with(http: RecordingHttpSend) -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();

    let provider = ScriptedProvider::default();
    let ctx = Context::new().with_http_send(http.clone()).with_env(StaticEnv {
        home_dir: None,
        envs: HashMap::from([(AWS_ACCESS_KEY_ID.to_string(), "env_ak".to_string())]),
    });

    let client = Client::spawn(
        ctx,
        Config::default().with_region("us-east-1"),
        provider.clone(),
        RequestSigner::new(),
    );

    Harness {
        client,
        http,
        provider,
    }
}
