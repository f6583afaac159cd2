#![allow(dead_code)]

use async_trait::async_trait;
use imagegen_gateway::{
    Error, Result,
    cloudflare::{ImageModel, SchemaClient},
    storage::{BlobStore, ListOptions, ListPage, ObjectEntry, StoredObject},
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// In-memory bucket that pages its listing by key order, like R2.
#[derive(Debug, Default)]
pub struct FakeBlobStore {
    pub objects: Arc<Mutex<BTreeMap<String, (Vec<u8>, Option<String>)>>>,
    pub puts: Arc<Mutex<Vec<String>>>,
    pub list_calls: Arc<Mutex<Vec<ListOptions>>>,
    pub get_error: Option<String>,
    pub put_error: Option<String>,
    /// Fail the n-th list call (0-based).
    pub fail_list_call: Option<usize>,
}

impl FakeBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, key: &str, body: &[u8], content_type: Option<&str>) -> Self {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            (body.to_vec(), content_type.map(str::to_string)),
        );
        self
    }

    pub fn with_objects(self, count: usize) -> Self {
        {
            let mut objects = self.objects.lock().unwrap();
            for i in 0..count {
                objects.insert(format!("image-{:05}.jpeg", i), (vec![i as u8], None));
            }
        }
        self
    }

    pub fn with_get_error(mut self, error: &str) -> Self {
        self.get_error = Some(error.to_string());
        self
    }

    pub fn with_put_error(mut self, error: &str) -> Self {
        self.put_error = Some(error.to_string());
        self
    }

    pub fn failing_list_call(mut self, call: usize) -> Self {
        self.fail_list_call = Some(call);
        self
    }

    pub fn put_keys(&self) -> Vec<String> {
        self.puts.lock().unwrap().clone()
    }

    pub fn list_call_count(&self) -> usize {
        self.list_calls.lock().unwrap().len()
    }

    pub fn stored(&self, key: &str) -> Option<(Vec<u8>, Option<String>)> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        if let Some(ref error) = self.get_error {
            return Err(Error::storage(error.clone()));
        }
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(body, ct)| StoredObject::from_bytes(body.clone(), ct.clone())))
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        self.puts.lock().unwrap().push(key.to_string());
        if let Some(ref error) = self.put_error {
            return Err(Error::storage(error.clone()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (body, Some(content_type.to_string())));
        Ok(())
    }

    async fn list(&self, options: ListOptions) -> Result<ListPage> {
        let call = {
            let mut calls = self.list_calls.lock().unwrap();
            calls.push(options.clone());
            calls.len() - 1
        };
        if self.fail_list_call == Some(call) {
            return Err(Error::storage("list failed"));
        }

        let objects = self.objects.lock().unwrap();
        let start = options
            .cursor
            .as_deref()
            .map(|c| c.parse::<usize>().expect("cursor is an offset"))
            .unwrap_or(0);
        let limit = options.limit as usize;
        let page: Vec<ObjectEntry> = objects
            .iter()
            .skip(start)
            .take(limit)
            .map(|(key, (body, ct))| ObjectEntry {
                key: key.clone(),
                size: body.len() as i64,
                etag: None,
                uploaded: None,
                http_metadata: ct.as_ref().map(|ct| imagegen_gateway::storage::HttpMetadata {
                    content_type: Some(ct.clone()),
                }),
            })
            .collect();

        let next = start + page.len();
        let truncated = next < objects.len();
        Ok(ListPage {
            objects: page,
            truncated,
            cursor: truncated.then(|| next.to_string()),
        })
    }
}

/// Image model returning a canned output and recording its calls.
#[derive(Debug)]
pub struct FakeImageModel {
    pub output: Value,
    pub error: Option<String>,
    pub calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl FakeImageModel {
    pub fn returning(output: Value) -> Self {
        Self {
            output,
            error: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            output: Value::Null,
            error: Some(error.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageModel for FakeImageModel {
    async fn run(&self, model: &str, input: Value) -> Result<Value> {
        self.calls.lock().unwrap().push((model.to_string(), input));
        if let Some(ref error) = self.error {
            return Err(Error::inference(error.clone()));
        }
        Ok(self.output.clone())
    }
}

/// Schema client with a fixed reply.
#[derive(Debug)]
pub struct FakeSchemaClient {
    pub reply: std::result::Result<Value, (Option<u16>, String, Option<Value>)>,
    pub calls: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl FakeSchemaClient {
    pub fn returning(schema: Value) -> Self {
        Self {
            reply: Ok(schema),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(status: Option<u16>, message: &str, details: Option<Value>) -> Self {
        Self {
            reply: Err((status, message.to_string(), details)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SchemaClient for FakeSchemaClient {
    async fn get(&self, account_id: &str, model: &str, api_token: &str) -> Result<Value> {
        self.calls.lock().unwrap().push((
            account_id.to_string(),
            model.to_string(),
            api_token.to_string(),
        ));
        match &self.reply {
            Ok(schema) => Ok(schema.clone()),
            Err((status, message, details)) => {
                Err(Error::vendor(*status, message.clone(), details.clone()))
            }
        }
    }
}
