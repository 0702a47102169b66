//! In-memory remote store for exercising commits without a network.

use std::sync::Mutex;

use tokio::sync::Notify;

use super::transport::{EntryTransport, TransportError, TransportResult};
use crate::models::{AccessKey, EntryId, EntryWire, LinkMetadata, RepoMetaPatch, RepoWire};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Fetch,
    Create,
    Update,
    Delete,
    UpdateRepo,
    Metadata,
}

/// Every request the transport received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Fetch,
    Create(Vec<EntryWire>),
    Update(Vec<EntryWire>),
    Delete(Vec<EntryId>),
    UpdateRepo(RepoMetaPatch),
    Metadata(String),
}

pub(crate) struct MemoryTransport {
    repo: Mutex<RepoWire>,
    next_id: Mutex<i64>,
    metadata: Mutex<LinkMetadata>,
    calls: Mutex<Vec<Call>>,
    fail_on: Mutex<Option<Op>>,
    pause_on: Mutex<Option<Op>>,
    paused: Notify,
    resume: Notify,
}

impl MemoryTransport {
    pub fn new(key: &str) -> Self {
        Self {
            repo: Mutex::new(RepoWire {
                access_key: AccessKey::parse(key).unwrap(),
                title: Some("Test Repo".to_string()),
                description: Some("Test Desc".to_string()),
                is_private: false,
                last_visited: None,
                entries: Vec::new(),
            }),
            next_id: Mutex::new(1),
            metadata: Mutex::new(LinkMetadata::default()),
            calls: Mutex::new(Vec::new()),
            fail_on: Mutex::new(None),
            pause_on: Mutex::new(None),
            paused: Notify::new(),
            resume: Notify::new(),
        }
    }

    /// Store with `count` dividers already created server-side (ids 1..=count).
    pub fn seeded(key: &str, count: usize) -> Self {
        let transport = Self::new(key);
        let entries: Vec<EntryWire> = (0..count)
            .map(|sequence| divider_wire(&format!("Divider {sequence}"), sequence))
            .collect();
        transport.store(&entries);
        transport
    }

    pub fn key(&self) -> AccessKey {
        self.repo.lock().unwrap().access_key.clone()
    }

    /// Put an entry on the server verbatim, bypassing validation.
    pub fn insert_raw(&self, entry: EntryWire) {
        if let Some(id) = entry.id {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id = (*next_id).max(id.get() + 1);
        }
        self.repo.lock().unwrap().entries.push(entry);
    }

    pub fn server_entries(&self) -> Vec<EntryWire> {
        self.repo.lock().unwrap().entries.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn fail_on(&self, op: Op) {
        *self.fail_on.lock().unwrap() = Some(op);
    }

    pub fn clear_failure(&self) {
        *self.fail_on.lock().unwrap() = None;
    }

    /// Hold the next `op` call until [`Self::resume`] is called.
    pub fn pause_on(&self, op: Op) {
        *self.pause_on.lock().unwrap() = Some(op);
    }

    pub async fn wait_until_paused(&self) {
        self.paused.notified().await;
    }

    pub fn resume(&self) {
        self.resume.notify_one();
    }

    pub fn set_metadata(&self, metadata: LinkMetadata) {
        *self.metadata.lock().unwrap() = metadata;
    }

    fn store(&self, entries: &[EntryWire]) {
        let mut next_id = self.next_id.lock().unwrap();
        let mut repo = self.repo.lock().unwrap();
        for entry in entries {
            let mut stored = entry.clone();
            stored.id = Some(EntryId::new(*next_id));
            *next_id += 1;
            repo.entries.push(stored);
        }
    }

    async fn gate(&self, op: Op, call: Call) -> TransportResult<()> {
        let pause = {
            let mut pause_on = self.pause_on.lock().unwrap();
            if *pause_on == Some(op) {
                *pause_on = None;
                true
            } else {
                false
            }
        };
        if pause {
            self.paused.notify_one();
            self.resume.notified().await;
        }

        self.calls.lock().unwrap().push(call);
        let fail = *self.fail_on.lock().unwrap() == Some(op);
        if fail {
            return Err(TransportError::Unavailable(format!("{op:?} rejected")));
        }
        Ok(())
    }
}

pub(crate) fn divider_wire(title: &str, sequence: usize) -> EntryWire {
    EntryWire {
        id: None,
        title: title.to_string(),
        description: None,
        image: None,
        url: None,
        kind: "divider".to_string(),
        rating: 0,
        sequence: Some(sequence),
    }
}

impl EntryTransport for MemoryTransport {
    async fn fetch_repo(&self, _key: &AccessKey) -> TransportResult<RepoWire> {
        self.gate(Op::Fetch, Call::Fetch).await?;
        Ok(self.repo.lock().unwrap().clone())
    }

    async fn create_entries(&self, _key: &AccessKey, entries: &[EntryWire]) -> TransportResult<()> {
        self.gate(Op::Create, Call::Create(entries.to_vec())).await?;
        self.store(entries);
        Ok(())
    }

    async fn update_entries(&self, _key: &AccessKey, entries: &[EntryWire]) -> TransportResult<()> {
        self.gate(Op::Update, Call::Update(entries.to_vec())).await?;
        let mut repo = self.repo.lock().unwrap();
        for entry in entries {
            let stored = repo
                .entries
                .iter_mut()
                .find(|stored| stored.id == entry.id)
                .ok_or_else(|| TransportError::Api {
                    status: 400,
                    message: format!("no entry {:?}", entry.id),
                })?;
            *stored = entry.clone();
        }
        Ok(())
    }

    async fn delete_entries(&self, _key: &AccessKey, ids: &[EntryId]) -> TransportResult<()> {
        self.gate(Op::Delete, Call::Delete(ids.to_vec())).await?;
        self.repo
            .lock()
            .unwrap()
            .entries
            .retain(|entry| !entry.id.is_some_and(|id| ids.contains(&id)));
        Ok(())
    }

    async fn update_repo(&self, _key: &AccessKey, patch: &RepoMetaPatch) -> TransportResult<()> {
        self.gate(Op::UpdateRepo, Call::UpdateRepo(patch.clone()))
            .await?;
        let mut repo = self.repo.lock().unwrap();
        if let Some(title) = &patch.title {
            repo.title = Some(title.clone());
        }
        if let Some(description) = &patch.description {
            repo.description = Some(description.clone());
        }
        if let Some(is_private) = patch.is_private {
            repo.is_private = is_private;
        }
        Ok(())
    }

    async fn fetch_link_metadata(&self, url: &str) -> TransportResult<LinkMetadata> {
        self.gate(Op::Metadata, Call::Metadata(url.to_string()))
            .await?;
        Ok(self.metadata.lock().unwrap().clone())
    }
}
