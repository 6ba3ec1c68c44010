//! In-memory remote store for engine tests.
//!
//! Stores a flat id-keyed node table with parent links and byte content,
//! enough to exercise path resolution, listings, uploads, downloads,
//! trash and quota without a network.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use md5::{Digest, Md5};
use tokio::sync::mpsc;

use drivesync_core::domain::paths;
use drivesync_core::ports::{
    AboutInfo, ByteStream, EntryStream, PermissionInfo, PermissionRequest, RemoteStore,
    UploadBody, UploadRequest,
};
use drivesync_core::{ContentSource, Entry, RemoteError};

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub title: String,
    pub parent: Option<String>,
    pub is_dir: bool,
    pub content: Vec<u8>,
    pub mtime: DateTime<Utc>,
    pub trashed: bool,
    /// Server-native documents: export mime → URL, no direct download.
    pub export_links: BTreeMap<String, String>,
}

struct State {
    nodes: HashMap<String, Node>,
    next_id: u64,
    quota_used: u64,
    quota_total: u64,
}

pub struct FakeRemote {
    state: Mutex<State>,
}

pub fn md5_hex(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(32);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

impl FakeRemote {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            "root".to_string(),
            Node {
                id: "root".to_string(),
                title: "My Drive".to_string(),
                parent: None,
                is_dir: true,
                content: Vec::new(),
                mtime: ts(0),
                trashed: false,
                export_links: BTreeMap::new(),
            },
        );
        Self {
            state: Mutex::new(State {
                nodes,
                next_id: 1,
                quota_used: 0,
                quota_total: 1 << 40,
            }),
        }
    }

    pub fn set_quota(&self, used: u64, total: u64) {
        let mut state = self.state.lock().unwrap();
        state.quota_used = used;
        state.quota_total = total;
    }

    /// Seeds a folder under `parent` and returns its id.
    pub fn add_folder(&self, parent: &str, title: &str, mtime_secs: i64) -> String {
        self.add_node(parent, title, true, Vec::new(), mtime_secs)
    }

    /// Seeds a file under `parent` and returns its id.
    pub fn add_file(&self, parent: &str, title: &str, content: &[u8], mtime_secs: i64) -> String {
        self.add_node(parent, title, false, content.to_vec(), mtime_secs)
    }

    /// Seeds a server-native document: no direct download, one export
    /// link per given mime type, `content` served for any export URL.
    pub fn add_doc(
        &self,
        parent: &str,
        title: &str,
        content: &[u8],
        mtime_secs: i64,
        export_mimes: &[&str],
    ) -> String {
        let id = self.add_node(parent, title, false, content.to_vec(), mtime_secs);
        let mut state = self.state.lock().unwrap();
        let node = state.nodes.get_mut(&id).expect("just inserted");
        for mime in export_mimes {
            node.export_links
                .insert(mime.to_string(), format!("fake-export://{id}/{mime}"));
        }
        id
    }

    fn add_node(
        &self,
        parent: &str,
        title: &str,
        is_dir: bool,
        content: Vec<u8>,
        mtime_secs: i64,
    ) -> String {
        let mut state = self.state.lock().unwrap();
        let id = format!("id-{}", state.next_id);
        state.next_id += 1;
        state.nodes.insert(
            id.clone(),
            Node {
                id: id.clone(),
                title: title.to_string(),
                parent: Some(parent.to_string()),
                is_dir,
                content,
                mtime: ts(mtime_secs),
                trashed: false,
                export_links: BTreeMap::new(),
            },
        );
        id
    }

    pub fn node(&self, id: &str) -> Option<Node> {
        self.state.lock().unwrap().nodes.get(id).cloned()
    }

    /// Looks a node up by walking titles from the root.
    pub fn node_by_path(&self, path: &str) -> Option<Node> {
        let state = self.state.lock().unwrap();
        let mut current = "root".to_string();
        for segment in paths::segments(path) {
            let title = paths::unescape_name(segment);
            let child = state.nodes.values().find(|n| {
                n.parent.as_deref() == Some(current.as_str()) && n.title == title && !n.trashed
            })?;
            current = child.id.clone();
        }
        state.nodes.get(&current).cloned()
    }

    fn entry_for(node: &Node) -> Entry {
        let server_native = !node.export_links.is_empty();
        Entry {
            name: paths::escape_name(&node.title),
            is_dir: node.is_dir,
            size: if server_native {
                0
            } else {
                node.content.len() as u64
            },
            mtime: node.mtime,
            source: if node.is_dir || server_native {
                ContentSource::None
            } else {
                ContentSource::RemoteBlob(format!("fake://{}", node.id))
            },
            md5: if node.is_dir || server_native {
                None
            } else {
                Some(md5_hex(&node.content))
            },
            export_links: node.export_links.clone(),
            mime_type: None,
            remote_id: Some(node.id.clone()),
            etag: Some(format!("etag-{}", node.id)),
            version: 1,
            copyable: true,
            ..Default::default()
        }
    }

    fn lookup_path(&self, path: &str, trashed: bool) -> Result<Entry, RemoteError> {
        let state = self.state.lock().unwrap();
        let mut current = "root".to_string();
        for segment in paths::segments(path) {
            let title = paths::unescape_name(segment);
            let child = state
                .nodes
                .values()
                .find(|n| {
                    n.parent.as_deref() == Some(current.as_str())
                        && n.title == title
                        && n.trashed == trashed
                })
                .ok_or(RemoteError::PathNotExists)?;
            current = child.id.clone();
        }
        Ok(Self::entry_for(&state.nodes[&current]))
    }

    fn read_body(body: UploadBody) -> Vec<u8> {
        match body {
            UploadBody::Bytes(data) => data,
            UploadBody::File(path) => std::fs::read(path).unwrap_or_default(),
            UploadBody::Stdin => Vec::new(),
        }
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn find_by_id(&self, id: &str) -> Result<Entry, RemoteError> {
        let state = self.state.lock().unwrap();
        state
            .nodes
            .get(id)
            .map(Self::entry_for)
            .ok_or(RemoteError::PathNotExists)
    }

    async fn find_by_path(&self, path: &str) -> Result<Entry, RemoteError> {
        self.lookup_path(path, false)
    }

    async fn find_by_path_trashed(&self, path: &str) -> Result<Entry, RemoteError> {
        self.lookup_path(path, true)
    }

    async fn list_children(&self, parent_id: &str, include_hidden: bool) -> EntryStream {
        let entries: Vec<Entry> = {
            let state = self.state.lock().unwrap();
            state
                .nodes
                .values()
                .filter(|n| n.parent.as_deref() == Some(parent_id) && !n.trashed)
                .filter(|n| include_hidden || !n.title.starts_with('.'))
                .map(Self::entry_for)
                .collect()
        };
        let (tx, rx) = mpsc::channel(entries.len().max(1));
        for entry in entries {
            tx.send(Ok(entry)).await.expect("capacity reserved");
        }
        rx
    }

    async fn upload(&self, req: UploadRequest) -> Result<Entry, RemoteError> {
        let content = req.body.map(Self::read_body);
        let mut state = self.state.lock().unwrap();

        let id = match &req.src.remote_id {
            Some(id) => id.clone(),
            None => {
                let id = format!("id-{}", state.next_id);
                state.next_id += 1;
                state.nodes.insert(
                    id.clone(),
                    Node {
                        id: id.clone(),
                        title: String::new(),
                        parent: None,
                        is_dir: req.src.is_dir,
                        content: Vec::new(),
                        mtime: ts(0),
                        trashed: false,
                        export_links: BTreeMap::new(),
                    },
                );
                id
            }
        };

        let node = state
            .nodes
            .get_mut(&id)
            .ok_or(RemoteError::PathNotExists)?;
        node.title = paths::unescape_name(&req.src.name);
        node.parent = Some(req.parent_id.clone());
        node.is_dir = req.src.is_dir;
        node.mtime = req.src.mtime;
        if let Some(content) = content {
            node.content = content;
        }
        Ok(Self::entry_for(node))
    }

    async fn download(
        &self,
        id: &str,
        _export_url: Option<&str>,
    ) -> Result<ByteStream, RemoteError> {
        let content = {
            let state = self.state.lock().unwrap();
            state
                .nodes
                .get(id)
                .map(|n| n.content.clone())
                .ok_or(RemoteError::PathNotExists)?
        };
        Ok(Box::pin(futures::stream::once(async move {
            Ok(Bytes::from(content))
        })))
    }

    async fn trash(&self, id: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state
            .nodes
            .get_mut(id)
            .map(|n| n.trashed = true)
            .ok_or(RemoteError::PathNotExists)
    }

    async fn untrash(&self, id: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state
            .nodes
            .get_mut(id)
            .map(|n| n.trashed = false)
            .ok_or(RemoteError::PathNotExists)
    }

    async fn empty_trash(&self) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.nodes.retain(|_, n| !n.trashed);
        Ok(())
    }

    async fn touch(&self, id: &str) -> Result<Entry, RemoteError> {
        let mut state = self.state.lock().unwrap();
        let node = state
            .nodes
            .get_mut(id)
            .ok_or(RemoteError::PathNotExists)?;
        node.mtime = drivesync_core::domain::round_to_second(Utc::now());
        Ok(Self::entry_for(node))
    }

    async fn copy(
        &self,
        new_name: &str,
        parent_id: Option<&str>,
        src: &Entry,
    ) -> Result<Entry, RemoteError> {
        let src_id = src
            .remote_id
            .clone()
            .ok_or(RemoteError::PathNotExists)?;
        let mut state = self.state.lock().unwrap();
        let source = state
            .nodes
            .get(&src_id)
            .cloned()
            .ok_or(RemoteError::PathNotExists)?;
        let id = format!("id-{}", state.next_id);
        state.next_id += 1;
        let node = Node {
            id: id.clone(),
            title: paths::unescape_name(new_name),
            parent: Some(parent_id.unwrap_or("root").to_string()),
            is_dir: source.is_dir,
            content: source.content,
            mtime: source.mtime,
            trashed: false,
            export_links: source.export_links,
        };
        state.nodes.insert(id.clone(), node);
        Ok(Self::entry_for(&state.nodes[&id]))
    }

    async fn rename(&self, id: &str, new_title: &str) -> Result<Entry, RemoteError> {
        let mut state = self.state.lock().unwrap();
        let node = state
            .nodes
            .get_mut(id)
            .ok_or(RemoteError::PathNotExists)?;
        node.title = paths::unescape_name(new_title);
        Ok(Self::entry_for(node))
    }

    async fn insert_parent(&self, id: &str, parent_id: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state
            .nodes
            .get_mut(id)
            .map(|n| n.parent = Some(parent_id.to_string()))
            .ok_or(RemoteError::PathNotExists)
    }

    async fn remove_parent(&self, _id: &str, _parent_id: &str) -> Result<(), RemoteError> {
        // insert_parent already re-pointed the node; single-parent model.
        Ok(())
    }

    async fn publish(&self, id: &str) -> Result<String, RemoteError> {
        Ok(format!("https://fake.example/host/{id}"))
    }

    async fn unpublish(&self, _id: &str) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn list_permissions(&self, _id: &str) -> Result<Vec<PermissionInfo>, RemoteError> {
        Ok(Vec::new())
    }

    async fn insert_permission(
        &self,
        req: &PermissionRequest,
    ) -> Result<PermissionInfo, RemoteError> {
        Ok(PermissionInfo {
            id: format!("perm-{}", req.file_id),
            role: req.role.as_str().to_string(),
            kind: req.kind.as_str().to_string(),
            name: None,
            email: req.value.clone(),
        })
    }

    async fn delete_permission(&self, _id: &str, _scope: &str) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn id_for_email(&self, email: &str) -> Result<String, RemoteError> {
        Ok(format!("perm-{email}"))
    }

    async fn about(&self) -> Result<AboutInfo, RemoteError> {
        let state = self.state.lock().unwrap();
        Ok(AboutInfo {
            name: "Fake Account".to_string(),
            quota_used: state.quota_used,
            quota_total: state.quota_total,
            ..Default::default()
        })
    }
}
