//! Port traits implemented by adapters.

pub mod remote_store;

pub use remote_store::{
    AboutInfo, AccountKind, ByteStream, EntryStream, FeatureRate, PermissionInfo,
    PermissionRequest, RemoteStore, Role, ServiceUsage, UploadBody, UploadLimit, UploadOptions,
    UploadRequest,
};
