//! API key handling: keygen lives in [`crate::api`], storage here.

mod credentials;

pub use credentials::{
    ApiCredentials, CredentialStatus, credential_status, delete_credentials,
    get_credential_storage_info, load_credentials, resolve_api_key, save_credentials,
};
