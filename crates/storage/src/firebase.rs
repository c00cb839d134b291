use crate::http::{GlooNetSendRequest, SendRequest};

macro_rules! env_or {
    ($name: literal, $default: expr) => {
        match option_env!($name) {
            Some(value) => value,
            None => $default,
        }
    };
}

/// Endpoints of the hosted services, set at build time.
///
/// The defaults address the production services. Local emulators are used by overriding the
/// URLs, e.g. `IRONLOG_FIRESTORE_URL=http://localhost:8080/v1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirebaseConfig {
    pub project_id: &'static str,
    pub api_key: &'static str,
    pub storage_bucket: &'static str,
    pub firestore_url: &'static str,
    pub identity_toolkit_url: &'static str,
    pub secure_token_url: &'static str,
    pub storage_url: &'static str,
    pub functions_url: &'static str,
}

pub const FIREBASE_CONFIG: FirebaseConfig = FirebaseConfig {
    project_id: env_or!("IRONLOG_FIREBASE_PROJECT_ID", "demo-ironlog"),
    api_key: env_or!("IRONLOG_FIREBASE_API_KEY", "demo-api-key"),
    storage_bucket: env_or!("IRONLOG_FIREBASE_STORAGE_BUCKET", "demo-ironlog.appspot.com"),
    firestore_url: env_or!("IRONLOG_FIRESTORE_URL", "https://firestore.googleapis.com/v1"),
    identity_toolkit_url: env_or!(
        "IRONLOG_IDENTITY_TOOLKIT_URL",
        "https://identitytoolkit.googleapis.com/v1"
    ),
    secure_token_url: env_or!(
        "IRONLOG_SECURE_TOKEN_URL",
        "https://securetoken.googleapis.com/v1"
    ),
    storage_url: env_or!(
        "IRONLOG_STORAGE_URL",
        "https://firebasestorage.googleapis.com/v0"
    ),
    functions_url: env_or!("IRONLOG_FUNCTIONS_URL", "/functions"),
};

/// Client of the hosted backend.
///
/// The repository implementations are split by service: documents in `firestore`, sessions in
/// `auth`, files in `object_storage` and privileged operations in `functions`.
#[derive(Clone)]
pub struct Firebase<S: SendRequest> {
    pub sender: S,
    pub config: FirebaseConfig,
}

impl Firebase<GlooNetSendRequest> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sender: GlooNetSendRequest,
            config: FIREBASE_CONFIG,
        }
    }
}

impl Default for Firebase<GlooNetSendRequest> {
    fn default() -> Self {
        Self::new()
    }
}
