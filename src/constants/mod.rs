/// Largest artifact accepted by a single upload.
pub const MAX_FILE_SIZE: i64 = 10 * 1024 * 1024;
/// Cumulative ceiling over all files owned by one account.
pub const ACCOUNT_QUOTA: i64 = 100 * 1024 * 1024;

pub struct Env {
    pub jwt_secret: String,
    pub database_url: String,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    pub storage_root: String,
    pub public_base_url: String,
    pub editor_callback_url: String,
    pub editor_lang: String,
    pub document_server_hosts: Vec<String>,
}

impl Env {
    fn new() -> Self {
        let jwt_secret = std::env::var("SECRET_KEY")
            .expect("SECRET_KEY must be set in .env file or environment variable");

        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");

        let storage_root =
            std::env::var("STORAGE_ROOT").unwrap_or_else(|_| "./storage/files".to_string());

        // Addresses as seen from inside the editor's network, not the browser's.
        let public_base_url =
            std::env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://backend:8080".to_string());
        let editor_callback_url = std::env::var("EDITOR_CALLBACK_URL")
            .unwrap_or_else(|_| format!("{}/api/editor/callback", public_base_url));
        let editor_lang = std::env::var("EDITOR_LANG").unwrap_or_else(|_| "en".to_string());
        // Comma separated; save callbacks may only point at these hosts.
        let document_server_hosts = std::env::var("DOCUMENT_SERVER_HOSTS")
            .unwrap_or_else(|_| "onlyoffice".to_string())
            .split(',')
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();

        Env {
            jwt_secret,
            database_url,
            frontend_url,
            ip,
            port,
            storage_root,
            public_base_url,
            editor_callback_url,
            editor_lang,
            document_server_hosts,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
