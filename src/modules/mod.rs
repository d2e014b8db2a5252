pub mod user {
    pub mod schema;
}

pub mod friend {
    pub mod schema;
    pub mod repository;
    pub mod repository_pg;
}

pub mod file {
    pub mod schema;
    pub mod model;
    pub mod artifact;
    pub mod repository;
    pub mod repository_pg;
    pub mod service;
    pub mod handle;
    pub mod route;
}

pub mod share {
    pub mod schema;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod service;
    pub mod handle;
    pub mod route;
}

pub mod access {
    pub mod model;
    pub mod service;
}

pub mod editor {
    pub mod model;
    pub mod fetcher;
    pub mod service;
    pub mod handle;
    pub mod route;
}
