use std::path::PathBuf;

use thiserror::Error;

pub mod fs;
pub mod model;
pub mod options;
pub mod phone;
pub mod profile;
pub mod repository;
pub mod session;
pub mod upload;

pub use repository::Repository;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] repository::StoreError),
    #[error(transparent)]
    Config(#[from] repository::config::ConfigError),
    #[error(transparent)]
    Invalid(#[from] model::ValidationError),
    #[error("`{}` does not name a file", .0.display())]
    NoFileName(PathBuf),
}
