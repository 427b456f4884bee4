pub mod shopify_files;

pub use shopify_files::{ShopifyFilesClient, UploadError, UploadedFile};
