pub mod upload_staging_fs;
