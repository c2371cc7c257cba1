pub mod fit;
pub mod info;
pub mod init;
pub mod stream;
