use std::path::Path;

use async_trait::async_trait;
use tokio::fs::read_to_string;

use crate::{descriptor::Descriptor, error::VmanError};

/// Parsing switches passed to [`DescriptorCodec::read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Reject structural deviations instead of tolerating them
    pub strict: bool,
}

impl ReadOptions {
    pub const STRICT: Self = Self { strict: true };
    pub const LENIENT: Self = Self { strict: false };
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self::STRICT
    }
}

/// Reader/writer for one descriptor file format.
///
/// The engine only ever talks to descriptors through this trait. BOMs are read
/// with default (strict) options, target trees leniently.
#[async_trait]
pub trait DescriptorCodec: std::fmt::Debug + Send + Sync {
    /// File name assumed inside a module directory (e.g. `pom.xml`).
    fn descriptor_file_name(&self) -> &str;

    /// Extension of rewritten output files (`<artifact>-<version>.<ext>`).
    fn output_extension(&self) -> &str;

    /// # Errors
    /// Returns [`VmanError::Parse`] if `content` is not a valid descriptor.
    fn parse(
        &self,
        path: &Path,
        content: &str,
        options: ReadOptions,
    ) -> Result<Descriptor, VmanError>;

    /// Serialize `descriptor`, including every version rewritten in memory.
    ///
    /// # Errors
    /// Returns [`VmanError::Write`] if serialization fails.
    fn write(&self, descriptor: &Descriptor) -> Result<String, VmanError>;

    /// # Errors
    /// Returns [`VmanError::Parse`] if the file cannot be read or parsed.
    async fn read(&self, path: &Path, options: ReadOptions) -> Result<Descriptor, VmanError> {
        let content = read_to_string(path)
            .await
            .map_err(|e| VmanError::parse(path, e))?;
        self.parse(path, &content, options)
    }
}
