use std::path::Path;

use async_trait::async_trait;
use vman_core::{Descriptor, DescriptorCodec, ReadOptions, VmanError};

use crate::reader::read_pom;
use crate::writer::write_pom;

/// [`DescriptorCodec`] for Maven `pom.xml` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct PomCodec;

#[async_trait]
impl DescriptorCodec for PomCodec {
    fn descriptor_file_name(&self) -> &str {
        "pom.xml"
    }

    fn output_extension(&self) -> &str {
        "pom"
    }

    fn parse(
        &self,
        path: &Path,
        content: &str,
        options: ReadOptions,
    ) -> Result<Descriptor, VmanError> {
        read_pom(path, content, options)
    }

    fn write(&self, descriptor: &Descriptor) -> Result<String, VmanError> {
        write_pom(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_pom_codec_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pom.xml");
        fs::write(
            &path,
            r#"<project>
  <groupId>com.example</groupId>
  <artifactId>app</artifactId>
  <version>1.0</version>
</project>
"#,
        )
        .unwrap();

        let descriptor = PomCodec.read(&path, ReadOptions::STRICT).await.unwrap();
        assert_eq!(descriptor.path(), path);
        assert_eq!(
            descriptor.project_key().unwrap().to_string(),
            "com.example:app:1.0"
        );
        assert_eq!(PomCodec.write(&descriptor).unwrap(), descriptor.source());

        temp_dir.close().unwrap();
    }

    #[test]
    fn test_pom_codec_names() {
        assert_eq!(PomCodec.descriptor_file_name(), "pom.xml");
        assert_eq!(PomCodec.output_extension(), "pom");
    }
}
