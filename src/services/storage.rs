// src/services/storage.rs

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::common::error::AppError;

/// Armazenamento de imagens (avatares, logos). Devolve a URL pública do arquivo.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn upload(&self, folder: &str, file_name: &str, bytes: Vec<u8>) -> Result<String, AppError>;
}

/// URL de imagem provisória derivada de um nome ("Ana Souza" -> .../ana-souza/200).
pub fn placeholder_image_url(seed: &str) -> String {
    let seed: String = seed
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();
    format!("https://picsum.photos/seed/{seed}/200")
}

// Um segmento de caminho sem "..", barras ou vazio
fn safe_segment(segment: &str) -> Result<&str, AppError> {
    let trimmed = segment.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
    {
        return Err(AppError::InvalidInput(format!("Invalid path segment: '{segment}'")));
    }
    Ok(trimmed)
}

// ---
// Disco local, servido em /uploads
// ---
pub struct LocalBlobStorage {
    root: PathBuf,
    public_prefix: String,
}

impl LocalBlobStorage {
    pub fn new(root: impl AsRef<Path>, public_prefix: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn upload(&self, folder: &str, file_name: &str, bytes: Vec<u8>) -> Result<String, AppError> {
        let mut dir = self.root.clone();
        let mut url = self.public_prefix.clone();
        for segment in folder.split('/').filter(|s| !s.is_empty()) {
            let segment = safe_segment(segment)?;
            dir.push(segment);
            url.push('/');
            url.push_str(segment);
        }
        let file_name = safe_segment(file_name)?;

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        tokio::fs::write(dir.join(file_name), bytes)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        tracing::info!("🖼️ Arquivo salvo em {}/{}", dir.display(), file_name);
        Ok(format!("{url}/{file_name}"))
    }
}

// Sem armazenamento configurado: devolve uma imagem de exemplo
pub struct PlaceholderBlobStorage;

#[async_trait]
impl BlobStorage for PlaceholderBlobStorage {
    async fn upload(&self, _folder: &str, file_name: &str, _bytes: Vec<u8>) -> Result<String, AppError> {
        tracing::warn!("⚠️ Storage não configurado, devolvendo URL de exemplo para o upload.");
        let seed: String = file_name
            .chars()
            .map(|c| if c.is_whitespace() { '-' } else { c })
            .collect();
        Ok(format!("https://picsum.photos/seed/{seed}/200"))
    }
}
