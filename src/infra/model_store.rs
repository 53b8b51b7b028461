// ============================================================
// Layer 6 - Model Store
// ============================================================
// Persists a trained SentimentModel together with its schema and
// the configuration that produced it, as one self-describing file.
//
// File layout (all integers little-endian):
//
//   offset  size  field
//   0       8     magic          b"SENTIMDL"
//   8       4     format version (u32)
//   12      8     payload length (u64)
//   20      4     CRC32 of the payload (u32)
//   24      n     payload        bincode { schema, model, metadata }
//
// Saving writes "<path>.tmp" and renames it over <path>, so a
// failed save never leaves a half-written model where a good one
// used to be.
//
// Loading rejects, in order: a missing file, a wrong magic, an
// unknown version, a short payload, trailing bytes, a checksum
// mismatch, an undecodable payload, and a schema whose feature
// width disagrees with the model.

use std::{
    ffi::OsString,
    fs::{self, File},
    io::{self, BufWriter, Cursor, Write},
    path::{Path, PathBuf},
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::domain::error::{ModelLoadError, ModelSaveError};
use crate::domain::schema::ModelSchema;
use crate::ml::model::SentimentModel;

pub const MAGIC: &[u8; 8] = b"SENTIMDL";
pub const FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = 8 + 4 + 8 + 4;

/// Provenance stored next to the weights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Trainer name, e.g. "SdcaLogisticRegression"
    pub trainer:       String,
    pub seed:          u64,
    /// Number of records the model was fitted on
    pub training_rows: usize,
    /// The run's TrainConfig as pretty JSON
    pub train_config:  String,
    /// Version of the binary that wrote the file
    pub created_by:    String,
}

/// Everything recovered from a model file.
#[derive(Debug, Clone)]
pub struct LoadedArtifact {
    pub model:    SentimentModel,
    pub schema:   ModelSchema,
    pub metadata: ArtifactMetadata,
}

#[derive(Serialize)]
struct PayloadRef<'a> {
    schema:   &'a ModelSchema,
    model:    &'a SentimentModel,
    metadata: &'a ArtifactMetadata,
}

#[derive(Deserialize)]
struct Payload {
    schema:   ModelSchema,
    model:    SentimentModel,
    metadata: ArtifactMetadata,
}

/// Reads and writes the model artifact at one fixed path.
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically replace the artifact with `model`.
    pub fn save(
        &self,
        model:    &SentimentModel,
        schema:   &ModelSchema,
        metadata: &ArtifactMetadata,
    ) -> Result<(), ModelSaveError> {
        let bytes = encode(&PayloadRef { schema, model, metadata })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ModelSaveError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp = self.tmp_path();
        if let Err(source) = write_synced(&tmp, &bytes) {
            let _ = fs::remove_file(&tmp);
            return Err(ModelSaveError::Io { path: tmp, source });
        }
        fs::rename(&tmp, &self.path).map_err(|source| {
            let _ = fs::remove_file(&tmp);
            ModelSaveError::Io { path: self.path.clone(), source }
        })?;

        tracing::info!(
            path  = %self.path.display(),
            bytes = bytes.len(),
            "Model saved"
        );
        Ok(())
    }

    pub fn load(&self) -> Result<LoadedArtifact, ModelLoadError> {
        if self.path.as_os_str().is_empty() {
            return Err(ModelLoadError::NotFound { path: self.path.clone() });
        }
        let bytes = fs::read(&self.path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ModelLoadError::NotFound { path: self.path.clone() },
            _ => ModelLoadError::Io { path: self.path.clone(), source },
        })?;
        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "Reading model file");
        decode(&self.path, &bytes)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name: OsString = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

fn encode(payload: &PayloadRef<'_>) -> Result<Vec<u8>, ModelSaveError> {
    let body = bincode::serialize(payload)
        .map_err(|e| ModelSaveError::Encode { reason: e.to_string() })?;

    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(MAGIC);
    let header_err = |e: io::Error| ModelSaveError::Encode { reason: e.to_string() };
    out.write_u32::<LittleEndian>(FORMAT_VERSION).map_err(header_err)?;
    out.write_u64::<LittleEndian>(body.len() as u64).map_err(header_err)?;
    out.write_u32::<LittleEndian>(crc32fast::hash(&body)).map_err(header_err)?;
    out.extend_from_slice(&body);
    Ok(out)
}

fn decode(path: &Path, bytes: &[u8]) -> Result<LoadedArtifact, ModelLoadError> {
    let truncated = || ModelLoadError::Truncated { path: path.to_path_buf() };
    let corrupt = |reason: String| ModelLoadError::Corrupt { path: path.to_path_buf(), reason };

    // ── Step 1: magic ──
    if bytes.len() < MAGIC.len() {
        return Err(truncated());
    }
    if &bytes[..MAGIC.len()] != MAGIC {
        return Err(ModelLoadError::BadMagic { path: path.to_path_buf() });
    }

    // ── Step 2: header ──
    if bytes.len() < HEADER_LEN {
        return Err(truncated());
    }
    let mut cursor = Cursor::new(&bytes[MAGIC.len()..HEADER_LEN]);
    let version     = cursor.read_u32::<LittleEndian>().map_err(|_| truncated())?;
    let payload_len = cursor.read_u64::<LittleEndian>().map_err(|_| truncated())?;
    let checksum    = cursor.read_u32::<LittleEndian>().map_err(|_| truncated())?;
    if version != FORMAT_VERSION {
        return Err(ModelLoadError::UnsupportedVersion {
            path:     path.to_path_buf(),
            found:    version,
            expected: FORMAT_VERSION,
        });
    }

    // ── Step 3: payload framing + checksum ──
    let body = &bytes[HEADER_LEN..];
    let declared = usize::try_from(payload_len)
        .map_err(|_| corrupt(format!("payload length {payload_len} does not fit in memory")))?;
    if body.len() < declared {
        return Err(truncated());
    }
    if body.len() > declared {
        return Err(corrupt(format!(
            "{} trailing bytes after payload",
            body.len() - declared
        )));
    }
    let actual = crc32fast::hash(body);
    if actual != checksum {
        return Err(corrupt(format!(
            "checksum mismatch (stored {checksum:08x}, computed {actual:08x})"
        )));
    }

    // ── Step 4: decode + consistency ──
    let payload: Payload = bincode::deserialize(body).map_err(|e| corrupt(e.to_string()))?;
    if !payload.model.is_consistent() {
        return Err(corrupt("featurizer and classifier widths differ".to_string()));
    }
    let actual_width = payload.model.feature_count();
    match payload.schema.feature_width() {
        Some(declared) if declared == actual_width => {}
        Some(declared) => {
            return Err(ModelLoadError::SchemaMismatch {
                path: path.to_path_buf(),
                declared,
                actual: actual_width,
            });
        }
        None => return Err(corrupt("schema has no feature column".to_string())),
    }

    Ok(LoadedArtifact {
        model:    payload.model,
        schema:   payload.schema,
        metadata: payload.metadata,
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::featurizer::{FeaturizerOptions, TextFeaturizer};
    use crate::ml::model::LinearClassifier;

    fn sample_model(texts: &[&str], bias: f64) -> SentimentModel {
        let featurizer = TextFeaturizer::fit(FeaturizerOptions::default(), texts.iter().copied());
        let dim        = featurizer.dimension();
        let weights    = (0..dim).map(|i| i as f64 * 0.01).collect();
        SentimentModel::new(featurizer, LinearClassifier::new(weights, bias))
    }

    fn metadata() -> ArtifactMetadata {
        ArtifactMetadata {
            trainer:       "SdcaLogisticRegression".to_string(),
            seed:          1,
            training_rows: 2,
            train_config:  "{}".to_string(),
            created_by:    "test".to_string(),
        }
    }

    fn saved(dir: &tempfile::TempDir) -> (ModelStore, SentimentModel) {
        let store = ModelStore::new(dir.path().join("models").join("m.bin"));
        let model = sample_model(&["good film", "bad film"], 0.25);
        let schema = ModelSchema::for_features(model.feature_count());
        store.save(&model, &schema, &metadata()).unwrap();
        (store, model)
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let (store, model) = saved(&dir);

        let loaded = store.load().unwrap();
        assert_eq!(loaded.model, model);
        assert_eq!(loaded.metadata, metadata());
        assert_eq!(loaded.schema.feature_width(), Some(model.feature_count()));
    }

    #[test]
    fn test_overwrite_leaves_no_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = saved(&dir);

        let second = sample_model(&["lovely", "dreadful", "meh"], -1.0);
        let schema = ModelSchema::for_features(second.feature_count());
        store.save(&second, &schema, &metadata()).unwrap();

        assert!(!store.tmp_path().exists());
        assert_eq!(store.load().unwrap().model, second);
    }

    #[test]
    fn test_missing_and_empty_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("nope.bin"));
        assert!(matches!(store.load(), Err(ModelLoadError::NotFound { .. })));
        assert!(matches!(ModelStore::new("").load(), Err(ModelLoadError::NotFound { .. })));
    }

    #[test]
    fn test_empty_file_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        fs::write(&path, b"").unwrap();
        assert!(matches!(ModelStore::new(&path).load(), Err(ModelLoadError::Truncated { .. })));
    }

    #[test]
    fn test_bad_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text.bin");
        fs::write(&path, b"this is just a text file, not a model").unwrap();
        assert!(matches!(ModelStore::new(&path).load(), Err(ModelLoadError::BadMagic { .. })));
    }

    #[test]
    fn test_wrong_version() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = saved(&dir);
        let mut bytes = fs::read(store.path()).unwrap();
        bytes[8..12].copy_from_slice(&7u32.to_le_bytes());
        fs::write(store.path(), &bytes).unwrap();

        match store.load() {
            Err(ModelLoadError::UnsupportedVersion { found, expected, .. }) => {
                assert_eq!(found, 7);
                assert_eq!(expected, FORMAT_VERSION);
            }
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_payload() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = saved(&dir);
        let bytes = fs::read(store.path()).unwrap();
        fs::write(store.path(), &bytes[..bytes.len() - 5]).unwrap();
        assert!(matches!(store.load(), Err(ModelLoadError::Truncated { .. })));

        fs::write(store.path(), &bytes[..HEADER_LEN - 1]).unwrap();
        assert!(matches!(store.load(), Err(ModelLoadError::Truncated { .. })));
    }

    #[test]
    fn test_flipped_byte_fails_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = saved(&dir);
        let mut bytes = fs::read(store.path()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(store.path(), &bytes).unwrap();
        assert!(matches!(store.load(), Err(ModelLoadError::Corrupt { .. })));
    }

    #[test]
    fn test_trailing_bytes_are_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = saved(&dir);
        let mut bytes = fs::read(store.path()).unwrap();
        bytes.extend_from_slice(b"junk");
        fs::write(store.path(), &bytes).unwrap();
        assert!(matches!(store.load(), Err(ModelLoadError::Corrupt { .. })));
    }

    #[test]
    fn test_schema_width_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.bin");
        let model = sample_model(&["fine"], 0.0);
        let schema = ModelSchema::for_features(model.feature_count() + 3);
        let meta = metadata();
        let bytes = encode(&PayloadRef { schema: &schema, model: &model, metadata: &meta }).unwrap();
        fs::write(&path, bytes).unwrap();

        match ModelStore::new(&path).load() {
            Err(ModelLoadError::SchemaMismatch { declared, actual, .. }) => {
                assert_eq!(declared, actual + 3);
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }
}
