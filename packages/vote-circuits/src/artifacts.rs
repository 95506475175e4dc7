use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ark_bn254::Bn254;
use ark_groth16::{Groth16, PreparedVerifyingKey, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use tracing::info;

use crate::CircuitError;

pub const PROVING_KEY_FILE: &str = "vote.pk";
pub const VERIFYING_KEY_FILE: &str = "vote.vk";

/// Proving and verifying keys for the vote circuit.
pub struct CircuitArtifacts {
    pub proving_key: ProvingKey<Bn254>,
    pub verifying_key: PreparedVerifyingKey<Bn254>,
}

impl CircuitArtifacts {
    pub fn from_proving_key(proving_key: ProvingKey<Bn254>) -> Result<Self, CircuitError> {
        let verifying_key = prepare(&proving_key.vk)?;
        Ok(Self {
            proving_key,
            verifying_key,
        })
    }

    /// Loads `vote.pk` from `dir`; the verifying key is the one embedded in it.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, CircuitError> {
        let path = dir.as_ref().join(PROVING_KEY_FILE);
        let proving_key: ProvingKey<Bn254> = read_key(&path)?;
        info!("loaded proving key from {}", path.display());
        Self::from_proving_key(proving_key)
    }

    pub fn save(&self, dir: impl AsRef<Path>) -> Result<(), CircuitError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .map_err(|e| CircuitError::Serialization(format!("{}: {e}", dir.display())))?;
        write_key(&dir.join(PROVING_KEY_FILE), &self.proving_key)?;
        write_key(&dir.join(VERIFYING_KEY_FILE), &self.verifying_key.vk)?;
        Ok(())
    }
}

/// Loads only `vote.vk`, which is all a verifier needs.
pub fn load_verifying_key(dir: impl AsRef<Path>) -> Result<PreparedVerifyingKey<Bn254>, CircuitError> {
    let path = dir.as_ref().join(VERIFYING_KEY_FILE);
    let vk: VerifyingKey<Bn254> = read_key(&path)?;
    info!("loaded verifying key from {}", path.display());
    prepare(&vk)
}

fn prepare(vk: &VerifyingKey<Bn254>) -> Result<PreparedVerifyingKey<Bn254>, CircuitError> {
    Groth16::<Bn254>::process_vk(vk).map_err(|e| CircuitError::MissingArtifacts(e.to_string()))
}

fn read_key<T: CanonicalDeserialize>(path: &Path) -> Result<T, CircuitError> {
    let file = File::open(path)
        .map_err(|e| CircuitError::MissingArtifacts(format!("{}: {e}", path.display())))?;
    T::deserialize_compressed(BufReader::new(file))
        .map_err(|e| CircuitError::MissingArtifacts(format!("{}: {e}", path.display())))
}

fn write_key<T: CanonicalSerialize>(path: &Path, key: &T) -> Result<(), CircuitError> {
    let file = File::create(path)
        .map_err(|e| CircuitError::Serialization(format!("{}: {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    key.serialize_compressed(&mut writer)?;
    writer
        .flush()
        .map_err(|e| CircuitError::Serialization(format!("{}: {e}", path.display())))
}

/// Deterministic circuit-specific setup for tests. Real deployments load
/// keys from a ceremony instead.
#[cfg(any(test, feature = "test-fixtures"))]
pub mod testing {
    use super::*;
    use crate::CircuitFactory;
    use ark_snark::CircuitSpecificSetupSNARK;
    use once_cell::sync::Lazy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SETUP_SEED: u64 = 0x766f_7465;

    static SHARED: Lazy<CircuitArtifacts> =
        Lazy::new(|| setup_artifacts().expect("test circuit setup"));

    /// Reproducible RNG that still satisfies the `CryptoRng` bound of the
    /// setup and proving APIs.
    pub fn seeded_rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    pub fn setup_artifacts() -> Result<CircuitArtifacts, CircuitError> {
        let rng = &mut seeded_rng(SETUP_SEED);
        let (proving_key, _) =
            Groth16::<Bn254>::circuit_specific_setup(CircuitFactory::create_blank_circuit(), rng)?;
        CircuitArtifacts::from_proving_key(proving_key)
    }

    /// One setup per test binary.
    pub fn shared_artifacts() -> &'static CircuitArtifacts {
        &SHARED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = testing::shared_artifacts();
        artifacts.save(dir.path()).unwrap();

        let loaded = CircuitArtifacts::load(dir.path()).unwrap();
        assert_eq!(loaded.proving_key.vk, artifacts.proving_key.vk);

        let vk = load_verifying_key(dir.path()).unwrap();
        assert_eq!(vk.vk, artifacts.verifying_key.vk);
    }

    #[test]
    fn test_setup_is_reproducible() {
        let first = testing::setup_artifacts().unwrap();
        let second = testing::setup_artifacts().unwrap();
        assert_eq!(first.proving_key.vk, second.proving_key.vk);
        assert_eq!(
            first.proving_key.vk,
            testing::shared_artifacts().proving_key.vk
        );
    }

    #[test]
    fn test_missing_directory_is_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            CircuitArtifacts::load(dir.path().join("nope")),
            Err(CircuitError::MissingArtifacts(_))
        ));
        assert!(matches!(
            load_verifying_key(dir.path()),
            Err(CircuitError::MissingArtifacts(_))
        ));
    }

    #[test]
    fn test_save_into_a_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        std::fs::write(&blocker, b"").unwrap();

        assert!(matches!(
            testing::shared_artifacts().save(&blocker),
            Err(CircuitError::Serialization(_))
        ));
    }

    #[test]
    fn test_saved_keys_are_complete() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = testing::shared_artifacts();
        artifacts.save(dir.path()).unwrap();

        let on_disk = std::fs::metadata(dir.path().join(PROVING_KEY_FILE))
            .unwrap()
            .len();
        assert_eq!(
            on_disk as usize,
            artifacts.proving_key.compressed_size()
        );
    }

    #[test]
    fn test_garbage_key_is_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(VERIFYING_KEY_FILE), b"not a key").unwrap();
        assert!(matches!(
            load_verifying_key(dir.path()),
            Err(CircuitError::MissingArtifacts(_))
        ));
    }
}
