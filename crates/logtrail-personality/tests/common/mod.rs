#![allow(dead_code)]

use std::sync::Arc;

use logtrail_canonical::Checkpoint;
use logtrail_note::{NoteSigner, NoteVerifier};
use logtrail_personality::memory::{Integration, MemoryLog};
use logtrail_personality::{Personality, PersonalityConfig, SignedCheckpoint};

pub const TREE_ID: i64 = 8_675_309;
pub const SIGNER_NAME: &str = "example.com/log";

pub struct Harness {
    pub log: Arc<MemoryLog>,
    pub personality: Personality,
    pub verifier: NoteVerifier,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn signer() -> NoteSigner {
    NoteSigner::new(SIGNER_NAME, &[42u8; 32]).unwrap()
}

pub fn config() -> PersonalityConfig {
    PersonalityConfig::for_tree(TREE_ID)
}

/// A personality over a log already holding `size` entries.
pub fn harness(size: usize, integration: Integration) -> Harness {
    harness_with(config(), size, integration)
}

pub fn harness_with(config: PersonalityConfig, size: usize, integration: Integration) -> Harness {
    init_tracing();
    let log = Arc::new(MemoryLog::with_entries(TREE_ID, integration, size));
    let signer = signer();
    let verifier = signer.verifier();
    let personality = Personality::new(config, log.clone(), Arc::new(signer)).unwrap();
    Harness {
        log,
        personality,
        verifier,
    }
}

impl Harness {
    pub fn open(&self, signed: &SignedCheckpoint) -> Checkpoint {
        let (checkpoint, note) = signed.open(&[&self.verifier]).unwrap();
        assert_eq!(note.sigs.len(), 1);
        assert_eq!(note.sigs[0].name, SIGNER_NAME);
        checkpoint
    }
}
