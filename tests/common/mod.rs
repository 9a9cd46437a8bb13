//! Helpers for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use image::{Rgb, RgbImage};
use tempfile::TempDir;

use lostfound_matcher::db::{DbPool, establish_connection_pool};
use lostfound_matcher::domain::found_item::{FoundItem, NewFoundItem};
use lostfound_matcher::domain::lost_item::{LostItem, NewLostItem};
use lostfound_matcher::processing::archive::Archiver;
use lostfound_matcher::processing::embedding::{EmbeddingResult, TextEmbedder};
use lostfound_matcher::processing::matching::MatchingEngine;
use lostfound_matcher::processing::notifier::Notifier;
use lostfound_matcher::repository::{DieselRepository, FoundItemWriter, LostItemWriter};

pub const CONTACT: &str = "9000000000";

/// Temporary database and image directories, removed on drop.
pub struct TestEnv {
    dir: TempDir,
    pool: DbPool,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir.");
        let db_path = dir.path().join("test.db");
        let pool = establish_connection_pool(db_path.to_str().expect("utf-8 path"))
            .expect("Failed to establish SQLite connection.");
        TestEnv { dir, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn unmatched_dir(&self) -> PathBuf {
        self.dir.path().join("unmatched_found_items")
    }

    pub fn matched_dir(&self) -> PathBuf {
        self.dir.path().join("matched_found_items")
    }

    /// Writes a small PNG into the unmatched directory.
    pub fn write_image(&self, name: &str) -> PathBuf {
        let dir = self.unmatched_dir();
        std::fs::create_dir_all(&dir).expect("create unmatched dir");
        let path = dir.join(name);
        RgbImage::from_pixel(4, 4, Rgb([120, 20, 20]))
            .save(&path)
            .expect("write image");
        path
    }

    pub fn engine(&self) -> TestEngine {
        let embedder = WordEmbedder::default();
        let notifier = RecordingNotifier::default();
        let engine = MatchingEngine::new(
            self.repo(),
            embedder.clone(),
            notifier.clone(),
            Archiver::new(self.matched_dir()),
        );
        TestEngine {
            engine,
            embedder,
            notifier,
        }
    }

    pub fn add_found(&self, caption: &str, image_name: &str) -> FoundItem {
        let image_path = self.write_image(image_name);
        let item = NewFoundItem::new(caption, "Library", CONTACT, image_path).expect("valid item");
        self.repo().create_found_item(&item).expect("insert found item")
    }

    pub fn add_lost(&self, description: &str, email: &str) -> LostItem {
        let item = NewLostItem::new(description, CONTACT, email).expect("valid item");
        self.repo().create_lost_item(&item).expect("insert lost item")
    }
}

pub struct TestEngine {
    pub engine: MatchingEngine<DieselRepository, WordEmbedder, RecordingNotifier>,
    pub embedder: WordEmbedder,
    pub notifier: RecordingNotifier,
}

const VOCABULARY: &[&str] = &[
    "a", "red", "blue", "black", "green", "leather", "backpack", "wallet", "umbrella", "phone",
    "keys",
];

/// Bag-of-words embedder over a fixed vocabulary. Unknown words share the
/// last dimension.
#[derive(Clone, Default)]
pub struct WordEmbedder {
    calls: Arc<AtomicUsize>,
}

impl WordEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextEmbedder for WordEmbedder {
    fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut vector = vec![0.0_f32; VOCABULARY.len() + 1];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
        {
            let word = word.to_lowercase();
            let index = VOCABULARY
                .iter()
                .position(|known| *known == word)
                .unwrap_or(VOCABULARY.len());
            vector[index] += 1.0;
        }
        Ok(vector)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Records messages instead of sending them.
#[derive(Clone)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<SentMail>>>,
    succeed: bool,
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self {
            sent: Arc::default(),
            succeed: true,
        }
    }
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            succeed: false,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().expect("sent mutex poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, to: &str, subject: &str, body: &str) -> bool {
        self.sent
            .lock()
            .expect("sent mutex poisoned")
            .push(SentMail {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        self.succeed
    }
}
