//! Post store: the persisted list of posts and the operations that mutate it.
//!
//! DESIGN
//! ======
//! All posts live in one CSV file, one row per post, in creation order.
//! Every operation is a full read-modify-write cycle: read the file, apply
//! the change in memory, rewrite the whole file. Rewrites go to a temp file
//! in the same directory that is then renamed over the target, so a failed
//! write leaves the previous contents intact.
//!
//! FILE LAYOUT
//! ===========
//! `Timestamp,Category,Problem,Status,Upvotes,Id`. Files written by older
//! versions may lack `Upvotes` (defaulted to 0) or `Id` (defaulted to the
//! zero-based row position); either gap triggers a rewrite on load.
//!
//! CONCURRENCY
//! ===========
//! The store does no locking of its own. Callers in one process serialize
//! access through `AppState`; two stores over the same file race, and the
//! later write wins.

use std::collections::HashSet;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tempfile::NamedTempFile;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{debug, info};

use crate::error::ErrorCode;
use crate::model::{AdminEdit, Category, Post, PostId, Status};

const COL_TIMESTAMP: &str = "Timestamp";
const COL_CATEGORY: &str = "Category";
const COL_PROBLEM: &str = "Problem";
const COL_STATUS: &str = "Status";
const COL_UPVOTES: &str = "Upvotes";
const COL_ID: &str = "Id";

/// Header written on every rewrite.
pub const HEADER: [&str; 6] = [COL_TIMESTAMP, COL_CATEGORY, COL_PROBLEM, COL_STATUS, COL_UPVOTES, COL_ID];

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("post not found: {0}")]
    NotFound(PostId),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage format error: {0}")]
    Csv(#[from] csv::Error),
    #[error("corrupt post file: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// True for failures of the underlying medium rather than of the request.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Csv(_) | Self::Corrupt(_))
    }
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::NotFound(_) => "E_POST_NOT_FOUND",
            Self::Io(_) | Self::Csv(_) | Self::Corrupt(_) => "E_STORAGE",
        }
    }
}

// =============================================================================
// NEW POST
// =============================================================================

/// A validated submission, ready to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    category: Category,
    problem: String,
}

impl NewPost {
    /// Validate raw form input. The text is stored exactly as given.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` if the text is blank or the category
    /// is not one of the fixed set.
    pub fn new(category: &str, problem: &str) -> Result<Self, StoreError> {
        if problem.trim().is_empty() {
            return Err(StoreError::Validation("problem text must not be empty".into()));
        }
        let category = Category::parse(category)
            .ok_or_else(|| StoreError::Validation(format!("unknown category: {category:?}")))?;
        Ok(Self { category, problem: problem.to_owned() })
    }
}

// =============================================================================
// STORE
// =============================================================================

pub struct PostStore {
    path: PathBuf,
    /// Next id to hand out. Only ever grows, so ids freed by deletion are
    /// not reused while the process runs.
    next_id: PostId,
}

impl PostStore {
    /// Bind to `path`, creating or migrating the file as needed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be read or is corrupt.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let mut store = Self { path: path.into(), next_id: 0 };
        let posts = store.load_all()?;
        info!(path = %store.path.display(), posts = posts.len(), next_id = store.next_id, "post store opened");
        Ok(store)
    }

    #[cfg(test)]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All posts in creation order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be read, is corrupt, or a
    /// required migration rewrite fails.
    pub fn load_all(&mut self) -> Result<Vec<Post>, StoreError> {
        let loaded = read_posts(&self.path)?;
        if loaded.needs_rewrite {
            write_posts(&self.path, &loaded.posts)?;
            info!(path = %self.path.display(), rows = loaded.posts.len(), "post file rewritten with current columns");
        }
        if let Some(max) = loaded.posts.iter().map(|p| p.id).max() {
            let next = max
                .checked_add(1)
                .ok_or_else(|| StoreError::Corrupt(format!("post id {max} leaves no room for new posts")))?;
            self.next_id = self.next_id.max(next);
        }
        Ok(loaded.posts)
    }

    /// Append a post with `status = New` and no votes.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be read or written.
    pub fn submit(&mut self, new_post: NewPost) -> Result<Post, StoreError> {
        let mut posts = self.load_all()?;
        let post = Post {
            id: self.next_id,
            timestamp: now_timestamp(),
            category: new_post.category,
            problem: new_post.problem,
            status: Status::New,
            upvotes: 0,
        };
        posts.push(post.clone());
        write_posts(&self.path, &posts)?;
        self.next_id += 1;
        debug!(id = post.id, category = post.category.as_str(), "post submitted");
        Ok(post)
    }

    /// Add one vote to a post. Does not know about sessions.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the id is unknown, or a storage error.
    pub fn vote(&mut self, id: PostId) -> Result<Post, StoreError> {
        let mut posts = self.load_all()?;
        let post = posts.iter_mut().find(|p| p.id == id).ok_or(StoreError::NotFound(id))?;
        post.upvotes = post.upvotes.saturating_add(1);
        let updated = post.clone();
        write_posts(&self.path, &posts)?;
        debug!(id, upvotes = updated.upvotes, "post upvoted");
        Ok(updated)
    }

    /// Apply a batch of status changes and deletions, then rewrite the file.
    ///
    /// The whole batch is checked before anything changes. Later edits to
    /// the same id win; once deleted, a post stays deleted.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id,
    /// `StoreError::Validation` for a non-delete edit with no status, or a
    /// storage error. Nothing is written on error.
    pub fn apply_admin_edits(&mut self, edits: &[AdminEdit]) -> Result<Vec<Post>, StoreError> {
        let mut posts = self.load_all()?;
        let known: HashSet<PostId> = posts.iter().map(|p| p.id).collect();
        for edit in edits {
            if !known.contains(&edit.id) {
                return Err(StoreError::NotFound(edit.id));
            }
            if !edit.delete && edit.status.is_none() {
                return Err(StoreError::Validation(format!("edit for post {} has no status", edit.id)));
            }
        }

        let mut deleted = HashSet::new();
        for edit in edits {
            if edit.delete {
                deleted.insert(edit.id);
            } else if let (Some(status), Some(post)) = (edit.status, posts.iter_mut().find(|p| p.id == edit.id)) {
                post.status = status;
            }
        }
        posts.retain(|p| !deleted.contains(&p.id));

        write_posts(&self.path, &posts)?;
        info!(edits = edits.len(), deleted = deleted.len(), remaining = posts.len(), "admin edits applied");
        Ok(posts)
    }
}

// =============================================================================
// FILE I/O
// =============================================================================

/// Result of reading the file before any migration rewrite.
#[derive(Debug)]
pub(crate) struct LoadedPosts {
    pub(crate) posts: Vec<Post>,
    /// The file is missing, empty, or lacks a current column.
    pub(crate) needs_rewrite: bool,
}

/// Column positions resolved from the header row.
struct Columns {
    timestamp: usize,
    category: usize,
    problem: usize,
    status: usize,
    upvotes: Option<usize>,
    id: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, StoreError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| find(name).ok_or_else(|| StoreError::Corrupt(format!("missing column {name:?}")));
        Ok(Self {
            timestamp: require(COL_TIMESTAMP)?,
            category: require(COL_CATEGORY)?,
            problem: require(COL_PROBLEM)?,
            status: require(COL_STATUS)?,
            upvotes: find(COL_UPVOTES),
            id: find(COL_ID),
        })
    }
}

pub(crate) fn read_posts(path: &Path) -> Result<LoadedPosts, StoreError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(LoadedPosts { posts: Vec::new(), needs_rewrite: true });
        }
        Err(e) => return Err(e.into()),
    };
    if file.metadata()?.len() == 0 {
        return Ok(LoadedPosts { posts: Vec::new(), needs_rewrite: true });
    }

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);
    let columns = Columns::resolve(reader.headers()?)?;

    let mut posts = Vec::new();
    let mut seen = HashSet::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let post = parse_row(&record, &columns, row)?;
        if !seen.insert(post.id) {
            return Err(StoreError::Corrupt(format!("row {row}: duplicate id {}", post.id)));
        }
        posts.push(post);
    }

    let needs_rewrite = columns.upvotes.is_none() || columns.id.is_none();
    Ok(LoadedPosts { posts, needs_rewrite })
}

fn parse_row(record: &StringRecord, columns: &Columns, row: usize) -> Result<Post, StoreError> {
    let cell = |idx: usize| record.get(idx).unwrap_or_default();

    let category = Category::parse(cell(columns.category))
        .ok_or_else(|| StoreError::Corrupt(format!("row {row}: unknown category {:?}", cell(columns.category))))?;
    let status = Status::parse(cell(columns.status))
        .ok_or_else(|| StoreError::Corrupt(format!("row {row}: unknown status {:?}", cell(columns.status))))?;
    let upvotes = match columns.upvotes.map(|idx| cell(idx).trim()) {
        None | Some("") => 0,
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| StoreError::Corrupt(format!("row {row}: invalid upvotes {raw:?}")))?,
    };
    let id = match columns.id {
        None => row as PostId,
        Some(idx) => {
            let raw = cell(idx).trim();
            raw.parse::<PostId>()
                .map_err(|_| StoreError::Corrupt(format!("row {row}: invalid id {raw:?}")))?
        }
    };

    Ok(Post {
        id,
        timestamp: cell(columns.timestamp).to_owned(),
        category,
        problem: cell(columns.problem).to_owned(),
        status,
        upvotes,
    })
}

/// Replace the file contents with `posts`, via temp file + rename.
pub(crate) fn write_posts(path: &Path, posts: &[Post]) -> Result<(), StoreError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
        writer.write_record(HEADER)?;
        for post in posts {
            let upvotes = post.upvotes.to_string();
            let id = post.id.to_string();
            writer.write_record([
                post.timestamp.as_str(),
                post.category.as_str(),
                post.problem.as_str(),
                post.status.as_str(),
                upvotes.as_str(),
                id.as_str(),
            ])?;
        }
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Current local time as `YYYY-MM-DD HH:MM`. Falls back to UTC when the
/// local offset cannot be determined.
pub(crate) fn now_timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    format_timestamp(now)
}

pub(crate) fn format_timestamp(at: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    at.format(format).unwrap_or_else(|_| at.to_string())
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
