//! Task persistence as JSON Lines
//!
//! `.rank/tasks.jsonl` holds one task per line. Later lines for the same
//! ID replace earlier ones, so appends can stand in for edits until the
//! next full rewrite compacts the file. Readers take a shared `fs2` lock
//! on `tasks.lock` and writers an exclusive one, held across a whole
//! read-modify-write.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::domain::{Task, TaskId};

/// Tasks keyed by ID
pub type TaskMap = HashMap<TaskId, Task>;

/// Handle on a tasks file
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display())),
        _ => Ok(()),
    }
}

fn write_task(writer: &mut impl Write, task: &Task) -> Result<()> {
    serde_json::to_writer(&mut *writer, task)
        .with_context(|| format!("Failed to encode task {}", task.id))?;
    writer.write_all(b"\n").context("Failed to write task")
}

impl TaskStore {
    /// Creates a store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<root>/.rank/tasks.jsonl`
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(".rank").join("tasks.jsonl"))
    }

    /// Path of the tasks file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("jsonl.tmp")
    }

    /// Sibling file every reader and writer locks; it outlives rewrites
    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn open_lock(&self) -> Result<File> {
        ensure_parent(&self.path)?;
        let path = self.lock_path();
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {}", path.display()))
    }

    /// Holds a shared lock until the returned handle is dropped
    fn shared_lock(&self) -> Result<File> {
        let file = self.open_lock()?;
        file.lock_shared()
            .with_context(|| format!("Failed to lock {} for reading", self.path.display()))?;
        Ok(file)
    }

    /// Holds an exclusive lock until the returned handle is dropped
    fn exclusive_lock(&self) -> Result<File> {
        let file = self.open_lock()?;
        file.lock_exclusive()
            .with_context(|| format!("Failed to lock {} for writing", self.path.display()))?;
        Ok(file)
    }

    /// Loads every task; a missing file is an empty store
    pub fn read_all(&self) -> Result<TaskMap> {
        if !self.path.exists() {
            return Ok(TaskMap::new());
        }

        let _lock = self.shared_lock()?;
        self.load()
    }

    /// Parses the file; the caller holds the lock
    fn load(&self) -> Result<TaskMap> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(TaskMap::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to open task store: {}", self.path.display()))
            }
        };

        let mut tasks = TaskMap::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line_no = index + 1;
            let line = line.with_context(|| format!("Failed to read line {}", line_no))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let task: Task = serde_json::from_str(line)
                .with_context(|| format!("Invalid task on line {} of {}", line_no, self.path.display()))?;
            tasks.insert(task.id.clone(), task);
        }

        Ok(tasks)
    }

    /// Loads every task, oldest first (ties broken by ID)
    pub fn read_sorted(&self) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self.read_all()?.into_values().collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(tasks)
    }

    /// Reads a single task by ID
    pub fn get(&self, task_id: &TaskId) -> Result<Option<Task>> {
        Ok(self.read_all()?.remove(task_id))
    }

    /// Replaces the file contents with `tasks`, one line each in ID order
    pub fn write_all(&self, tasks: &TaskMap) -> Result<()> {
        let _lock = self.exclusive_lock()?;
        self.replace(tasks)
    }

    /// Writes a sibling temp file and renames it over the store; the
    /// caller holds the exclusive lock
    fn replace(&self, tasks: &TaskMap) -> Result<()> {
        let mut ordered: Vec<&Task> = tasks.values().collect();
        ordered.sort_by(|a, b| a.id.cmp(&b.id));

        let temp_path = self.temp_path();
        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            let mut writer = BufWriter::new(&file);
            for task in ordered {
                write_task(&mut writer, task)?;
            }
            writer.flush().context("Failed to flush task store")?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!("Failed to replace {} with {}", self.path.display(), temp_path.display())
        })
    }

    /// Adds one line to the end of the file
    pub fn append(&self, task: &Task) -> Result<()> {
        let _lock = self.exclusive_lock()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open task store: {}", self.path.display()))?;

        let mut writer = BufWriter::new(&file);
        write_task(&mut writer, task)?;
        writer.flush().context("Failed to flush task store")
    }

    /// Loads the store, applies `edit`, and rewrites it if `edit` returns
    /// true, all under one exclusive lock
    fn modify<F>(&self, edit: F) -> Result<bool>
    where
        F: FnOnce(&mut TaskMap) -> bool,
    {
        let _lock = self.exclusive_lock()?;

        let mut tasks = self.load()?;
        let changed = edit(&mut tasks);
        if changed {
            self.replace(&tasks)?;
        }
        Ok(changed)
    }

    /// Inserts or replaces a task
    pub fn update(&self, task: &Task) -> Result<()> {
        self.modify(|tasks| {
            tasks.insert(task.id.clone(), task.clone());
            true
        })
        .map(|_| ())
    }

    /// Deletes a task and every dependency edge pointing at it
    ///
    /// Returns false when no task had that ID.
    pub fn remove(&self, task_id: &TaskId) -> Result<bool> {
        self.modify(|tasks| {
            if tasks.remove(task_id).is_none() {
                return false;
            }
            for task in tasks.values_mut() {
                task.remove_dependency(task_id);
            }
            true
        })
    }
}
